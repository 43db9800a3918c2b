//! Migrate command implementation.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use syskit_migrate::{MigrationSummary, Migrator};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::print_output;

/// Generate REQ/INT/UNIT documents from the speckit tree
#[derive(Debug, Default, Parser)]
pub struct MigrateCommand {
    /// Migration plan to use instead of the configured one
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub plan: Option<PathBuf>,
}

impl MigrateCommand {
    pub fn run(&self, ctx: &CommandContext) -> Result<MigrationSummary, CliError> {
        let plan = ctx.plan(self.plan.as_deref())?;
        let migrator = Migrator::new(&ctx.layout, &plan, &ctx.config.migration)?;
        Ok(migrator.run()?)
    }

    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let summary = self.run(ctx)?;
        print_output(ctx, &summary)
    }
}
