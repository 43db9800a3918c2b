//! Run command implementation.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use tracing::info;

use super::validate::check_passed;
use super::{MigrateCommand, TraceCommand, ValidateCommand};
use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, RunOutput};

/// Migrate, trace and validate in one go
#[derive(Debug, Parser)]
pub struct RunCommand {
    /// Migration plan to use instead of the configured one
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub plan: Option<PathBuf>,

    /// Traceability tables to use instead of the configured ones
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub tables: Option<PathBuf>,

    /// Issues listed per failed check
    #[arg(long, value_name = "N")]
    pub max_issues: Option<usize>,
}

impl RunCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        info!("Step 1/3: migrating speckit content");
        let migration = MigrateCommand {
            plan: self.plan.clone(),
        }
        .run(ctx)?;

        info!("Step 2/3: establishing traceability");
        let traceability = TraceCommand {
            tables: self.tables.clone(),
        }
        .run(ctx)?;

        info!("Step 3/3: validating");
        let validation = ValidateCommand {
            plan: self.plan.clone(),
            max_issues: self.max_issues,
        }
        .run(ctx)?;

        let output = RunOutput {
            migration,
            traceability,
            validation,
        };
        print_output(ctx, &output)?;
        check_passed(&output.validation)
    }
}
