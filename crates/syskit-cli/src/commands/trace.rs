//! Trace command implementation.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use syskit_doc::DocDirs;
use syskit_trace::{establish, LinkReport};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::print_output;

/// Fill pending traceability sections from the adjacency tables
#[derive(Debug, Default, Parser)]
pub struct TraceCommand {
    /// Traceability tables to use instead of the configured ones
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub tables: Option<PathBuf>,
}

impl TraceCommand {
    pub fn run(&self, ctx: &CommandContext) -> Result<LinkReport, CliError> {
        let tables = ctx.tables(self.tables.as_deref())?;
        Ok(establish(&DocDirs::from_layout(&ctx.layout), &tables)?)
    }

    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let report = self.run(ctx)?;
        print_output(ctx, &report)
    }
}
