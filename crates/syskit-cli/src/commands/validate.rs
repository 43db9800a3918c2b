//! Validate command implementation.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use syskit_validate::validate;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, ValidationOutput};

/// Check the corpus for completeness and broken references
#[derive(Debug, Default, Parser)]
pub struct ValidateCommand {
    /// Migration plan the corpus was generated from
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub plan: Option<PathBuf>,

    /// Issues listed per failed check
    #[arg(long, value_name = "N")]
    pub max_issues: Option<usize>,
}

impl ValidateCommand {
    pub fn run(&self, ctx: &CommandContext) -> Result<ValidationOutput, CliError> {
        let plan = ctx.plan(self.plan.as_deref())?;
        let report = validate(&ctx.layout, &ctx.config.validation, &plan)?;
        Ok(ValidationOutput {
            report,
            max_listed: self
                .max_issues
                .unwrap_or(ctx.config.validation.max_listed_issues),
        })
    }

    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let output = self.run(ctx)?;
        print_output(ctx, &output)?;
        check_passed(&output)
    }
}

/// `ValidationFailed` unless every check passed.
pub(crate) fn check_passed(output: &ValidationOutput) -> Result<(), CliError> {
    let failed = output.report.failed().count();
    if failed > 0 {
        return Err(CliError::ValidationFailed {
            failed,
            total: output.report.checks.len(),
        });
    }
    Ok(())
}
