//! Output formatting for CLI commands.

use std::fmt::Write as _;

use console::style;
use serde::Serialize;
use syskit_doc::DocKind;
use syskit_migrate::MigrationSummary;
use syskit_trace::LinkReport;
use syskit_validate::ValidationReport;

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;

/// Trait for types that can be formatted for output
pub trait FormattedOutput {
    fn format_text(&self) -> String;

    fn format_json(&self) -> Result<String, serde_json::Error>
    where
        Self: Serialize,
    {
        serde_json::to_string_pretty(self)
    }
}

/// Print formatted output to stdout. `--quiet` suppresses text output only.
pub fn print_output<T>(ctx: &CommandContext, value: &T) -> Result<(), CliError>
where
    T: FormattedOutput + Serialize,
{
    let output = match ctx.format {
        OutputFormat::Text if ctx.quiet => return Ok(()),
        OutputFormat::Text => value.format_text(),
        OutputFormat::Json => value.format_json()?,
    };

    println!("{output}");
    Ok(())
}

fn heading(text: &str) -> String {
    style(text).bold().to_string()
}

impl FormattedOutput for MigrationSummary {
    fn format_text(&self) -> String {
        let mut out = heading("Migration");
        out.push('\n');
        for step in &self.steps {
            let _ = write!(out, "  {:<28} {:>3} created", step.step.label(), step.created);
            if step.skipped > 0 {
                let _ = write!(out, ", {} skipped", step.skipped);
            }
            out.push('\n');
        }
        for warning in &self.warnings {
            let _ = writeln!(out, "  {} {warning}", style("warning:").yellow());
        }
        let _ = write!(
            out,
            "{} Created {} documents",
            style("✓").green(),
            self.documents_created()
        );
        out
    }
}

impl FormattedOutput for LinkReport {
    fn format_text(&self) -> String {
        let mut out = heading("Traceability");
        out.push('\n');
        let scanned: Vec<String> = DocKind::ALL
            .iter()
            .map(|kind| format!("{} {kind}", self.scanned.get(kind).copied().unwrap_or(0)))
            .collect();
        let _ = writeln!(out, "  scanned {}", scanned.join(", "));
        for pass in &self.passes {
            let _ = writeln!(out, "  {:<12} {:>3} updated", pass.pass.label(), pass.updated.len());
        }
        let _ = write!(
            out,
            "{} {} sections filled, {} documents written",
            style("✓").green(),
            self.updates(),
            self.written
        );
        out
    }
}

/// Validation report with the listing limit for text output.
#[derive(Debug, Serialize)]
pub struct ValidationOutput {
    #[serde(flatten)]
    pub report: ValidationReport,
    #[serde(skip)]
    pub max_listed: usize,
}

impl FormattedOutput for ValidationOutput {
    fn format_text(&self) -> String {
        let mut out = heading("Validation");
        out.push('\n');
        for check in &self.report.checks {
            let mark = if check.passed {
                style("✓ PASS").green()
            } else {
                style("✗ FAIL").red()
            };
            let _ = writeln!(out, "  {mark} {}: {}", check.name, check.message);

            if !check.passed {
                for issue in check.issues.iter().take(self.max_listed) {
                    let _ = writeln!(out, "      - {issue}");
                }
                if check.issues.len() > self.max_listed {
                    let _ = writeln!(
                        out,
                        "      ... and {} more",
                        check.issues.len() - self.max_listed
                    );
                }
            }
        }

        if self.report.passed() {
            let _ = write!(out, "{}", style("✓ ALL CHECKS PASSED").green().bold());
        } else {
            let _ = write!(out, "{}", style("✗ SOME CHECKS FAILED").red().bold());
        }
        out
    }
}

/// Combined output of `syskit run`.
#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub migration: MigrationSummary,
    pub traceability: LinkReport,
    pub validation: ValidationOutput,
}

impl FormattedOutput for RunOutput {
    fn format_text(&self) -> String {
        [
            self.migration.format_text(),
            self.traceability.format_text(),
            self.validation.format_text(),
        ]
        .join("\n\n")
    }
}
