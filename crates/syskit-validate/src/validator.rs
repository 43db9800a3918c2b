//! Runs checks over a loaded corpus.

use syskit_common_config::{ProjectLayout, ValidationConfig};
use syskit_common_fs::FsError;
use syskit_doc::{Corpus, CorpusError, DocDirs, DocKind, Templates};
use syskit_migrate::MigrationPlan;
use tracing::{debug, info, warn};

use crate::checks::{
    Check, DocumentCount, MigrationCompleteness, ReferenceIntegrity, RequiredFields,
    TraceabilityCompleteness,
};
use crate::report::ValidationReport;

/// Everything a check may inspect.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    /// Documents with templates excluded.
    pub corpus: &'a Corpus,
    pub layout: &'a ProjectLayout,
    pub config: &'a ValidationConfig,
    pub plan: &'a MigrationPlan,
}

/// An ordered set of checks.
pub struct Validator {
    checks: Vec<Box<dyn Check>>,
}

impl Validator {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Document count, reference integrity, required fields, traceability
    /// and migration completeness, in that order.
    pub fn standard() -> Self {
        Self::new()
            .with_check(DocumentCount)
            .with_check(ReferenceIntegrity)
            .with_check(RequiredFields)
            .with_check(TraceabilityCompleteness)
            .with_check(MigrationCompleteness)
    }

    pub fn with_check(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Run every check. A failing check does not stop the others.
    pub fn run(&self, ctx: &ValidationContext<'_>) -> Result<ValidationReport, ValidateError> {
        let mut report = ValidationReport::default();
        for check in &self.checks {
            debug!(check = check.name(), "Running check");
            let outcome = check.run(ctx)?;
            if outcome.passed {
                info!(check = outcome.name, "{}", outcome.message);
            } else {
                warn!(check = outcome.name, issues = outcome.issues.len(), "{}", outcome.message);
            }
            report.checks.push(outcome);
        }
        Ok(report)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::standard()
    }
}

/// Load the corpus under `layout` and run the standard checks.
pub fn validate(
    layout: &ProjectLayout,
    config: &ValidationConfig,
    plan: &MigrationPlan,
) -> Result<ValidationReport, ValidateError> {
    let corpus = Corpus::load(&DocDirs::from_layout(layout), Templates::Exclude)?;
    info!(
        requirements = corpus.count(DocKind::Req),
        interfaces = corpus.count(DocKind::Int),
        units = corpus.count(DocKind::Unit),
        "Validating corpus"
    );

    let ctx = ValidationContext {
        corpus: &corpus,
        layout,
        config,
        plan,
    };
    Validator::standard().run(&ctx)
}

/// Failures that stop validation. Findings are reported as issues instead.
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error(transparent)]
    Fs(#[from] FsError),
}
