//! The five corpus checks.

use syskit_common_fs::{self as fs, path};
use syskit_doc::{references, references_of, DocKind, Document, PLACEHOLDER};
use syskit_migrate::count_user_stories;
use tracing::debug;

use crate::report::CheckOutcome;
use crate::validator::{ValidateError, ValidationContext};

/// A read-only check over the corpus.
pub trait Check {
    /// Stable snake_case name used in reports.
    fn name(&self) -> &'static str;

    /// Inspect `ctx`. Findings are issues in the outcome; `Err` is reserved
    /// for I/O failures.
    fn run(&self, ctx: &ValidationContext<'_>) -> Result<CheckOutcome, ValidateError>;
}

/// Total document count against the configured minimum.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentCount;

impl Check for DocumentCount {
    fn name(&self) -> &'static str {
        "document_count"
    }

    fn run(&self, ctx: &ValidationContext<'_>) -> Result<CheckOutcome, ValidateError> {
        let corpus = ctx.corpus;
        let total = corpus.len();
        debug!(
            requirements = corpus.count(DocKind::Req),
            interfaces = corpus.count(DocKind::Int),
            units = corpus.count(DocKind::Unit),
            total,
            "Counted documents"
        );

        if total < ctx.config.min_documents {
            let message = format!(
                "Expected ~{} documents, found {total}",
                ctx.config.expected_documents
            );
            return Ok(CheckOutcome::fail(self.name(), message.clone(), vec![message]));
        }
        Ok(CheckOutcome::pass(
            self.name(),
            format!(
                "Document count: {total} ({} REQ, {} INT, {} UNIT)",
                corpus.count(DocKind::Req),
                corpus.count(DocKind::Int),
                corpus.count(DocKind::Unit)
            ),
        ))
    }
}

/// Every id token names an existing document.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceIntegrity;

impl Check for ReferenceIntegrity {
    fn name(&self) -> &'static str {
        "reference_integrity"
    }

    fn run(&self, ctx: &ValidationContext<'_>) -> Result<CheckOutcome, ValidateError> {
        let existing = ctx.corpus.ids();
        let mut issues = Vec::new();

        for doc in ctx.corpus.iter() {
            for target in references(doc.source()) {
                if !existing.contains(&target) {
                    issues.push(format!("{} → {target} (not found)", doc.id()));
                }
            }
        }

        Ok(CheckOutcome::from_issues(
            self.name(),
            issues,
            "All cross-references are valid",
            |n| format!("Found {n} broken references"),
        ))
    }
}

/// Mandatory sections are present and traceability sections resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredFields;

impl RequiredFields {
    fn missing(doc: &Document, sections: &[&str], issues: &mut Vec<String>) {
        for name in sections {
            if !doc.markdown().has_content(name) {
                issues.push(format!("{}: Missing {name} section", doc.id()));
            }
        }
    }

    fn still_pending(doc: &Document, name: &str) -> bool {
        doc.markdown()
            .section_text(name)
            .is_some_and(|text| text.contains(PLACEHOLDER))
    }
}

impl Check for RequiredFields {
    fn name(&self) -> &'static str {
        "required_fields"
    }

    fn run(&self, ctx: &ValidationContext<'_>) -> Result<CheckOutcome, ValidateError> {
        let corpus = ctx.corpus;
        let mut issues = Vec::new();

        for doc in corpus.documents(DocKind::Req) {
            Self::missing(doc, &["Requirement", "Rationale", "Allocated To"], &mut issues);
            if Self::still_pending(doc, "Allocated To") {
                issues.push(format!("{}: Allocated To still contains {PLACEHOLDER}", doc.id()));
            }
        }

        for doc in corpus.documents(DocKind::Int) {
            Self::missing(doc, &["Type", "Specification"], &mut issues);
            // External parties are allowed to stay open
            let external = doc
                .markdown()
                .section_text("Parties")
                .is_some_and(|text| text.contains("External"));
            if Self::still_pending(doc, "Parties") && !external {
                issues.push(format!("{}: Parties still contains {PLACEHOLDER}", doc.id()));
            }
        }

        for doc in corpus.documents(DocKind::Unit) {
            Self::missing(doc, &["Purpose", "Implementation"], &mut issues);
            if Self::still_pending(doc, "Implements Requirements") {
                issues.push(format!(
                    "{}: Implements Requirements still contains {PLACEHOLDER}",
                    doc.id()
                ));
            }
        }

        Ok(CheckOutcome::from_issues(
            self.name(),
            issues,
            "All required fields are populated",
            |n| format!("Found {n} missing/incomplete fields"),
        ))
    }
}

/// Every REQ reaches a UNIT, every UNIT a REQ, every internal INT a REQ.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceabilityCompleteness;

impl Check for TraceabilityCompleteness {
    fn name(&self) -> &'static str {
        "traceability_completeness"
    }

    fn run(&self, ctx: &ValidationContext<'_>) -> Result<CheckOutcome, ValidateError> {
        let corpus = ctx.corpus;
        let mut issues = Vec::new();

        for doc in corpus.documents(DocKind::Req) {
            if references_of(doc.source(), DocKind::Unit).is_empty() {
                issues.push(format!("{}: Not allocated to any UNIT", doc.id()));
            }
        }

        for doc in corpus.documents(DocKind::Unit) {
            if references_of(doc.source(), DocKind::Req).is_empty() {
                issues.push(format!("{}: Does not implement any REQ", doc.id()));
            }
        }

        for doc in corpus.documents(DocKind::Int) {
            let Some(referenced_by) = doc.markdown().section_text("Referenced By") else {
                continue;
            };
            if references_of(referenced_by, DocKind::Req).is_empty()
                && !doc.source().contains("External Standard")
            {
                issues.push(format!("{}: Not referenced by any REQ", doc.id()));
            }
        }

        Ok(CheckOutcome::from_issues(
            self.name(),
            issues,
            "Traceability is complete",
            |n| format!("Found {n} traceability gaps"),
        ))
    }
}

/// Generated documents cover the legacy user stories and contracts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MigrationCompleteness;

impl Check for MigrationCompleteness {
    fn name(&self) -> &'static str {
        "migration_completeness"
    }

    fn run(&self, ctx: &ValidationContext<'_>) -> Result<CheckOutcome, ValidateError> {
        let specs_dir = &ctx.layout.specs_dir;
        if !specs_dir.is_dir() {
            let shown = path::relative_to(specs_dir, &ctx.layout.root)
                .map(path::to_unix_string)
                .unwrap_or_else(|| specs_dir.display().to_string());
            return Ok(CheckOutcome::pass(
                self.name(),
                format!("Skipped: {shown} not found"),
            ));
        }

        let mut issues = Vec::new();

        let mut stories = 0;
        for feature in &ctx.plan.features {
            let spec = specs_dir.join(feature.spec_file());
            if spec.is_file() {
                stories += count_user_stories(&fs::read_document(&spec)?);
            }
        }
        let story_ids = ctx.plan.user_story_ids();
        let story_reqs = ctx
            .corpus
            .documents(DocKind::Req)
            .iter()
            .filter(|doc| story_ids.contains(doc.id()))
            .count();
        debug!(stories, story_reqs, "Counted user stories");
        if story_reqs < stories {
            issues.push(format!(
                "Expected {stories} user story REQs, found {story_reqs}"
            ));
        }

        let contracts = fs::list_under(specs_dir, "*/contracts/*.md")?.len();
        let contract_ids = ctx.plan.contract_ids();
        let contract_ints = ctx
            .corpus
            .documents(DocKind::Int)
            .iter()
            .filter(|doc| contract_ids.contains(doc.id()))
            .count();
        debug!(contracts, contract_ints, "Counted contracts");
        if contract_ints < contracts {
            issues.push(format!(
                "Expected at least {contracts} internal INT docs, found {contract_ints}"
            ));
        }

        Ok(CheckOutcome::from_issues(
            self.name(),
            issues,
            "Content migration is complete",
            |_| "Content migration issues".to_string(),
        ))
    }
}
