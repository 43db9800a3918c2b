//! Check outcomes.

use serde::Serialize;

/// Result of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub passed: bool,
    /// One-line summary.
    pub message: String,
    /// Every issue found, in discovery order.
    pub issues: Vec<String>,
}

impl CheckOutcome {
    pub fn pass(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            passed: true,
            message: message.into(),
            issues: Vec::new(),
        }
    }

    pub fn fail(name: &'static str, message: impl Into<String>, issues: Vec<String>) -> Self {
        Self {
            name,
            passed: false,
            message: message.into(),
            issues,
        }
    }

    /// Pass with `ok` when `issues` is empty, else fail with `summary(count)`.
    pub fn from_issues(
        name: &'static str,
        issues: Vec<String>,
        ok: &str,
        summary: impl FnOnce(usize) -> String,
    ) -> Self {
        if issues.is_empty() {
            Self::pass(name, ok)
        } else {
            Self::fail(name, summary(issues.len()), issues)
        }
    }
}

/// Outcomes of every check, in run order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub checks: Vec<CheckOutcome>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn check(&self, name: &str) -> Option<&CheckOutcome> {
        self.checks.iter().find(|c| c.name == name)
    }

    /// Total issues across all checks.
    pub fn issue_count(&self) -> usize {
        self.checks.iter().map(|c| c.issues.len()).sum()
    }
}
