//! Migration validation.
//!
//! Five independent [`Check`]s run over the document corpus and report
//! issues without modifying anything.

pub mod checks;
pub mod report;
pub mod validator;

pub use checks::{
    Check, DocumentCount, MigrationCompleteness, ReferenceIntegrity, RequiredFields,
    TraceabilityCompleteness,
};
pub use report::{CheckOutcome, ValidationReport};
pub use validator::{validate, ValidateError, ValidationContext, Validator};
