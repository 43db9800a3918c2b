//! Speckit to syskit migration.
//!
//! Reads the legacy feature specifications and contracts under `specs/` and
//! writes requirement, interface and design-unit documents whose traceability
//! sections are left pending for `syskit trace`.

pub mod extract;
pub mod migrator;
pub mod plan;
pub mod templates;

pub use extract::{count_user_stories, extract_user_stories, ExtractError, Priority, UserStory};
pub use migrator::{MigrateError, MigrationSummary, Migrator, Step, StepReport, DECISIONS_FILE};
pub use plan::{MigrationPlan, PlanError};
pub use templates::{DocRenderer, RenderError};
