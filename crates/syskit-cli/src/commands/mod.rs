//! Command implementations.

mod migrate;
mod run;
mod trace;
mod validate;

pub use migrate::MigrateCommand;
pub use run::RunCommand;
pub use trace::TraceCommand;
pub use validate::ValidateCommand;
