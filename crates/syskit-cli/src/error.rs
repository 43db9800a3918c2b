//! CLI error handling and formatting.

use std::io;
use std::path::PathBuf;

use console::style;
use syskit_common_config::ConfigError;
use syskit_common_fs::FsError;
use syskit_doc::CorpusError;
use syskit_migrate::{MigrateError, PlanError};
use syskit_trace::{EstablishError, TableError};
use syskit_validate::ValidateError;
use thiserror::Error;

use crate::Exit;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// CLI error type with rich context
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        path: Option<PathBuf>,
    },

    #[error("{message}")]
    Parse {
        message: String,
        #[source]
        source: Option<BoxedSource>,
        path: Option<PathBuf>,
    },

    #[error("{failed} of {total} validation checks failed")]
    ValidationFailed { failed: usize, total: usize },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Io { .. } => "E002",
            Self::Parse { .. } => "E003",
            Self::ValidationFailed { .. } => "E004",
            Self::Other(_) => "E999",
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> Exit {
        match self {
            Self::Config { .. } => Exit::ConfigError,
            Self::Io { .. } => Exit::IoError,
            Self::Parse { .. } => Exit::ParseError,
            Self::ValidationFailed { .. } => Exit::ValidationFailed,
            // Only output serialization ends up here
            Self::Other(_) => Exit::IoError,
        }
    }

    /// Get hint for this error if available
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } => hint.as_deref(),
            Self::ValidationFailed { .. } => Some("Run with -v to log every check"),
            _ => None,
        }
    }

    /// File the error concerns, if any
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } => path.as_ref(),
            _ => None,
        }
    }

    /// Create a config error with hint
    pub fn config_with_hint(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
            hint: Some(hint.into()),
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
            path: None,
        }
    }

    /// Create a document parse error
    pub fn parse(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self::Parse {
            message: message.into(),
            source: Some(Box::new(source)),
            path: Some(path.into()),
        }
    }
}

/// Print `error` to stderr with its code, source chain and hint.
pub fn print_error(error: &CliError) {
    eprintln!(
        "{} {error}",
        style(format!("error[{}]:", error.code())).red().bold()
    );

    if let Some(path) = error.path() {
        eprintln!("  {} {}", style("-->").blue(), path.display());
    }

    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        eprintln!("  {} {cause}", style("caused by:").dim());
        source = cause.source();
    }

    if let Some(hint) = error.hint() {
        eprintln!("\n{} {hint}", style("hint:").cyan().bold());
    }
}

// Conversion implementations
impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::config_with_hint(
            format!("Configuration error: {err}"),
            err,
            "Check .syskit/config.yaml or the file given with --config",
        )
    }
}

impl From<FsError> for CliError {
    fn from(err: FsError) -> Self {
        Self::Io {
            message: err.to_string(),
            path: err.path().map(PathBuf::from),
            source: Some(Box::new(err)),
        }
    }
}

impl From<CorpusError> for CliError {
    fn from(err: CorpusError) -> Self {
        match err {
            CorpusError::Fs(fs) => fs.into(),
            CorpusError::Parse { path, source } => {
                Self::parse(format!("Cannot parse {}", path.display()), source, path)
            }
        }
    }
}

impl From<PlanError> for CliError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Read(fs) => fs.into(),
            other => Self::config_with_hint(
                format!("Invalid migration plan: {other}"),
                other,
                "Check the file configured as tables.migration",
            ),
        }
    }
}

impl From<TableError> for CliError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::Read(fs) => fs.into(),
            other => Self::config_with_hint(
                format!("Invalid traceability tables: {other}"),
                other,
                "Check the file configured as tables.traceability",
            ),
        }
    }
}

impl From<MigrateError> for CliError {
    fn from(err: MigrateError) -> Self {
        match err {
            MigrateError::Fs(fs) => fs.into(),
            MigrateError::Extract { path, source } => Self::parse(
                format!("Cannot extract user stories from {}", path.display()),
                source,
                path,
            ),
            MigrateError::Parse { path, source } => {
                Self::parse(format!("Cannot parse {}", path.display()), source, path)
            }
            other @ (MigrateError::Templates(_)
            | MigrateError::Render { .. }
            | MigrateError::Decision { .. }) => Self::Parse {
                message: format!("Cannot render document: {other}"),
                source: Some(Box::new(other)),
                path: None,
            },
        }
    }
}

impl From<EstablishError> for CliError {
    fn from(err: EstablishError) -> Self {
        match err {
            EstablishError::Tables(e) => e.into(),
            EstablishError::Corpus(e) => e.into(),
        }
    }
}

impl From<ValidateError> for CliError {
    fn from(err: ValidateError) -> Self {
        match err {
            ValidateError::Corpus(e) => e.into(),
            ValidateError::Fs(e) => e.into(),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(anyhow::anyhow!("JSON serialization failed: {err}"))
    }
}
