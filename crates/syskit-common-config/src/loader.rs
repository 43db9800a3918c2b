//! Configuration file loading and parsing.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::env::{vars, Environment};
use crate::types::SyskitConfig;

/// Config file location relative to the project root.
pub const CONFIG_FILE: &str = ".syskit/config.yaml";

static ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}:]+)(?::-([^}]*))?\}").expect("env reference pattern is valid")
});

/// Config loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config: {source}")]
    ReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("invalid YAML at line {}: {message}", line.map(|l| l.to_string()).unwrap_or_else(|| "unknown".to_string()))]
    ParseError { line: Option<usize>, message: String },

    #[error("validation error: {message}")]
    ValidationError { message: String },

    #[error("environment variable not found: {var}")]
    EnvVarNotFound { var: String },
}

/// Configuration loader.
pub struct ConfigLoader {
    base_path: PathBuf,
    explicit: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader for the given project directory.
    pub fn new(project_dir: impl AsRef<Path>) -> Self {
        Self {
            base_path: project_dir.as_ref().to_path_buf(),
            explicit: None,
        }
    }

    /// Load from an explicit file instead of `.syskit/config.yaml`.
    ///
    /// Unlike the default location, an explicit file must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        self.explicit = Some(path.as_ref().to_path_buf());
        self
    }

    /// Path the loader reads.
    pub fn config_path(&self) -> PathBuf {
        self.explicit
            .clone()
            .unwrap_or_else(|| self.base_path.join(CONFIG_FILE))
    }

    /// Load configuration, falling back to defaults when the default file is absent.
    pub fn load(&self) -> Result<SyskitConfig, ConfigError> {
        let config_path = self.config_path();

        let mut config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let expanded = self.expand_env_vars(&contents)?;
            if expanded.trim().is_empty() {
                SyskitConfig::default()
            } else {
                serde_yaml::from_str(&expanded).map_err(|e| ConfigError::ParseError {
                    line: e.location().map(|l| l.line()),
                    message: e.to_string(),
                })?
            }
        } else if self.explicit.is_some() {
            return Err(ConfigError::NotFound { path: config_path });
        } else {
            SyskitConfig::default()
        };

        self.apply_env_overrides(&mut config);
        self.validate(&config)?;
        Ok(config)
    }

    /// Expand environment variables in the form `${VAR}` or `${VAR:-default}`.
    fn expand_env_vars(&self, content: &str) -> Result<String, ConfigError> {
        let mut result = content.to_string();

        for cap in ENV_REF.captures_iter(content) {
            let full_match = &cap[0];
            let var_name = &cap[1];
            let default = cap.get(2).map(|m| m.as_str());

            let value = match Environment::get(var_name) {
                Some(v) => v,
                None => match default {
                    Some(d) => d.to_string(),
                    None => {
                        return Err(ConfigError::EnvVarNotFound {
                            var: var_name.to_string(),
                        })
                    }
                },
            };

            result = result.replace(full_match, &value);
        }

        Ok(result)
    }

    fn apply_env_overrides(&self, config: &mut SyskitConfig) {
        if let Some(specs) = Environment::get(vars::SYSKIT_SPECS_DIR) {
            config.paths.specs = PathBuf::from(specs);
        }
        if let Some(docs) = Environment::get(vars::SYSKIT_DOC_DIR) {
            config.paths.docs = PathBuf::from(docs);
        }
    }

    /// Validate configuration values.
    fn validate(&self, config: &SyskitConfig) -> Result<(), ConfigError> {
        if config.validation.min_documents == 0 {
            return Err(ConfigError::ValidationError {
                message: "validation.min_documents must be greater than 0".to_string(),
            });
        }

        if config.migration.adrs_per_research_file == 0 {
            return Err(ConfigError::ValidationError {
                message: "migration.adrs_per_research_file must be greater than 0".to_string(),
            });
        }

        if config.migration.adr_context_chars == 0 {
            return Err(ConfigError::ValidationError {
                message: "migration.adr_context_chars must be greater than 0".to_string(),
            });
        }

        if let Some(date) = &config.migration.adr_date {
            if chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_err() {
                return Err(ConfigError::ValidationError {
                    message: format!("migration.adr_date must be YYYY-MM-DD, got {date}"),
                });
            }
        }

        Ok(())
    }
}
