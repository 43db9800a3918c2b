//! CLI argument definitions using clap derive macros.

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use syskit_common_config::{vars, ConfigLoader, ProjectLayout, SyskitConfig};
use syskit_common_fs::path;
use syskit_migrate::MigrationPlan;
use syskit_trace::TraceTables;
use tracing::debug;

use crate::commands::{MigrateCommand, RunCommand, TraceCommand, ValidateCommand};
use crate::error::CliError;

/// syskit - requirement, interface and design-unit documents
///
/// Migrates speckit specifications into REQ/INT/UNIT documents, fills in
/// their traceability sections and validates the result.
#[derive(Debug, Parser)]
#[command(
    name = "syskit",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        global = true,
        help = "Increase verbosity level"
    )]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Suppress non-error output"
    )]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = vars::SYSKIT_CONFIG,
        value_hint = ValueHint::FilePath,
        help = "Path to configuration file"
    )]
    pub config: Option<PathBuf>,

    /// Project root
    #[arg(
        long,
        global = true,
        value_hint = ValueHint::DirPath,
        help = "Project root (defaults to the nearest directory holding .syskit or .git)"
    )]
    pub root: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        value_enum,
        help = "Output format (text, json)"
    )]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate REQ/INT/UNIT documents from the speckit tree
    Migrate(MigrateCommand),

    /// Fill pending traceability sections from the adjacency tables
    Trace(TraceCommand),

    /// Check the corpus for completeness and broken references
    Validate(ValidateCommand),

    /// Migrate, trace and validate in one go
    Run(RunCommand),
}

impl Cli {
    /// Project root from `--root`, else the nearest ancestor of the current
    /// directory that holds `.syskit` or `.git`, else the current directory.
    pub fn project_root(&self) -> Result<PathBuf, CliError> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let cwd = std::env::current_dir()
            .map_err(|e| CliError::io("Cannot determine the current directory", e))?;
        Ok(path::find_project_root(&cwd).unwrap_or(cwd))
    }

    /// Load configuration from `--config` or `.syskit/config.yaml` under the root
    pub fn load_config(&self) -> Result<SyskitConfig, CliError> {
        let root = self.project_root()?;
        let mut loader = ConfigLoader::new(&root);
        if let Some(path) = &self.config {
            loader = loader.with_file(path);
        }
        debug!(path = %loader.config_path().display(), "Loading configuration");
        Ok(loader.load()?)
    }

    /// Execute the selected command
    pub fn execute(self, config: SyskitConfig) -> Result<(), CliError> {
        let root = self.project_root()?;
        let ctx = CommandContext {
            layout: config.layout(&root),
            config,
            format: self.format,
            quiet: self.quiet,
        };

        match self.command {
            Command::Migrate(cmd) => cmd.execute(&ctx),
            Command::Trace(cmd) => cmd.execute(&ctx),
            Command::Validate(cmd) => cmd.execute(&ctx),
            Command::Run(cmd) => cmd.execute(&ctx),
        }
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: SyskitConfig,
    pub layout: ProjectLayout,
    pub format: OutputFormat,
    pub quiet: bool,
}

impl CommandContext {
    /// `path` relative to the project root unless absolute.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.layout.root.join(path)
    }

    /// Migration plan from `explicit`, the configured file or the built-in plan.
    pub fn plan(&self, explicit: Option<&Path>) -> Result<MigrationPlan, CliError> {
        let path = explicit.or(self.config.tables.migration.as_deref());
        Ok(MigrationPlan::load(path.map(|p| self.resolve(p)).as_deref())?)
    }

    /// Traceability tables from `explicit`, the configured file or the built-in tables.
    pub fn tables(&self, explicit: Option<&Path>) -> Result<TraceTables, CliError> {
        let path = explicit.or(self.config.tables.traceability.as_deref());
        Ok(TraceTables::load(path.map(|p| self.resolve(p)).as_deref())?)
    }
}
