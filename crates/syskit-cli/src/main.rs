//! syskit - speckit migration and traceability for REQ/INT/UNIT documents
//!
//! Main entry point for the `syskit` binary.

use std::process::ExitCode;

use clap::Parser;
use syskit_common_log::{LogConfig, LogLevel};

mod cli;
mod commands;
mod error;
mod output;

use cli::Cli;
use error::CliError;

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    ValidationFailed = 1,
    ConfigError = 2,
    IoError = 3,
    ParseError = 4,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(&cli);

    match run(cli) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            error::print_error(&e);
            e.exit_code().into()
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.load_config()?;
    cli.execute(config)
}

fn init_logging(cli: &Cli) {
    // SYSKIT_LOG_* variables win over the flags
    let config = LogConfig::default()
        .level(LogLevel::from_verbosity(cli.verbose, cli.quiet))
        .with_target(cli.verbose >= 2)
        .with_env();

    if let Err(e) = syskit_common_log::init(config) {
        eprintln!("warning: {e}");
    }
}
