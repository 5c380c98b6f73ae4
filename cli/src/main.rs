mod commands;
mod hosts;
mod report;
mod sink;
mod terminal;

use std::process::ExitCode;

use commands::{CommandLine, scan};
use tracing::error;
use undead_common::config::ConfigError;

use crate::terminal::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose, commands.quiet);

    match scan::scan(commands).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Configuration errors carry their own code, everything else is a plain failure.
fn exit_code(e: &anyhow::Error) -> u8 {
    e.downcast_ref::<ConfigError>()
        .map(ConfigError::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|code| *code != 0)
        .unwrap_or(1)
}
