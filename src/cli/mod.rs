//! Command-line surface: argument parsing and command dispatch.

mod consult;
mod report;

pub use consult::{parse_input, run_consultation, Input};
pub use report::{execute_stats, execute_validate};

use clap::{Parser, Subcommand};

/// Interactive client for the visa rule engine.
#[derive(Parser, Debug)]
#[command(name = "visa-consult", version, about)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// The requested command, `consult` when none was given.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Consult)
    }
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run an interactive consultation
    Consult,

    /// Check the rule base for contradictions, cycles and dead rules
    Validate,

    /// Show consultation analytics
    Stats {
        /// Maximum number of questions to list
        #[arg(long, default_value = "10")]
        limit: u32,
    },
}

/// Result of a non-interactive command.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}
