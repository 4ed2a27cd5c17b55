//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::{Commands, ServeArgs};

/// Stream the live tail of a log file to browsers over WebSocket.
///
/// Without a subcommand the server runs with the top-level flags.
#[derive(Parser, Debug)]
#[command(name = "logtail")]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub serve: ServeArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The command to run; a bare invocation serves.
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve(self.serve))
    }
}
