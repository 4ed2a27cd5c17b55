//! CLI entry point - the composition root.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use logtail_cli::{Cli, CliError, Commands, handlers};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env before parsing so LOGTAIL_* variables feed the flags
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "logtail exited with an error");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.into_command() {
        Commands::Serve(args) => handlers::serve::execute(args.into_server_config()).await,
        Commands::Config(args) => handlers::config::execute(&args.into_server_config()),
    }
}
