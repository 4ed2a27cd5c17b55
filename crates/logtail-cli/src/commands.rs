//! Subcommands and their arguments.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use logtail_axum::ServerConfig;
use logtail_axum::bootstrap::{DEFAULT_LOG_FILE, DEFAULT_LOG_ROUTE};
use logtail_core::{DEFAULT_HEARTBEAT_INTERVAL_SECS, DEFAULT_POLL_INTERVAL_MS, TailSettings};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the WebSocket server
    Serve(ServeArgs),

    /// Print the effective configuration as JSON and exit
    Config(ServeArgs),
}

/// Server options. Every flag can also be set through the environment.
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "LOGTAIL_ADDR", default_value = "0.0.0.0:1111")]
    pub addr: SocketAddr,

    /// Route of the log WebSocket
    #[arg(long, env = "LOGTAIL_ENDPOINT", default_value = DEFAULT_LOG_ROUTE)]
    pub endpoint: String,

    /// Absolute path of the log file to stream
    #[arg(long = "log-file", env = "LOGTAIL_LOG_FILE", default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Seconds between heartbeat pings
    #[arg(long = "heartbeat-secs", env = "LOGTAIL_HEARTBEAT_SECS", default_value_t = DEFAULT_HEARTBEAT_INTERVAL_SECS)]
    pub heartbeat_secs: u64,

    /// Milliseconds between polls of the log file
    #[arg(long = "poll-ms", env = "LOGTAIL_POLL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_ms: u64,

    /// Give up on a missing log file after this many seconds (default: wait forever)
    #[arg(long = "reopen-timeout-secs", env = "LOGTAIL_REOPEN_TIMEOUT_SECS")]
    pub reopen_timeout_secs: Option<u64>,

    /// Allowed browser origin; repeat or comma-separate. Empty allows all.
    #[arg(
        long = "allow-origin",
        env = "LOGTAIL_ALLOW_ORIGINS",
        value_delimiter = ','
    )]
    pub allow_origins: Vec<String>,
}

impl ServeArgs {
    /// Build the server configuration these arguments describe.
    pub fn into_server_config(self) -> ServerConfig {
        let tail = TailSettings {
            poll_interval_ms: self.poll_ms,
            heartbeat_interval_secs: self.heartbeat_secs,
            reopen_timeout_secs: self.reopen_timeout_secs,
            ..TailSettings::with_defaults()
        };
        let config = ServerConfig::with_defaults()
            .with_addr(self.addr)
            .with_endpoint(self.endpoint, self.log_file)
            .with_tail_settings(tail);

        if self.allow_origins.is_empty() {
            config
        } else {
            config.with_allowed_origins(self.allow_origins)
        }
    }
}
