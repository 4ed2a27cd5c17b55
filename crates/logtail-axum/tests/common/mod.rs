//! Shared fixtures for logtail-axum tests.

use std::net::SocketAddr;
use std::path::Path;

use logtail_axum::ServerConfig;
use logtail_core::TailSettings;

/// Endpoint route used by every test config.
pub const TEST_ROUTE: &str = "/ws/test_log";

/// Origin accepted by restricted test configs.
#[allow(dead_code)]
pub const TEST_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Config streaming `log_file` with fast polling and the given heartbeat.
pub fn test_config(log_file: &Path, heartbeat_secs: u64) -> ServerConfig {
    ServerConfig::with_defaults()
        .with_addr(SocketAddr::from(([127, 0, 0, 1], 0)))
        .with_endpoint(TEST_ROUTE, log_file)
        .with_tail_settings(TailSettings {
            poll_interval_ms: 50,
            heartbeat_interval_secs: heartbeat_secs,
            ..TailSettings::default()
        })
}
