//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where the server is wired together:
//! configuration is validated, the shared context is built and the listener
//! is bound.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::ws::WebSocketUpgrade;
use logtail_core::{LogSource, SessionConfig, SettingsError, TailSettings, validate_settings};
use serde::Serialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Default route of the log WebSocket.
pub const DEFAULT_LOG_ROUTE: &str = "/ws/uwsgi_log";

/// Default log file streamed by the endpoint.
pub const DEFAULT_LOG_FILE: &str = "/var/log/uwsgi/uwsgi.log";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 1111;

/// Origin policy applied before upgrading a connection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "origins", rename_all = "snake_case")]
pub enum OriginPolicy {
    /// Allow all origins.
    #[default]
    AllowAll,
    /// Allow specific origins. Requests without an `Origin` header (non-browser
    /// clients) are always allowed.
    AllowOrigins(Vec<String>),
}

impl OriginPolicy {
    pub fn allows(&self, origin: Option<&str>) -> bool {
        match (self, origin) {
            (Self::AllowAll, _) | (Self::AllowOrigins(_), None) => true,
            (Self::AllowOrigins(allowed), Some(origin)) => {
                allowed.iter().any(|a| a.eq_ignore_ascii_case(origin))
            }
        }
    }
}

/// WebSocket upgrade settings passed to the acceptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptorConfig {
    /// Read buffer size in bytes.
    pub read_buffer_size: usize,
    /// Write buffer size in bytes.
    pub write_buffer_size: usize,
    /// Largest inbound message accepted. `None` keeps the transport default.
    pub max_message_size: Option<usize>,
    pub origins: OriginPolicy,
}

impl Default for AcceptorConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: 1024,
            write_buffer_size: 1024,
            max_message_size: None,
            origins: OriginPolicy::default(),
        }
    }
}

impl AcceptorConfig {
    /// Apply the buffer settings to a pending upgrade.
    pub fn configure(&self, upgrade: WebSocketUpgrade) -> WebSocketUpgrade {
        let upgrade = upgrade
            .read_buffer_size(self.read_buffer_size)
            .write_buffer_size(self.write_buffer_size);
        match self.max_message_size {
            Some(size) => upgrade.max_message_size(size),
            None => upgrade,
        }
    }
}

/// The single route that streams a log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEndpoint {
    /// Request path, e.g. `/ws/uwsgi_log`.
    pub route: String,
    /// File streamed to clients of this route.
    pub source: LogSource,
}

impl LogEndpoint {
    pub fn new(route: impl Into<String>, source: impl Into<PathBuf>) -> Self {
        Self {
            route: route.into(),
            source: LogSource::new(source),
        }
    }

    /// Whether a request path targets this endpoint.
    pub fn matches(&self, path: &str) -> bool {
        path == self.route
    }
}

impl Default for LogEndpoint {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_ROUTE, DEFAULT_LOG_FILE)
    }
}

/// Configuration errors detected before the server starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Endpoint route {0:?} must start with '/' and name a path other than '/'")]
    InvalidRoute(String),

    #[error("Endpoint route {0:?} must not contain route parameters or wildcards")]
    RouteHasParameters(String),

    #[error("Log file path {} must be absolute", .0.display())]
    RelativeLogPath(PathBuf),

    #[error("{name} must be greater than zero")]
    ZeroBufferSize { name: &'static str },

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    /// Address the HTTP server listens on.
    pub addr: SocketAddr,
    pub endpoint: LogEndpoint,
    pub acceptor: AcceptorConfig,
    pub tail: TailSettings,
}

impl ServerConfig {
    /// Create config with default values.
    pub fn with_defaults() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            endpoint: LogEndpoint::default(),
            acceptor: AcceptorConfig::default(),
            tail: TailSettings::with_defaults(),
        }
    }

    /// Set the listening address.
    #[must_use]
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Set the streamed endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, route: impl Into<String>, log_file: impl Into<PathBuf>) -> Self {
        self.endpoint = LogEndpoint::new(route, log_file);
        self
    }

    /// Restrict upgrades to specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.acceptor.origins = OriginPolicy::AllowOrigins(origins);
        self
    }

    /// Set tail and heartbeat settings.
    #[must_use]
    pub fn with_tail_settings(mut self, tail: TailSettings) -> Self {
        self.tail = tail;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let route = &self.endpoint.route;
        if !route.starts_with('/') || route.len() < 2 {
            return Err(ConfigError::InvalidRoute(route.clone()));
        }
        if route.contains(['{', '}', '*', ':']) {
            return Err(ConfigError::RouteHasParameters(route.clone()));
        }
        if !self.endpoint.source.is_absolute() {
            return Err(ConfigError::RelativeLogPath(
                self.endpoint.source.path().to_path_buf(),
            ));
        }
        if self.acceptor.read_buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize {
                name: "read_buffer_size",
            });
        }
        if self.acceptor.write_buffer_size == 0 {
            return Err(ConfigError::ZeroBufferSize {
                name: "write_buffer_size",
            });
        }
        validate_settings(&self.tail)?;
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Application context for the Axum adapter.
///
/// Everything a handler needs; shared read-only by all sessions.
#[derive(Debug, Clone)]
pub struct AxumContext {
    pub endpoint: LogEndpoint,
    pub acceptor: AcceptorConfig,
    pub session: SessionConfig,
    /// Cancelled when the server shuts down; ends every open session.
    pub shutdown: CancellationToken,
}

/// Validate the configuration and build the handler context.
pub fn bootstrap(config: &ServerConfig, shutdown: CancellationToken) -> Result<AxumContext> {
    config.validate()?;

    info!(
        target: "logtail.config",
        addr = %config.addr,
        route = %config.endpoint.route,
        log_file = %config.endpoint.source,
        heartbeat_secs = config.tail.heartbeat_interval_secs,
        poll_ms = config.tail.poll_interval_ms,
        origins = ?config.acceptor.origins,
        "Axum bootstrap resolved configuration"
    );

    Ok(AxumContext {
        endpoint: config.endpoint.clone(),
        acceptor: config.acceptor.clone(),
        session: config.tail.session_config(),
        shutdown,
    })
}

/// Serve on a pre-bound listener until `ctx.shutdown` is cancelled.
pub async fn serve(listener: TcpListener, ctx: AxumContext) -> Result<()> {
    let addr = listener.local_addr()?;
    let shutdown = ctx.shutdown.clone();
    let route = ctx.endpoint.route.clone();
    let app = crate::routes::create_router(Arc::new(ctx));

    info!("logtail server listening on http://{addr}, streaming at ws://{addr}{route}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;

    info!("logtail server shut down");
    Ok(())
}

/// Bind the configured address and serve until `shutdown` is cancelled.
///
/// Failing to bind is returned as an error; it is the only failure that
/// should end the process.
pub async fn start_server(config: ServerConfig, shutdown: CancellationToken) -> Result<()> {
    let ctx = bootstrap(&config, shutdown)?;

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;

    serve(listener, ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment() {
        let config = ServerConfig::with_defaults();
        assert_eq!(config.addr.port(), 1111);
        assert_eq!(config.endpoint.route, "/ws/uwsgi_log");
        assert_eq!(
            config.endpoint.source.path(),
            std::path::Path::new("/var/log/uwsgi/uwsgi.log")
        );
        assert_eq!(config.acceptor.read_buffer_size, 1024);
        assert_eq!(config.acceptor.write_buffer_size, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_endpoint_matches_exact_path_only() {
        let endpoint = LogEndpoint::default();
        assert!(endpoint.matches("/ws/uwsgi_log"));
        assert!(!endpoint.matches("/ws/uwsgi_log/"));
        assert!(!endpoint.matches("/ws/other_log"));
        assert!(!endpoint.matches("/"));
    }

    #[test]
    fn test_allow_all_accepts_any_origin() {
        let policy = OriginPolicy::AllowAll;
        assert!(policy.allows(Some("https://evil.example")));
        assert!(policy.allows(None));
    }

    #[test]
    fn test_allow_origins_filters_browsers() {
        let policy = OriginPolicy::AllowOrigins(vec!["https://ops.example".to_string()]);
        assert!(policy.allows(Some("https://ops.example")));
        assert!(policy.allows(Some("HTTPS://OPS.EXAMPLE")));
        assert!(!policy.allows(Some("https://evil.example")));
        assert!(policy.allows(None));
    }

    #[test]
    fn test_validate_rejects_root_route() {
        let config = ServerConfig::with_defaults().with_endpoint("/", "/var/log/app.log");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRoute(_))
        ));
    }

    #[test]
    fn test_validate_rejects_route_parameters() {
        let config = ServerConfig::with_defaults().with_endpoint("/ws/{name}", "/var/log/app.log");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RouteHasParameters(_))
        ));
    }

    #[test]
    fn test_validate_rejects_relative_log_path() {
        let config = ServerConfig::with_defaults().with_endpoint("/ws/app", "logs/app.log");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RelativeLogPath(_))
        ));
    }

    #[test]
    fn test_validate_propagates_settings_errors() {
        let config = ServerConfig::with_defaults().with_tail_settings(TailSettings {
            heartbeat_interval_secs: 0,
            ..TailSettings::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Settings(SettingsError::ZeroHeartbeatInterval))
        ));
    }

    #[test]
    fn test_bootstrap_builds_session_config() {
        let config = ServerConfig::with_defaults().with_tail_settings(TailSettings {
            heartbeat_interval_secs: 12,
            ..TailSettings::default()
        });
        let ctx = bootstrap(&config, CancellationToken::new()).unwrap();
        assert_eq!(
            ctx.session.heartbeat_interval,
            std::time::Duration::from_secs(12)
        );
        assert_eq!(ctx.endpoint, config.endpoint);
    }

    #[test]
    fn test_bootstrap_rejects_invalid_config() {
        let config = ServerConfig::with_defaults().with_endpoint("ws", "/var/log/app.log");
        assert!(bootstrap(&config, CancellationToken::new()).is_err());
    }
}
