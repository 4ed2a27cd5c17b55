//! Settings domain types and validation.
//!
//! `TailSettings` is the serializable form of everything that tunes a
//! session: how often the file is polled, how often heartbeats go out and
//! how much data a single poll may consume.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::session::SessionConfig;
use crate::tail::TailConfig;

/// Default delay between two polls of the log file.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// Default delay between two heartbeat pings.
pub const DEFAULT_HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Default length at which an unterminated line is flushed in pieces.
pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Default cap on bytes consumed by a single poll.
pub const DEFAULT_MAX_READ_BYTES: usize = 4 * 1024 * 1024;

/// Tail and heartbeat settings for every session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TailSettings {
    /// Delay between two polls of the log file, in milliseconds.
    pub poll_interval_ms: u64,

    /// Delay between two heartbeat pings, in seconds.
    pub heartbeat_interval_secs: u64,

    /// How long a missing file is waited for before the tail gives up.
    /// `None` waits forever.
    pub reopen_timeout_secs: Option<u64>,

    /// Unterminated lines longer than this are emitted in pieces.
    pub max_line_bytes: usize,

    /// Maximum bytes read from the file per poll.
    pub max_read_bytes: usize,
}

impl TailSettings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            heartbeat_interval_secs: DEFAULT_HEARTBEAT_INTERVAL_SECS,
            reopen_timeout_secs: None,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            max_read_bytes: DEFAULT_MAX_READ_BYTES,
        }
    }

    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub const fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn reopen_timeout(&self) -> Option<Duration> {
        self.reopen_timeout_secs.map(Duration::from_secs)
    }

    /// Tailer configuration derived from these settings.
    pub fn tail_config(&self) -> TailConfig {
        TailConfig {
            poll_interval: self.poll_interval(),
            reopen_timeout: self.reopen_timeout(),
            max_line_bytes: self.max_line_bytes,
            max_read_bytes: self.max_read_bytes,
        }
    }

    /// Session configuration derived from these settings.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            heartbeat_interval: self.heartbeat_interval(),
            tail: self.tail_config(),
        }
    }
}

impl Default for TailSettings {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Poll interval must be greater than zero")]
    ZeroPollInterval,

    #[error("Heartbeat interval must be greater than zero")]
    ZeroHeartbeatInterval,

    #[error("Poll interval ({poll_ms} ms) must be shorter than the heartbeat interval ({heartbeat_secs} s)")]
    PollSlowerThanHeartbeat { poll_ms: u64, heartbeat_secs: u64 },

    #[error("Reopen timeout must be greater than zero when set")]
    ZeroReopenTimeout,

    #[error("{name} must be greater than zero")]
    ZeroSize { name: &'static str },
}

/// Validate settings values.
pub fn validate_settings(settings: &TailSettings) -> Result<(), SettingsError> {
    if settings.poll_interval_ms == 0 {
        return Err(SettingsError::ZeroPollInterval);
    }
    if settings.heartbeat_interval_secs == 0 {
        return Err(SettingsError::ZeroHeartbeatInterval);
    }
    if settings.poll_interval() >= settings.heartbeat_interval() {
        return Err(SettingsError::PollSlowerThanHeartbeat {
            poll_ms: settings.poll_interval_ms,
            heartbeat_secs: settings.heartbeat_interval_secs,
        });
    }
    if settings.reopen_timeout_secs == Some(0) {
        return Err(SettingsError::ZeroReopenTimeout);
    }
    if settings.max_line_bytes == 0 {
        return Err(SettingsError::ZeroSize {
            name: "max_line_bytes",
        });
    }
    if settings.max_read_bytes == 0 {
        return Err(SettingsError::ZeroSize {
            name: "max_read_bytes",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = TailSettings::with_defaults();
        assert_eq!(settings.poll_interval(), Duration::from_millis(250));
        assert_eq!(settings.heartbeat_interval(), Duration::from_secs(30));
        assert_eq!(settings.reopen_timeout(), None);
        assert_eq!(settings, TailSettings::default());
    }

    #[test]
    fn test_validate_settings_valid() {
        tokio_test::assert_ok!(validate_settings(&TailSettings::with_defaults()));
    }

    #[test]
    fn test_validate_zero_poll_interval() {
        let settings = TailSettings {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::ZeroPollInterval)
        );
    }

    #[test]
    fn test_validate_poll_slower_than_heartbeat() {
        let settings = TailSettings {
            poll_interval_ms: 5_000,
            heartbeat_interval_secs: 5,
            ..Default::default()
        };
        assert!(matches!(
            validate_settings(&settings),
            Err(SettingsError::PollSlowerThanHeartbeat { .. })
        ));
    }

    #[test]
    fn test_validate_zero_reopen_timeout() {
        let settings = TailSettings {
            reopen_timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::ZeroReopenTimeout)
        );
    }

    #[test]
    fn test_validate_zero_sizes() {
        let settings = TailSettings {
            max_read_bytes: 0,
            ..Default::default()
        };
        assert_eq!(
            validate_settings(&settings),
            Err(SettingsError::ZeroSize {
                name: "max_read_bytes"
            })
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: TailSettings =
            serde_json::from_str(r#"{"heartbeat_interval_secs": 10}"#).unwrap();
        assert_eq!(settings.heartbeat_interval_secs, 10);
        assert_eq!(settings.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        assert_eq!(settings.max_line_bytes, DEFAULT_MAX_LINE_BYTES);
    }

    #[test]
    fn test_session_config_carries_intervals() {
        let settings = TailSettings {
            poll_interval_ms: 100,
            heartbeat_interval_secs: 7,
            reopen_timeout_secs: Some(60),
            ..Default::default()
        };
        let config = settings.session_config();
        assert_eq!(config.heartbeat_interval, Duration::from_secs(7));
        assert_eq!(config.tail.poll_interval, Duration::from_millis(100));
        assert_eq!(config.tail.reopen_timeout, Some(Duration::from_secs(60)));
    }
}
