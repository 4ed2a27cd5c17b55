#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings for test-only crates
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tokio_test as _;

pub mod domain;
pub mod frame;
pub mod ports;
pub mod session;
pub mod settings;
pub mod tail;

// Re-export commonly used types for convenience
pub use domain::{HeartbeatTick, LogSource, SessionId, TailEvent};
pub use frame::Frame;
pub use ports::{FrameSink, SinkError};
pub use session::{Session, SessionConfig, SessionOutcome};
pub use settings::{
    DEFAULT_HEARTBEAT_INTERVAL_SECS, DEFAULT_MAX_LINE_BYTES, DEFAULT_MAX_READ_BYTES,
    DEFAULT_POLL_INTERVAL_MS, SettingsError, TailSettings, validate_settings,
};
pub use tail::{FileTailer, TailConfig, TailError};
