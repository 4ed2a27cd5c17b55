//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core expects from infrastructure.
//! They contain no transport details and use only domain types.

pub mod frame_sink;

pub use frame_sink::{FrameSink, SinkError};
