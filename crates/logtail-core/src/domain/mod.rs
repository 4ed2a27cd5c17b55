//! Domain types shared by the tailer, the session and the adapters.
//!
//! These are pure data types with no I/O of their own.

mod events;
mod session_id;
mod source;

pub use events::{HeartbeatTick, TailEvent};
pub use session_id::SessionId;
pub use source::LogSource;
