//! Error types for the Pilot mode core
//!
//! Every fallible operation in this crate returns [`PilotResult`]. Only a
//! handful of paths can actually fail:
//! - invalid arguments (focus durations, malformed restored history)
//! - configuration loading and validation
//! - snapshot storage I/O, which the snapshot store logs and swallows

mod constructors;
mod conversions;
mod types;

pub use types::{PilotError, PilotResult, ResultExt};
