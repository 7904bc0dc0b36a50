//! Mode manager
//!
//! The single owner of the live [`ModeState`](crate::modes::ModeState). All
//! mutating operations take one lock, so every check-then-act sequence (gate
//! then switch, focus check then switch) is atomic with respect to other
//! callers, and events are published before the call returns.

mod builder;
mod core;
mod history;
mod prompt;
mod switching;
mod tools;
mod types;

#[cfg(test)]
mod tests;

pub use builder::ModeManagerBuilder;
pub use self::core::ModeManager;
pub use prompt::{PromptRequest, WorkspaceInfo};
pub use types::{ModeSessionState, SwitchOutcome};
