//! Focus mode: a timed lock on the current mode

mod manager;
mod session;

#[cfg(test)]
mod tests;

pub use manager::FocusModeManager;
pub use session::{
    BlockDecision, FocusEndReason, FocusSession, FocusSessionStats, format_remaining,
};
