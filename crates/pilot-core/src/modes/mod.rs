//! Operational modes
//!
//! The [`Mode`] enum, its static behavior table, and the [`ModeManager`] that
//! owns the live mode of a session.

mod manager;
mod profile;
mod types;

pub use manager::{
    ModeManager, ModeManagerBuilder, ModeSessionState, PromptRequest, SwitchOutcome, WorkspaceInfo,
};
pub use profile::{ModeProfile, STEP_BACK_THRESHOLD, ToolAccess, pattern_matches, transition_threshold};
pub use types::{Mode, ModeState, ModeTransition, SerializableTransition, TransitionTrigger};
