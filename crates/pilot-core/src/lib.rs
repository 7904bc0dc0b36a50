//! Pilot Mode Core
//!
//! Adaptive operational modes for a local-LLM assistant: conversation
//! classification, a gated mode manager with tool filtering and prompt
//! assembly, a rule-based transition suggester, a timed focus lock, and a
//! transition snapshot store.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod events;
pub mod focus;
pub mod modes;
pub mod prompts;
pub mod snapshots;
pub mod suggester;
pub mod time;
pub mod types;

// Re-export commonly used types
pub use analyzer::{ContextAnalyzer, ConversationAnalysis, ModeSuggestion};
pub use config::{ConfigLoader, PilotConfig};
pub use error::{PilotError, PilotResult};
pub use events::{EventBus, ModeEvent, SharedEventBus};
pub use focus::{FocusEndReason, FocusModeManager, FocusSession};
pub use modes::{
    Mode, ModeManager, ModeManagerBuilder, ModeTransition, PromptRequest, SwitchOutcome,
    TransitionTrigger,
};
pub use prompts::{PromptRegistry, PromptSource};
pub use snapshots::{TransitionSnapshot, TransitionSnapshotStore};
pub use suggester::{ModeTransitionSuggester, Suggestion, SuggestionPreferences};
pub use types::*;
