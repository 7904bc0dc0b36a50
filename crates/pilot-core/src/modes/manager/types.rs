//! Mode manager result and persistence types

use serde::{Deserialize, Serialize};

use crate::modes::types::{ModeTransition, SerializableTransition};

/// Result of a switch request
#[derive(Debug, Clone, PartialEq)]
pub enum SwitchOutcome {
    /// The mode changed
    Switched(ModeTransition),
    /// Target is already the current mode; nothing recorded
    Unchanged,
    /// Refused by the focus lock
    Blocked { reason: String },
}

impl SwitchOutcome {
    pub fn is_switched(&self) -> bool {
        matches!(self, Self::Switched(_))
    }

    /// The recorded transition, if any
    pub fn transition(&self) -> Option<&ModeTransition> {
        match self {
            Self::Switched(t) => Some(t),
            _ => None,
        }
    }
}

/// Everything the persistence layer needs to resume a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeSessionState {
    pub history: Vec<SerializableTransition>,
    pub auto_switch_enabled: bool,
    #[serde(default)]
    pub active_skills: Vec<String>,
}
