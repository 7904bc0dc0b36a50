//! User preferences for mode suggestions

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::modes::Mode;

/// An ordered `(from, to)` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModePair {
    pub from: Mode,
    pub to: Mode,
}

impl ModePair {
    pub fn new(from: Mode, to: Mode) -> Self {
        Self { from, to }
    }
}

/// Which suggestions the user wants to see
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionPreferences {
    /// Master switch
    pub enabled: bool,
    /// Suggestions below this confidence are suppressed
    pub min_confidence: f64,
    /// Never suggest these modes
    pub disabled_modes: BTreeSet<Mode>,
    /// Never suggest these transitions
    pub disabled_transitions: BTreeSet<ModePair>,
}

impl Default for SuggestionPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            min_confidence: 0.70,
            disabled_modes: BTreeSet::new(),
            disabled_transitions: BTreeSet::new(),
        }
    }
}

impl SuggestionPreferences {
    /// Whether a candidate `(from → to, confidence)` may be shown
    pub fn permits(&self, from: Mode, to: Mode, confidence: f64) -> bool {
        self.enabled
            && !self.disabled_modes.contains(&to)
            && !self.disabled_transitions.contains(&ModePair::new(from, to))
            && confidence >= self.min_confidence
    }
}
