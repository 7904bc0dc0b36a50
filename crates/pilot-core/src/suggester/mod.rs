//! Mode transition suggester
//!
//! A rule-based advisor that proposes at most one mode change for the user to
//! accept. It never switches modes itself and never fails: no matching rule
//! simply means no suggestion.

mod context;
mod preferences;
mod rules;


use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::modes::Mode;
use crate::time::SharedClock;
use crate::types::Message;

pub use context::{ConversationContext, build_context};
pub use preferences::{ModePair, SuggestionPreferences};
pub use rules::{PLANNING_DWELL, Suggestion};

/// Rule-based suggestion engine with user preferences
pub struct ModeTransitionSuggester {
    preferences: RwLock<SuggestionPreferences>,
    clock: SharedClock,
}

impl ModeTransitionSuggester {
    pub fn new(clock: SharedClock, preferences: SuggestionPreferences) -> Self {
        Self {
            preferences: RwLock::new(preferences),
            clock,
        }
    }

    /// Derive signals from the conversation, measuring time in mode against the clock
    pub fn build_context(
        &self,
        messages: &[Message],
        current_mode: Mode,
        mode_entry_time: DateTime<Utc>,
    ) -> ConversationContext {
        build_context(messages, current_mode, mode_entry_time, self.clock.now())
    }

    /// First rule that matches and is not suppressed by preferences
    pub fn suggest_transition(&self, context: &ConversationContext) -> Option<Suggestion> {
        let preferences = self.preferences.read();
        for rule in rules::RULES {
            if !(rule.matches)(context) {
                continue;
            }
            if preferences.permits(context.current_mode, rule.mode, rule.confidence) {
                return Some(rule.suggestion());
            }
            tracing::debug!(
                "Suggestion {} -> {} suppressed by preferences",
                context.current_mode,
                rule.mode
            );
        }
        None
    }

    /// [`Self::build_context`] followed by [`Self::suggest_transition`]
    pub fn suggest_for(
        &self,
        messages: &[Message],
        current_mode: Mode,
        mode_entry_time: DateTime<Utc>,
    ) -> Option<Suggestion> {
        let context = self.build_context(messages, current_mode, mode_entry_time);
        self.suggest_transition(&context)
    }

    pub fn preferences(&self) -> SuggestionPreferences {
        self.preferences.read().clone()
    }

    pub fn set_preferences(&self, preferences: SuggestionPreferences) {
        *self.preferences.write() = preferences;
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.preferences.write().enabled = enabled;
    }

    /// Set the minimum confidence, clamped to [0, 1]
    pub fn set_min_confidence(&self, min_confidence: f64) {
        self.preferences.write().min_confidence = min_confidence.clamp(0.0, 1.0);
    }

    pub fn disable_mode(&self, mode: Mode) {
        self.preferences.write().disabled_modes.insert(mode);
    }

    pub fn enable_mode(&self, mode: Mode) {
        self.preferences.write().disabled_modes.remove(&mode);
    }

    pub fn disable_transition(&self, from: Mode, to: Mode) {
        self.preferences
            .write()
            .disabled_transitions
            .insert(ModePair::new(from, to));
    }

    pub fn enable_transition(&self, from: Mode, to: Mode) {
        self.preferences
            .write()
            .disabled_transitions
            .remove(&ModePair::new(from, to));
    }

    pub fn reset_preferences(&self) {
        *self.preferences.write() = SuggestionPreferences::default();
    }
}

impl std::fmt::Debug for ModeTransitionSuggester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeTransitionSuggester")
            .field("preferences", &*self.preferences.read())
            .finish()
    }
}
