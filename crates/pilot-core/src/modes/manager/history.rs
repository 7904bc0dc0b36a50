//! Transition history and session persistence

use super::core::ModeManager;
use super::types::ModeSessionState;
use crate::error::{PilotError, PilotResult};
use crate::modes::types::{ModeState, ModeTransition, SerializableTransition};

impl ModeManager {
    /// Full history, oldest first
    pub fn get_mode_history(&self) -> Vec<ModeTransition> {
        self.state.lock().history.iter().cloned().collect()
    }

    /// The last `n` transitions, oldest first
    pub fn get_recent_history(&self, n: usize) -> Vec<ModeTransition> {
        let state = self.state.lock();
        let skip = state.history.len().saturating_sub(n);
        state.history.iter().skip(skip).cloned().collect()
    }

    /// History with text timestamps, for persistence
    pub fn get_serializable_mode_history(&self) -> Vec<SerializableTransition> {
        self.state
            .lock()
            .history
            .iter()
            .map(ModeTransition::to_serializable)
            .collect()
    }

    /// Replace the history and re-derive the current and previous mode from its last entry
    ///
    /// An empty list resets to the initial `assistant` state. A malformed
    /// timestamp fails the whole restore and leaves the state untouched.
    /// No events are published.
    pub fn restore_mode_history(&self, history: &[SerializableTransition]) -> PilotResult<()> {
        let parsed = history
            .iter()
            .map(ModeTransition::try_from)
            .collect::<PilotResult<Vec<_>>>()
            .map_err(|e| {
                PilotError::invalid_input_field(
                    format!("Invalid transition in history: {}", e),
                    "history",
                )
            })?;

        let now = self.clock.now();
        let mut state = self.state.lock();
        let auto_switch_enabled = state.auto_switch_enabled;
        let active_skills = std::mem::take(&mut state.active_skills);

        *state = ModeState::new(now, auto_switch_enabled);
        state.active_skills = active_skills;

        let skip = parsed.len().saturating_sub(self.config.history_limit);
        for transition in parsed.into_iter().skip(skip) {
            state.record(transition, self.config.history_limit);
        }

        if let Some(last) = state.history.back().cloned() {
            state.current_mode = last.to;
            state.previous_mode = Some(last.from);
            state.mode_entry_time = last.timestamp;
            state.last_switch_time = Some(last.timestamp);
        }

        tracing::debug!(
            "Restored {} transitions, current mode {}",
            state.history.len(),
            state.current_mode
        );
        Ok(())
    }

    /// Bundle everything needed to resume this session
    pub fn export_session_state(&self) -> ModeSessionState {
        let state = self.state.lock();
        ModeSessionState {
            history: state.history.iter().map(ModeTransition::to_serializable).collect(),
            auto_switch_enabled: state.auto_switch_enabled,
            active_skills: state.active_skills.iter().cloned().collect(),
        }
    }

    /// Resume from [`Self::export_session_state`] output, without publishing events
    pub fn restore_session_state(&self, session: &ModeSessionState) -> PilotResult<()> {
        self.restore_mode_history(&session.history)?;

        let mut state = self.state.lock();
        state.auto_switch_enabled = session.auto_switch_enabled;
        state.active_skills = session.active_skills.iter().cloned().collect();
        Ok(())
    }
}
