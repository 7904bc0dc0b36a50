//! Core mode manager implementation

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::builder::ModeManagerBuilder;
use crate::analyzer::ContextAnalyzer;
use crate::config::SwitchingConfig;
use crate::events::{ModeEvent, SharedEventBus};
use crate::focus::FocusModeManager;
use crate::modes::types::{Mode, ModeState};
use crate::prompts::SharedPromptSource;
use crate::snapshots::TransitionSnapshotStore;
use crate::time::{SharedClock, to_std};

/// Mode manager for one conversation session
pub struct ModeManager {
    /// Live state; the only place `current_mode` changes
    pub(super) state: Mutex<ModeState>,
    pub(super) focus: FocusModeManager,
    pub(super) analyzer: ContextAnalyzer,
    pub(super) snapshots: Option<Arc<TransitionSnapshotStore>>,
    pub(super) prompts: SharedPromptSource,
    pub(super) events: SharedEventBus,
    pub(super) clock: SharedClock,
    pub(super) config: SwitchingConfig,
    /// Mirror snapshots captured on switch to storage
    pub(super) persist_snapshots: bool,
    pub(super) shut_down: AtomicBool,
}

impl ModeManager {
    /// Create a manager with default configuration, the system clock and tokio timers
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ModeManagerBuilder {
        ModeManagerBuilder::new()
    }

    pub fn get_current_mode(&self) -> Mode {
        self.state.lock().current_mode
    }

    pub fn get_previous_mode(&self) -> Option<Mode> {
        self.state.lock().previous_mode
    }

    /// Copy of the full state
    pub fn current_state(&self) -> ModeState {
        self.state.lock().clone()
    }

    pub fn time_in_current_mode(&self) -> Duration {
        to_std(self.state.lock().duration(self.clock.now()))
    }

    /// The focus lock owned by this manager
    pub fn focus(&self) -> &FocusModeManager {
        &self.focus
    }

    pub fn analyzer(&self) -> &ContextAnalyzer {
        &self.analyzer
    }

    pub fn snapshots(&self) -> Option<&Arc<TransitionSnapshotStore>> {
        self.snapshots.as_ref()
    }

    pub fn events(&self) -> &SharedEventBus {
        &self.events
    }

    pub fn is_auto_switch_enabled(&self) -> bool {
        self.state.lock().auto_switch_enabled
    }

    /// Enable or disable automatic switching; emits `auto-switch-changed` only on change
    pub fn set_auto_switch(&self, enabled: bool) {
        let mut state = self.state.lock();
        self.set_auto_switch_locked(&mut state, enabled);
    }

    pub(super) fn set_auto_switch_locked(&self, state: &mut ModeState, enabled: bool) {
        if state.auto_switch_enabled == enabled {
            return;
        }
        state.auto_switch_enabled = enabled;
        tracing::info!(
            "Auto-switch {}",
            if enabled { "enabled" } else { "disabled" }
        );
        self.events
            .publish(ModeEvent::AutoSwitchChanged { enabled });
    }

    /// Mark a skill active; returns false if it already was
    pub fn activate_skill(&self, skill_id: impl Into<String>) -> bool {
        let skill_id = skill_id.into();
        tracing::debug!("Activating skill {}", skill_id);
        self.state.lock().active_skills.insert(skill_id)
    }

    /// Mark a skill inactive; returns false if it was not active
    pub fn deactivate_skill(&self, skill_id: &str) -> bool {
        self.state.lock().active_skills.remove(skill_id)
    }

    /// Active skill ids, sorted
    pub fn active_skills(&self) -> Vec<String> {
        self.state.lock().active_skills.iter().cloned().collect()
    }

    /// Tear down: ends any focus session (reason `error`) and cancels its timers. Idempotent.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::SeqCst) {
            return;
        }
        tracing::debug!("Shutting down mode manager");
        self.focus.shutdown();
    }
}

impl Default for ModeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ModeManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ModeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ModeManager")
            .field("current_mode", &state.current_mode)
            .field("previous_mode", &state.previous_mode)
            .field("auto_switch_enabled", &state.auto_switch_enabled)
            .field("history_len", &state.history.len())
            .finish()
    }
}
