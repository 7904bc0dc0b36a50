//! Mode manager builder

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use super::core::ModeManager;
use crate::analyzer::ContextAnalyzer;
use crate::config::PilotConfig;
use crate::events::{EventBus, SharedEventBus};
use crate::focus::FocusModeManager;
use crate::modes::types::ModeState;
use crate::prompts::{PromptRegistry, SharedPromptSource};
use crate::snapshots::TransitionSnapshotStore;
use crate::time::{SharedClock, SharedScheduler, SystemClock, TokioScheduler};

/// Wires a [`ModeManager`] to its collaborators
///
/// Anything not supplied falls back to a production default: the system
/// clock, tokio timers, a fresh event bus and the builtin prompt registry.
/// Without a snapshot store, switches are not snapshotted.
#[derive(Default)]
pub struct ModeManagerBuilder {
    config: PilotConfig,
    clock: Option<SharedClock>,
    scheduler: Option<SharedScheduler>,
    events: Option<SharedEventBus>,
    prompts: Option<SharedPromptSource>,
    snapshots: Option<Arc<TransitionSnapshotStore>>,
}

impl ModeManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: PilotConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_scheduler(mut self, scheduler: SharedScheduler) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn with_event_bus(mut self, events: SharedEventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_prompt_source(mut self, prompts: SharedPromptSource) -> Self {
        self.prompts = Some(prompts);
        self
    }

    pub fn with_snapshot_store(mut self, store: Arc<TransitionSnapshotStore>) -> Self {
        self.snapshots = Some(store);
        self
    }

    pub fn build(self) -> ModeManager {
        let clock = self.clock.unwrap_or_else(SystemClock::shared);
        let scheduler = self.scheduler.unwrap_or_else(TokioScheduler::shared);
        let events = self
            .events
            .unwrap_or_else(|| Arc::new(EventBus::default()));
        let prompts = self
            .prompts
            .unwrap_or_else(|| PromptRegistry::with_builtins().shared());

        let focus = FocusModeManager::new(
            clock.clone(),
            scheduler,
            events.clone(),
            self.config.focus.clone(),
        );
        let state = ModeState::new(clock.now(), self.config.switching.auto_switch_enabled);

        ModeManager {
            state: Mutex::new(state),
            focus,
            analyzer: ContextAnalyzer::new(),
            snapshots: self.snapshots,
            prompts,
            events,
            clock,
            config: self.config.switching,
            persist_snapshots: self.config.snapshots.persist,
            shut_down: AtomicBool::new(false),
        }
    }
}
