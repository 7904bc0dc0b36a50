//! Switch gate and mode transitions

use super::core::ModeManager;
use super::types::SwitchOutcome;
use crate::analyzer::ConversationAnalysis;
use crate::events::ModeEvent;
use crate::modes::profile::transition_threshold;
use crate::modes::types::{Mode, ModeState, ModeTransition, TransitionTrigger};
use crate::snapshots::SnapshotInput;
use crate::time::to_chrono;
use crate::types::Message;

impl ModeManager {
    /// Switch to `to`
    ///
    /// Non-explicit triggers are refused while the focus lock holds another
    /// mode (emitting `mode-switch-blocked`). Switching to the current mode is
    /// a no-op. Otherwise the transition is recorded and `mode-changed` is
    /// published before this returns.
    pub fn switch_mode(&self, to: Mode, trigger: TransitionTrigger, confidence: f64) -> SwitchOutcome {
        let mut state = self.state.lock();
        self.switch_locked(&mut state, to, trigger, confidence)
    }

    /// Whether the automatic gate would accept `analysis`. Never mutates state.
    pub fn should_switch_mode(&self, current_mode: Mode, analysis: &ConversationAnalysis) -> bool {
        let state = self.state.lock();
        self.gate_locked(&state, current_mode, analysis)
    }

    /// Analyze `messages` and switch if the gate accepts, as one atomic step
    pub fn auto_switch(&self, messages: &[Message]) -> Option<ModeTransition> {
        let analysis = self.analyzer.analyze_conversation(messages);

        let mut state = self.state.lock();
        let current = state.current_mode;
        if !self.gate_locked(&state, current, &analysis) {
            return None;
        }
        match self.switch_locked(&mut state, analysis.mode, TransitionTrigger::Auto, analysis.confidence) {
            SwitchOutcome::Switched(transition) => Some(transition),
            _ => None,
        }
    }

    /// Explicit user override
    ///
    /// Bypasses hysteresis, cooldown, confidence and the focus lock, and turns
    /// automatic switching off. An active focus session is left in place.
    pub fn force_mode(&self, mode: Mode) -> Option<ModeTransition> {
        let mut state = self.state.lock();
        let transition = (state.current_mode != mode)
            .then(|| self.apply_locked(&mut state, mode, TransitionTrigger::Explicit, 1.0));
        self.set_auto_switch_locked(&mut state, false);
        transition
    }

    /// Switch and, if accepted, capture a snapshot of the state being left
    ///
    /// The snapshot's active skills come from this manager. It is stored in
    /// the configured snapshot store, persisted if configured to.
    pub fn switch_mode_with_snapshot(
        &self,
        to: Mode,
        trigger: TransitionTrigger,
        confidence: f64,
        input: SnapshotInput,
    ) -> SwitchOutcome {
        let (outcome, skills) = {
            let mut state = self.state.lock();
            let skills: Vec<String> = state.active_skills.iter().cloned().collect();
            (self.switch_locked(&mut state, to, trigger, confidence), skills)
        };

        if let (SwitchOutcome::Switched(transition), Some(store)) = (&outcome, &self.snapshots) {
            let snapshot = store.create_transition_snapshot(
                transition.from,
                transition.to,
                input.with_active_skills(skills),
            );
            store.store_snapshot(snapshot, self.persist_snapshots);
        }
        outcome
    }

    pub(super) fn switch_locked(
        &self,
        state: &mut ModeState,
        to: Mode,
        trigger: TransitionTrigger,
        confidence: f64,
    ) -> SwitchOutcome {
        if trigger != TransitionTrigger::Explicit {
            let decision = self.focus.should_block_mode_switch(to);
            if decision.blocked {
                let reason = decision.reason.unwrap_or_default();
                tracing::debug!("Switch to {} blocked: {}", to, reason);
                self.events.publish(ModeEvent::ModeSwitchBlocked {
                    target_mode: to,
                    reason: reason.clone(),
                });
                return SwitchOutcome::Blocked { reason };
            }
        }

        if to == state.current_mode {
            return SwitchOutcome::Unchanged;
        }

        SwitchOutcome::Switched(self.apply_locked(state, to, trigger, confidence))
    }

    fn apply_locked(
        &self,
        state: &mut ModeState,
        to: Mode,
        trigger: TransitionTrigger,
        confidence: f64,
    ) -> ModeTransition {
        let now = self.clock.now();
        let transition = ModeTransition::new(state.current_mode, to, now, trigger, confidence);

        state.record(transition.clone(), self.config.history_limit);
        state.previous_mode = Some(state.current_mode);
        state.current_mode = to;
        state.mode_entry_time = now;
        state.last_switch_time = Some(now);

        tracing::info!(
            "Mode switched: {} -> {} ({}, confidence {:.2})",
            transition.from,
            transition.to,
            trigger,
            transition.confidence
        );
        self.events.publish(ModeEvent::ModeChanged {
            transition: transition.clone(),
        });
        transition
    }

    fn gate_locked(&self, state: &ModeState, current_mode: Mode, analysis: &ConversationAnalysis) -> bool {
        if !state.auto_switch_enabled {
            return false;
        }
        if analysis.mode == current_mode {
            return false;
        }

        let now = self.clock.now();
        if now - state.mode_entry_time < to_chrono(self.config.hysteresis) {
            tracing::debug!("Switch to {} rejected: hysteresis", analysis.mode);
            return false;
        }
        if let Some(last) = state.last_switch_time {
            if now - last < to_chrono(self.config.cooldown) {
                tracing::debug!("Switch to {} rejected: cooldown", analysis.mode);
                return false;
            }
        }

        let threshold = transition_threshold(current_mode, analysis.mode, self.config.default_threshold);
        if analysis.confidence < threshold {
            tracing::debug!(
                "Switch to {} rejected: confidence {:.2} below {:.2}",
                analysis.mode,
                analysis.confidence,
                threshold
            );
            return false;
        }

        if self.focus.should_block_mode_switch(analysis.mode).blocked {
            tracing::debug!("Switch to {} rejected: focus lock", analysis.mode);
            return false;
        }

        true
    }
}
