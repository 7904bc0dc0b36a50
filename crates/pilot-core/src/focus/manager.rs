//! Focus mode manager
//!
//! Holds at most one [`FocusSession`]. While a session is active, automatic
//! and manual switches to any other mode are refused. Expiry and the countdown
//! run on the injected [`Scheduler`]; both timers are cancelled whenever the
//! session ends, and callbacks check a generation counter so a timer that was
//! already in flight cannot touch a newer session. Every query also compares
//! the clock against the session's end time, so the lock stays time-boxed
//! when the expiry timer fires late or never.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;

use super::session::{
    BlockDecision, FocusEndReason, FocusSession, FocusSessionStats, format_remaining,
};
use crate::config::FocusConfig;
use crate::error::{PilotError, PilotResult};
use crate::events::{ModeEvent, SharedEventBus};
use crate::modes::Mode;
use crate::time::{SharedClock, SharedScheduler, TimerHandle};

#[derive(Default)]
struct FocusState {
    session: Option<FocusSession>,
    expiry: Option<TimerHandle>,
    ticker: Option<TimerHandle>,
    /// Bumped every time a session starts, ends or is rescheduled
    generation: u64,
}

impl FocusState {
    fn cancel_timers(&mut self) {
        if let Some(timer) = self.expiry.take() {
            timer.cancel();
        }
        if let Some(timer) = self.ticker.take() {
            timer.cancel();
        }
    }
}

struct FocusInner {
    state: Mutex<FocusState>,
    clock: SharedClock,
    scheduler: SharedScheduler,
    events: SharedEventBus,
    config: FocusConfig,
}

/// Single-session timed mode lock
#[derive(Clone)]
pub struct FocusModeManager {
    inner: Arc<FocusInner>,
}

impl FocusModeManager {
    /// Create a manager with no active session
    pub fn new(
        clock: SharedClock,
        scheduler: SharedScheduler,
        events: SharedEventBus,
        config: FocusConfig,
    ) -> Self {
        Self {
            inner: Arc::new(FocusInner {
                state: Mutex::new(FocusState::default()),
                clock,
                scheduler,
                events,
                config,
            }),
        }
    }

    /// Lock `mode` for `duration_minutes`, replacing any active session
    pub fn enable_focus_mode(&self, mode: Mode, duration_minutes: u32) -> PilotResult<FocusSession> {
        let max = self.inner.config.max_duration_minutes;
        if !(1..=max).contains(&duration_minutes) {
            return Err(PilotError::invalid_input_field(
                format!("Focus duration must be between 1 and {} minutes", max),
                "duration_minutes",
            ));
        }

        let mut state = self.inner.state.lock();
        self.inner.expire_if_due(&mut state);
        if state.session.is_some() {
            self.inner.end_locked(&mut state, FocusEndReason::Manual);
        }

        let session = FocusSession::new(mode, self.inner.clock.now(), duration_minutes);
        state.generation += 1;
        state.session = Some(session.clone());

        // Expiry first so a tick due at the same instant sees the session gone
        let delay = session.remaining(self.inner.clock.now());
        state.expiry = Some(self.schedule_expiry(delay, state.generation));
        state.ticker = Some(self.schedule_ticker(state.generation));

        tracing::info!(
            "Focus mode enabled: {} for {} minutes",
            mode,
            duration_minutes
        );
        self.inner.events.publish(ModeEvent::FocusStarted {
            session: session.clone(),
        });

        Ok(session)
    }

    /// End the active session; returns the ended session, or None if nothing was active
    pub fn disable_focus_mode(&self, reason: FocusEndReason) -> Option<FocusSession> {
        let mut state = self.inner.state.lock();
        self.inner.end_locked(&mut state, reason)
    }

    /// Whether a switch to `target` is blocked by the lock
    pub fn should_block_mode_switch(&self, target: Mode) -> BlockDecision {
        let mut state = self.inner.state.lock();
        self.inner.expire_if_due(&mut state);
        match &state.session {
            Some(session) if session.active && session.mode != target => {
                let remaining = session.remaining(self.inner.clock.now());
                BlockDecision::blocked(format!(
                    "Focus mode is locked to {} ({} remaining)",
                    session.mode,
                    format_remaining(remaining)
                ))
            }
            _ => BlockDecision::allowed(),
        }
    }

    /// Add `minutes` to the active session
    pub fn extend_focus_session(&self, minutes: u32) -> PilotResult<FocusSession> {
        let max = self.inner.config.max_extension_minutes;
        let mut state = self.inner.state.lock();
        self.inner.expire_if_due(&mut state);

        let Some(session) = state.session.as_mut() else {
            return Err(PilotError::invalid_input("No active focus session to extend"));
        };
        if !(1..=max).contains(&minutes) {
            return Err(PilotError::invalid_input_field(
                format!("Focus extension must be between 1 and {} minutes", max),
                "minutes",
            ));
        }

        session.end_time += chrono::Duration::minutes(i64::from(minutes));
        session.duration_minutes += minutes;
        let session = session.clone();

        state.cancel_timers();
        state.generation += 1;
        let delay = session.remaining(self.inner.clock.now());
        state.expiry = Some(self.schedule_expiry(delay, state.generation));
        state.ticker = Some(self.schedule_ticker(state.generation));

        tracing::info!(
            "Focus session extended by {} minutes (now {} total)",
            minutes,
            session.duration_minutes
        );
        self.inner.events.publish(ModeEvent::FocusExtended {
            session: session.clone(),
            added_minutes: minutes,
        });

        Ok(session)
    }

    /// Time left in the active session, zero when inactive
    pub fn get_remaining_time(&self) -> Duration {
        let mut state = self.inner.state.lock();
        self.inner.expire_if_due(&mut state);
        state
            .session
            .as_ref()
            .map(|s| s.remaining(self.inner.clock.now()))
            .unwrap_or(Duration::ZERO)
    }

    /// Remaining time as `m:ss`
    pub fn get_remaining_time_formatted(&self) -> String {
        format_remaining(self.get_remaining_time())
    }

    pub fn get_session_stats(&self) -> FocusSessionStats {
        let mut state = self.inner.state.lock();
        self.inner.expire_if_due(&mut state);
        let Some(session) = &state.session else {
            return FocusSessionStats::inactive();
        };

        let now = self.inner.clock.now();
        let elapsed = session.elapsed(now).as_secs_f64() / 60.0;
        let remaining = session.remaining(now).as_secs_f64() / 60.0;
        let total = session.duration_minutes;
        let percent = if total == 0 {
            0.0
        } else {
            (elapsed / f64::from(total) * 100.0).clamp(0.0, 100.0)
        };

        FocusSessionStats {
            is_active: session.active,
            mode: Some(session.mode),
            elapsed_minutes: elapsed,
            remaining_minutes: remaining,
            total_minutes: total,
            percent_complete: percent,
        }
    }

    pub fn is_active(&self) -> bool {
        let mut state = self.inner.state.lock();
        self.inner.expire_if_due(&mut state);
        state.session.is_some()
    }

    /// Copy of the active session
    pub fn current_session(&self) -> Option<FocusSession> {
        let mut state = self.inner.state.lock();
        self.inner.expire_if_due(&mut state);
        state.session.clone()
    }

    /// End any session with reason `error` and cancel all timers. Idempotent.
    pub fn shutdown(&self) {
        let mut state = self.inner.state.lock();
        self.inner.end_locked(&mut state, FocusEndReason::Error);
    }

    fn schedule_expiry(&self, delay: Duration, generation: u64) -> TimerHandle {
        let weak = Arc::downgrade(&self.inner);
        self.inner.scheduler.after(
            delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_expiry(generation);
                }
            }),
        )
    }

    fn schedule_ticker(&self, generation: u64) -> TimerHandle {
        let weak: Weak<FocusInner> = Arc::downgrade(&self.inner);
        self.inner.scheduler.every(
            self.inner.config.tick_interval,
            Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_tick(generation);
                }
            }),
        )
    }
}

impl FocusInner {
    fn end_locked(&self, state: &mut FocusState, reason: FocusEndReason) -> Option<FocusSession> {
        state.cancel_timers();
        let mut session = state.session.take()?;
        state.generation += 1;
        session.active = false;

        tracing::info!("Focus mode on {} ended ({})", session.mode, reason);
        self.events.publish(ModeEvent::FocusEnded {
            reason,
            session: session.clone(),
        });
        Some(session)
    }

    /// End the session with `timeout` if its end time has passed
    fn expire_if_due(&self, state: &mut FocusState) {
        let due = state
            .session
            .as_ref()
            .is_some_and(|s| self.clock.now() >= s.end_time);
        if due {
            tracing::debug!("Focus session past its end time, expiring");
            self.end_locked(state, FocusEndReason::Timeout);
        }
    }

    fn on_expiry(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.generation != generation {
            return;
        }
        self.end_locked(&mut state, FocusEndReason::Timeout);
    }

    fn on_tick(&self, generation: u64) {
        let mut state = self.state.lock();
        if state.generation != generation {
            return;
        }
        self.expire_if_due(&mut state);
        let Some(session) = &state.session else {
            return;
        };

        let remaining = session.remaining(self.clock.now());
        self.events.publish(ModeEvent::CountdownUpdate {
            remaining_ms: u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
            formatted: format_remaining(remaining),
        });
    }
}

impl std::fmt::Debug for FocusModeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusModeManager")
            .field("session", &self.current_session())
            .finish()
    }
}
