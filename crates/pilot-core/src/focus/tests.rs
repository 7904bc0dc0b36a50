use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::config::FocusConfig;
use crate::error::PilotError;
use crate::events::{EventBus, EventFilter, FilteredSubscriber, ModeEvent};
use crate::modes::Mode;
use crate::time::{Clock, ManualClock, OnceTask, RepeatingTask, Scheduler, TimerHandle};

fn setup() -> (Arc<ManualClock>, Arc<EventBus>, FocusModeManager) {
    let clock = ManualClock::new();
    let bus = Arc::new(EventBus::new(8192));
    let focus = FocusModeManager::new(
        clock.clone(),
        clock.clone(),
        bus.clone(),
        FocusConfig::default(),
    );
    (clock, bus, focus)
}

fn lifecycle_events(bus: &EventBus) -> FilteredSubscriber {
    FilteredSubscriber::new(
        bus,
        EventFilter::new().only_types(vec!["focus-started", "focus-ended", "focus-extended"]),
    )
}

fn minutes(n: u64) -> Duration {
    Duration::from_secs(n * 60)
}

#[test]
fn test_duration_bounds() {
    let (_clock, _bus, focus) = setup();

    for bad in [0, 241] {
        let err = focus.enable_focus_mode(Mode::Developer, bad).unwrap_err();
        assert!(matches!(err, PilotError::InvalidInput { .. }));
    }
    assert!(!focus.is_active());

    assert!(focus.enable_focus_mode(Mode::Developer, 1).is_ok());
    assert!(focus.enable_focus_mode(Mode::Developer, 240).is_ok());
}

#[test]
fn test_enable_emits_started_and_blocks_other_modes() {
    let (clock, bus, focus) = setup();
    let mut events = lifecycle_events(&bus);

    let session = focus.enable_focus_mode(Mode::Developer, 30).unwrap();
    assert_eq!(session.start_time, clock.now());
    assert_eq!(session.end_time - session.start_time, chrono::Duration::minutes(30));
    assert!(session.active);

    assert_eq!(
        events.drain(),
        vec![ModeEvent::FocusStarted {
            session: session.clone()
        }]
    );

    let same = focus.should_block_mode_switch(Mode::Developer);
    assert!(!same.blocked);

    let other = focus.should_block_mode_switch(Mode::Planning);
    assert!(other.blocked);
    let reason = other.reason.unwrap();
    assert!(reason.contains("developer"));
    assert!(reason.contains("30:00"));
}

#[test]
fn test_unblocked_without_session() {
    let (_clock, _bus, focus) = setup();
    let decision = focus.should_block_mode_switch(Mode::Security);
    assert!(!decision.blocked);
    assert!(decision.reason.is_none());
    assert_eq!(focus.get_remaining_time_formatted(), "0:00");
}

#[test]
fn test_timeout_ends_session() {
    let (clock, bus, focus) = setup();
    let mut events = lifecycle_events(&bus);
    focus.enable_focus_mode(Mode::Debugger, 30).unwrap();
    events.drain();

    clock.advance(minutes(29));
    assert!(focus.is_active());

    clock.advance(minutes(1));
    assert!(!focus.is_active());
    assert_eq!(clock.pending_timers(), 0);

    let ended = events.drain();
    assert_eq!(ended.len(), 1);
    match &ended[0] {
        ModeEvent::FocusEnded { reason, session } => {
            assert_eq!(*reason, FocusEndReason::Timeout);
            assert_eq!(session.mode, Mode::Debugger);
            assert!(!session.active);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[test]
fn test_countdown_ticks_every_second() {
    let (clock, bus, focus) = setup();
    let mut ticks = FilteredSubscriber::new(&bus, EventFilter::new().only_types(vec!["countdown-update"]));
    focus.enable_focus_mode(Mode::Developer, 30).unwrap();

    clock.advance(Duration::from_secs(3));

    let events = ticks.drain();
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[2],
        ModeEvent::CountdownUpdate {
            remaining_ms: (30 * 60 - 3) * 1000,
            formatted: "29:57".into(),
        }
    );
}

#[test]
fn test_disable_cancels_timers() {
    let (clock, bus, focus) = setup();
    let mut events = lifecycle_events(&bus);
    focus.enable_focus_mode(Mode::Developer, 5).unwrap();
    assert_eq!(clock.pending_timers(), 2);

    let ended = focus.disable_focus_mode(FocusEndReason::Manual).unwrap();
    assert_eq!(ended.mode, Mode::Developer);
    assert_eq!(clock.pending_timers(), 0);

    clock.advance(minutes(10));
    let kinds: Vec<_> = events.drain().iter().map(|e| e.event_type()).collect();
    assert_eq!(kinds, vec!["focus-started", "focus-ended"]);

    // Nothing active: no-op, no event
    assert!(focus.disable_focus_mode(FocusEndReason::Manual).is_none());
    assert!(events.drain().is_empty());
}

#[test]
fn test_replacing_session_ends_previous_manually() {
    let (clock, bus, focus) = setup();
    let mut events = lifecycle_events(&bus);
    focus.enable_focus_mode(Mode::Developer, 30).unwrap();
    focus.enable_focus_mode(Mode::Security, 10).unwrap();

    let drained = events.drain();
    assert_eq!(drained.len(), 3);
    assert!(matches!(
        &drained[1],
        ModeEvent::FocusEnded { reason: FocusEndReason::Manual, session } if session.mode == Mode::Developer
    ));
    assert_eq!(clock.pending_timers(), 2);

    // The first session's expiry must not fire
    clock.advance(minutes(10));
    assert!(!focus.is_active());
    let drained = events.drain();
    assert_eq!(drained.len(), 1);
    assert!(matches!(
        &drained[0],
        ModeEvent::FocusEnded { reason: FocusEndReason::Timeout, session } if session.mode == Mode::Security
    ));
}

#[test]
fn test_extend_session() {
    let (clock, bus, focus) = setup();
    let mut events = lifecycle_events(&bus);

    let err = focus.extend_focus_session(10).unwrap_err();
    assert!(matches!(err, PilotError::InvalidInput { .. }));

    let original = focus.enable_focus_mode(Mode::Reviewer, 30).unwrap();
    for bad in [0, 121] {
        assert!(focus.extend_focus_session(bad).is_err());
    }
    assert_eq!(focus.current_session().unwrap(), original);

    let extended = focus.extend_focus_session(10).unwrap();
    assert_eq!(extended.duration_minutes, 40);
    assert_eq!(extended.end_time, original.end_time + chrono::Duration::minutes(10));

    let kinds: Vec<_> = events.drain().iter().map(|e| e.event_type()).collect();
    assert_eq!(kinds, vec!["focus-started", "focus-extended"]);

    clock.advance(minutes(30));
    assert!(focus.is_active());
    clock.advance(minutes(10));
    assert!(!focus.is_active());
}

#[test]
fn test_session_stats() {
    let (clock, _bus, focus) = setup();
    assert!(!focus.get_session_stats().is_active);

    focus.enable_focus_mode(Mode::Planning, 20).unwrap();
    clock.advance(minutes(5));

    let stats = focus.get_session_stats();
    assert!(stats.is_active);
    assert_eq!(stats.mode, Some(Mode::Planning));
    assert_eq!(stats.total_minutes, 20);
    assert!((stats.elapsed_minutes - 5.0).abs() < 1e-9);
    assert!((stats.remaining_minutes - 15.0).abs() < 1e-9);
    assert!((stats.percent_complete - 25.0).abs() < 1e-9);
    assert_eq!(focus.get_remaining_time(), minutes(15));
    assert_eq!(focus.get_remaining_time_formatted(), "15:00");
}

#[test]
fn test_shutdown_is_idempotent() {
    let (clock, bus, focus) = setup();
    let mut events = lifecycle_events(&bus);
    focus.enable_focus_mode(Mode::Developer, 30).unwrap();

    focus.shutdown();
    focus.shutdown();

    assert_eq!(clock.pending_timers(), 0);
    let drained = events.drain();
    assert_eq!(drained.len(), 2);
    assert!(matches!(
        drained[1],
        ModeEvent::FocusEnded {
            reason: FocusEndReason::Error,
            ..
        }
    ));
}

/// Scheduler whose timers never run
struct NeverFires;

impl Scheduler for NeverFires {
    fn after(&self, _delay: Duration, _task: OnceTask) -> TimerHandle {
        TimerHandle::cancelled()
    }

    fn every(&self, _interval: Duration, _task: RepeatingTask) -> TimerHandle {
        TimerHandle::cancelled()
    }
}

#[test]
fn test_session_expires_without_timer() {
    let clock = ManualClock::new();
    let bus = Arc::new(EventBus::new(64));
    let focus = FocusModeManager::new(
        clock.clone(),
        Arc::new(NeverFires),
        bus.clone(),
        FocusConfig::default(),
    );
    let mut events = lifecycle_events(&bus);

    focus.enable_focus_mode(Mode::Developer, 1).unwrap();
    clock.advance(Duration::from_secs(30));
    assert!(focus.should_block_mode_switch(Mode::Planning).blocked);

    clock.advance(minutes(10));
    assert!(!focus.should_block_mode_switch(Mode::Planning).blocked);
    assert!(!focus.is_active());
    assert!(!focus.get_session_stats().is_active);
    assert_eq!(focus.get_remaining_time_formatted(), "0:00");
    assert!(focus.extend_focus_session(10).is_err());

    let drained = events.drain();
    assert_eq!(drained.len(), 2);
    assert!(matches!(
        drained[1],
        ModeEvent::FocusEnded {
            reason: FocusEndReason::Timeout,
            ..
        }
    ));
}

#[test]
fn test_expired_session_is_not_replaced_manually() {
    let clock = ManualClock::new();
    let bus = Arc::new(EventBus::new(64));
    let focus = FocusModeManager::new(
        clock.clone(),
        Arc::new(NeverFires),
        bus.clone(),
        FocusConfig::default(),
    );
    let mut events = lifecycle_events(&bus);

    focus.enable_focus_mode(Mode::Developer, 1).unwrap();
    clock.advance(minutes(2));
    focus.enable_focus_mode(Mode::Reviewer, 5).unwrap();

    let drained = events.drain();
    assert_eq!(drained.len(), 3);
    assert!(matches!(
        drained[1],
        ModeEvent::FocusEnded {
            reason: FocusEndReason::Timeout,
            ..
        }
    ));
    assert_eq!(focus.current_session().unwrap().mode, Mode::Reviewer);
}
