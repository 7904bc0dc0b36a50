use std::sync::Arc;
use std::time::Duration;

use super::*;
use crate::analyzer::ConversationAnalysis;
use crate::config::PilotConfig;
use crate::events::{EventBus, EventFilter, FilteredSubscriber, ModeEvent};
use crate::modes::{Mode, ModeTransition, SerializableTransition, TransitionTrigger};
use crate::prompts::PromptRegistry;
use crate::snapshots::{SnapshotInput, TransitionSnapshotStore};
use crate::time::{Clock, ManualClock};
use crate::types::{Message, ToolCall, ToolDescriptor};

fn setup() -> (Arc<ManualClock>, Arc<EventBus>, ModeManager) {
    setup_with(PilotConfig::default())
}

fn setup_with(config: PilotConfig) -> (Arc<ManualClock>, Arc<EventBus>, ModeManager) {
    let clock = ManualClock::new();
    let bus = Arc::new(EventBus::new(8192));
    let manager = ModeManager::builder()
        .with_config(config)
        .with_clock(clock.clone())
        .with_scheduler(clock.clone())
        .with_event_bus(bus.clone())
        .build();
    (clock, bus, manager)
}

fn seconds(n: u64) -> Duration {
    Duration::from_secs(n)
}

fn tools(names: &[&str]) -> Vec<ToolDescriptor> {
    names.iter().map(|n| ToolDescriptor::new(*n)).collect()
}

fn planning_request() -> Vec<Message> {
    vec![Message::user(
        "Let's plan the architecture and design a roadmap, switch to planning",
    )]
}

#[test]
fn test_initial_state() {
    let (clock, _bus, manager) = setup();
    assert_eq!(manager.get_current_mode(), Mode::Assistant);
    assert_eq!(manager.get_previous_mode(), None);
    assert!(manager.is_auto_switch_enabled());
    assert!(manager.get_mode_history().is_empty());

    let state = manager.current_state();
    assert_eq!(state.mode_entry_time, clock.now());
    assert_eq!(state.last_switch_time, None);
}

#[test]
fn test_switch_records_and_emits() {
    let (clock, bus, manager) = setup();
    let mut events = FilteredSubscriber::new(&bus, EventFilter::new().only_types(vec!["mode-changed"]));

    clock.advance(seconds(5));
    let outcome = manager.switch_mode(Mode::Developer, TransitionTrigger::Manual, 1.0);
    let transition = outcome.transition().cloned().unwrap();

    assert_eq!(transition.from, Mode::Assistant);
    assert_eq!(transition.to, Mode::Developer);
    assert_eq!(transition.timestamp, clock.now());
    assert_eq!(manager.get_current_mode(), Mode::Developer);
    assert_eq!(manager.get_previous_mode(), Some(Mode::Assistant));
    assert_eq!(manager.current_state().last_switch_time, Some(clock.now()));
    assert_eq!(events.drain(), vec![ModeEvent::ModeChanged { transition }]);
}

#[test]
fn test_switch_to_current_mode_is_noop() {
    let (_clock, bus, manager) = setup();
    let mut events = bus.subscribe();

    let outcome = manager.switch_mode(Mode::Assistant, TransitionTrigger::Manual, 1.0);
    assert_eq!(outcome, SwitchOutcome::Unchanged);
    assert!(manager.get_mode_history().is_empty());
    assert!(events.try_recv().is_err());
}

#[test]
fn test_history_is_capped() {
    let (_clock, _bus, manager) = setup();
    for i in 0..150 {
        let to = if i % 2 == 0 { Mode::Developer } else { Mode::Planning };
        manager.switch_mode(to, TransitionTrigger::Manual, 1.0);
    }

    let history = manager.get_mode_history();
    assert_eq!(history.len(), 100);
    assert_eq!(history.last().map(|t| t.to), Some(Mode::Planning));
    assert_eq!(manager.get_recent_history(3).len(), 3);
    assert_eq!(manager.get_recent_history(500).len(), 100);
}

#[test]
fn test_recent_history_is_oldest_first() {
    let (_clock, _bus, manager) = setup();
    manager.switch_mode(Mode::Developer, TransitionTrigger::Manual, 1.0);
    manager.switch_mode(Mode::Debugger, TransitionTrigger::Manual, 1.0);
    manager.switch_mode(Mode::Reviewer, TransitionTrigger::Manual, 1.0);

    let recent: Vec<Mode> = manager.get_recent_history(2).iter().map(|t| t.to).collect();
    assert_eq!(recent, vec![Mode::Debugger, Mode::Reviewer]);
}

#[test]
fn test_gate_hysteresis_and_cooldown() {
    let (clock, _bus, manager) = setup();
    let analysis = ConversationAnalysis::new(Mode::Planning, 1.0);

    clock.advance(seconds(29));
    assert!(!manager.should_switch_mode(Mode::Assistant, &analysis));
    clock.advance(seconds(1));
    assert!(manager.should_switch_mode(Mode::Assistant, &analysis));

    manager.switch_mode(Mode::Planning, TransitionTrigger::Manual, 1.0);
    let back = ConversationAnalysis::new(Mode::Developer, 1.0);
    clock.advance(seconds(29));
    assert!(!manager.should_switch_mode(Mode::Planning, &back));
    clock.advance(seconds(1));
    assert!(manager.should_switch_mode(Mode::Planning, &back));
}

#[test]
fn test_gate_cooldown_without_hysteresis() {
    let mut config = PilotConfig::default();
    config.switching.hysteresis = Duration::ZERO;
    let (clock, _bus, manager) = setup_with(config);

    manager.switch_mode(Mode::Developer, TransitionTrigger::Manual, 1.0);
    let analysis = ConversationAnalysis::new(Mode::Planning, 1.0);

    clock.advance(seconds(9));
    assert!(!manager.should_switch_mode(Mode::Developer, &analysis));
    clock.advance(seconds(1));
    assert!(manager.should_switch_mode(Mode::Developer, &analysis));
}

#[test]
fn test_gate_thresholds_per_pair() {
    let (clock, _bus, manager) = setup();
    clock.advance(seconds(60));

    assert!(!manager.should_switch_mode(Mode::Assistant, &ConversationAnalysis::new(Mode::Developer, 0.69)));
    assert!(manager.should_switch_mode(Mode::Assistant, &ConversationAnalysis::new(Mode::Developer, 0.70)));
    assert!(!manager.should_switch_mode(Mode::Assistant, &ConversationAnalysis::new(Mode::Debugger, 0.80)));
    assert!(manager.should_switch_mode(Mode::Assistant, &ConversationAnalysis::new(Mode::Debugger, 0.85)));
    assert!(!manager.should_switch_mode(Mode::Assistant, &ConversationAnalysis::new(Mode::Security, 0.85)));

    manager.switch_mode(Mode::Developer, TransitionTrigger::Manual, 1.0);
    clock.advance(seconds(60));
    assert!(manager.should_switch_mode(Mode::Developer, &ConversationAnalysis::new(Mode::Planning, 0.62)));
}

#[test]
fn test_gate_rejects_same_mode_and_disabled_auto_switch() {
    let (clock, _bus, manager) = setup();
    clock.advance(seconds(60));

    assert!(!manager.should_switch_mode(Mode::Assistant, &ConversationAnalysis::new(Mode::Assistant, 1.0)));

    manager.set_auto_switch(false);
    assert!(!manager.should_switch_mode(Mode::Assistant, &ConversationAnalysis::new(Mode::Developer, 1.0)));
}

#[test]
fn test_gate_does_not_mutate() {
    let (clock, _bus, manager) = setup();
    clock.advance(seconds(60));
    assert!(manager.should_switch_mode(Mode::Assistant, &ConversationAnalysis::new(Mode::Developer, 1.0)));
    assert_eq!(manager.get_current_mode(), Mode::Assistant);
    assert!(manager.get_mode_history().is_empty());
}

#[test]
fn test_auto_switch_uses_analysis() {
    let (clock, _bus, manager) = setup();

    assert_eq!(manager.auto_switch(&planning_request()), None);

    clock.advance(seconds(30));
    let transition = manager.auto_switch(&planning_request()).unwrap();
    assert_eq!(transition.to, Mode::Planning);
    assert_eq!(transition.trigger, TransitionTrigger::Auto);
    assert!(transition.confidence >= 0.70);
    assert_eq!(manager.get_current_mode(), Mode::Planning);
}

#[test]
fn test_auto_switch_to_tool_mode_on_tool_calls() {
    let (clock, _bus, manager) = setup();
    clock.advance(seconds(30));

    let messages = vec![
        Message::user("list the files"),
        Message::assistant("Listing").with_tool_calls(vec![ToolCall::new("1", "list_files")]),
    ];
    let transition = manager.auto_switch(&messages).unwrap();
    assert_eq!(transition.to, Mode::Tool);
}

#[test]
fn test_focus_blocks_manual_but_not_explicit() {
    let (_clock, bus, manager) = setup();
    let mut blocked = FilteredSubscriber::new(&bus, EventFilter::new().only_types(vec!["mode-switch-blocked"]));

    manager.switch_mode(Mode::Developer, TransitionTrigger::Manual, 1.0);
    manager.focus().enable_focus_mode(Mode::Developer, 30).unwrap();

    let outcome = manager.switch_mode(Mode::Planning, TransitionTrigger::Manual, 1.0);
    let SwitchOutcome::Blocked { reason } = outcome else {
        panic!("expected blocked outcome, got {:?}", outcome);
    };
    assert!(reason.contains("developer"));
    assert_eq!(manager.get_current_mode(), Mode::Developer);

    let events = blocked.drain();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        ModeEvent::ModeSwitchBlocked { target_mode: Mode::Planning, .. }
    ));

    let outcome = manager.switch_mode(Mode::Planning, TransitionTrigger::Explicit, 1.0);
    assert!(outcome.is_switched());
    assert_eq!(manager.get_current_mode(), Mode::Planning);
}

#[test]
fn test_focus_blocks_gate() {
    let (clock, _bus, manager) = setup();
    manager.switch_mode(Mode::Developer, TransitionTrigger::Manual, 1.0);
    manager.focus().enable_focus_mode(Mode::Developer, 30).unwrap();
    clock.advance(seconds(120));

    let analysis = ConversationAnalysis::new(Mode::Planning, 0.9);
    assert!(!manager.should_switch_mode(Mode::Developer, &analysis));

    manager.focus().disable_focus_mode(crate::focus::FocusEndReason::Manual);
    assert!(manager.should_switch_mode(Mode::Developer, &analysis));
}

#[test]
fn test_force_mode_overrides_and_disables_auto() {
    let (_clock, bus, manager) = setup();
    let mut auto_events = FilteredSubscriber::new(&bus, EventFilter::new().only_types(vec!["auto-switch-changed"]));
    manager.focus().enable_focus_mode(Mode::Assistant, 30).unwrap();

    let transition = manager.force_mode(Mode::Security).unwrap();
    assert_eq!(transition.trigger, TransitionTrigger::Explicit);
    assert_eq!(transition.confidence, 1.0);
    assert_eq!(manager.get_current_mode(), Mode::Security);
    assert!(!manager.is_auto_switch_enabled());
    assert!(manager.focus().is_active());

    assert_eq!(manager.force_mode(Mode::Security), None);
    assert_eq!(
        auto_events.drain(),
        vec![ModeEvent::AutoSwitchChanged { enabled: false }]
    );
}

#[test]
fn test_set_auto_switch_emits_on_change_only() {
    let (_clock, bus, manager) = setup();
    let mut events = FilteredSubscriber::new(&bus, EventFilter::new().only_types(vec!["auto-switch-changed"]));

    manager.set_auto_switch(true);
    manager.set_auto_switch(false);
    manager.set_auto_switch(false);
    manager.set_auto_switch(true);

    assert_eq!(
        events.drain(),
        vec![
            ModeEvent::AutoSwitchChanged { enabled: false },
            ModeEvent::AutoSwitchChanged { enabled: true },
        ]
    );
}

#[test]
fn test_skills() {
    let (_clock, _bus, manager) = setup();
    assert!(manager.activate_skill("rust"));
    assert!(!manager.activate_skill("rust"));
    assert!(manager.activate_skill("async"));
    assert_eq!(manager.active_skills(), vec!["async", "rust"]);
    assert!(manager.deactivate_skill("rust"));
    assert!(!manager.deactivate_skill("rust"));
}

#[test]
fn test_tool_filtering() {
    let (_clock, _bus, manager) = setup();
    let catalog = tools(&["read_file", "write_file", "git_status", "git_push", "run_tests"]);

    assert_eq!(manager.filter_tools_for_mode(&catalog, Mode::Developer), catalog);
    assert_eq!(manager.filter_tools_for_mode(&catalog, Mode::Tool), catalog);
    assert!(manager.filter_tools_for_mode(&catalog, Mode::Assistant).is_empty());

    let names: Vec<String> = manager
        .filter_tools_for_mode(&catalog, Mode::Debugger)
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["read_file", "write_file", "git_status", "run_tests"]);

    assert!(manager.is_tool_allowed("read_file", Mode::Security));
    assert!(!manager.is_tool_allowed("write_file", Mode::Security));
    assert!(!manager.is_tool_allowed("unknown_tool", Mode::Planning));
    assert!(!manager.is_tool_allowed_now("read_file"));
}

#[test]
fn test_tool_pattern_tables() {
    let (_clock, _bus, manager) = setup();
    assert_eq!(manager.get_allowed_tools(Mode::Developer), vec!["*"]);
    assert!(manager.get_denied_tools(Mode::Developer).is_empty());
    assert!(manager.get_allowed_tools(Mode::Assistant).is_empty());
    assert!(manager.get_denied_tools(Mode::Debugger).contains(&"delete_*".to_string()));
}

#[test]
fn test_build_prompt_sections() {
    let clock = ManualClock::new();
    let registry = Arc::new(PromptRegistry::with_builtins());
    registry.register_skill("rust", "Prefer iterators over index loops.");
    let manager = ModeManager::builder()
        .with_clock(clock.clone())
        .with_scheduler(clock.clone())
        .with_prompt_source(registry.clone())
        .build();

    let request = PromptRequest::new(Mode::Debugger)
        .with_tools(vec![
            ToolDescriptor::new("read_file").with_description("Read a file"),
            ToolDescriptor::new("delete_file").with_description("Delete a file"),
            ToolDescriptor::new("grep"),
        ])
        .with_skills(vec!["rust".into(), "missing".into()])
        .with_workspace("/work/project", 42)
        .with_additional_instructions("Be brief.");
    let prompt = manager.build_prompt(&request);

    assert!(prompt.starts_with("You are in debugger mode."));
    assert!(prompt.contains("## Available Tools\n- read_file: Read a file\n- grep"));
    assert!(!prompt.contains("delete_file"));
    assert!(prompt.contains("## Active Skills\n\n### rust\nPrefer iterators over index loops."));
    assert!(!prompt.contains("### missing"));
    assert!(prompt.contains("## Workspace\nPath: /work/project\nFiles: 42"));
    assert!(prompt.ends_with("## Additional Instructions\nBe brief."));

    let tools_at = prompt.find("## Available Tools").unwrap();
    let skills_at = prompt.find("## Active Skills").unwrap();
    let workspace_at = prompt.find("## Workspace").unwrap();
    assert!(tools_at < skills_at && skills_at < workspace_at);
}

#[test]
fn test_build_prompt_without_tools() {
    let (_clock, _bus, manager) = setup();
    let prompt = manager.build_prompt(&PromptRequest::new(Mode::Assistant).with_tools(tools(&["read_file"])));
    assert!(prompt.contains("No tools are available in this mode."));
    assert!(!prompt.contains("## Active Skills"));
    assert!(!prompt.contains("## Workspace"));
}

#[test]
fn test_build_prompt_uses_registry_template() {
    let clock = ManualClock::new();
    let registry = Arc::new(PromptRegistry::new());
    registry.set_template(Mode::Teacher, "Custom teacher template");
    let manager = ModeManager::builder()
        .with_clock(clock.clone())
        .with_scheduler(clock.clone())
        .with_prompt_source(registry)
        .build();

    let teacher = manager.build_prompt(&PromptRequest::new(Mode::Teacher));
    assert!(teacher.starts_with("Custom teacher template\n\n## Available Tools"));

    let planning = manager.build_prompt(&PromptRequest::new(Mode::Planning));
    assert!(planning.starts_with("You are in planning mode."));
}

#[test]
fn test_history_round_trip() {
    let (clock, _bus, manager) = setup();
    for to in [Mode::Planning, Mode::Developer, Mode::Debugger] {
        clock.advance(seconds(45));
        manager.switch_mode(to, TransitionTrigger::Manual, 0.8);
    }
    let saved = manager.get_serializable_mode_history();

    let (_clock2, _bus2, restored) = setup();
    restored.restore_mode_history(&saved).unwrap();

    assert_eq!(restored.get_current_mode(), Mode::Debugger);
    assert_eq!(restored.get_previous_mode(), Some(Mode::Developer));
    assert_eq!(restored.get_mode_history(), manager.get_mode_history());
}

#[test]
fn test_restore_empty_history_resets() {
    let (_clock, _bus, manager) = setup();
    manager.switch_mode(Mode::Developer, TransitionTrigger::Manual, 1.0);

    manager.restore_mode_history(&[]).unwrap();
    assert_eq!(manager.get_current_mode(), Mode::Assistant);
    assert_eq!(manager.get_previous_mode(), None);
    assert!(manager.get_mode_history().is_empty());
}

#[test]
fn test_restore_rejects_bad_timestamp_without_mutation() {
    let (_clock, _bus, manager) = setup();
    manager.switch_mode(Mode::Developer, TransitionTrigger::Manual, 1.0);

    let bad = vec![SerializableTransition {
        from: Mode::Assistant,
        to: Mode::Planning,
        timestamp: "not a time".into(),
        trigger: TransitionTrigger::Auto,
        confidence: 0.9,
    }];
    assert!(manager.restore_mode_history(&bad).is_err());
    assert_eq!(manager.get_current_mode(), Mode::Developer);
    assert_eq!(manager.get_mode_history().len(), 1);
}

#[test]
fn test_restore_emits_no_events() {
    let (_clock, bus, manager) = setup();
    manager.switch_mode(Mode::Developer, TransitionTrigger::Manual, 1.0);
    let saved = manager.get_serializable_mode_history();

    let mut events = bus.subscribe();
    manager.restore_mode_history(&saved).unwrap();
    assert!(events.try_recv().is_err());
}

#[test]
fn test_session_state_round_trip() {
    let (_clock, _bus, manager) = setup();
    manager.switch_mode(Mode::Planning, TransitionTrigger::Manual, 1.0);
    manager.activate_skill("rust");
    manager.set_auto_switch(false);

    let json = serde_json::to_string(&manager.export_session_state()).unwrap();
    assert!(json.contains("\"autoSwitchEnabled\":false"));
    let session: ModeSessionState = serde_json::from_str(&json).unwrap();

    let (_clock2, _bus2, restored) = setup();
    restored.restore_session_state(&session).unwrap();
    assert_eq!(restored.get_current_mode(), Mode::Planning);
    assert!(!restored.is_auto_switch_enabled());
    assert_eq!(restored.active_skills(), vec!["rust"]);
}

#[test]
fn test_switch_with_snapshot_captures_state() {
    let clock = ManualClock::new();
    let store = Arc::new(TransitionSnapshotStore::new(clock.clone(), Default::default()));
    let manager = ModeManager::builder()
        .with_clock(clock.clone())
        .with_scheduler(clock.clone())
        .with_snapshot_store(store.clone())
        .build();
    manager.activate_skill("rust");

    let input = SnapshotInput::new(vec![Message::user("the build is failing")])
        .with_current_task("fix build");
    let outcome = manager.switch_mode_with_snapshot(Mode::Debugger, TransitionTrigger::Manual, 1.0, input.clone());
    assert!(outcome.is_switched());

    let snapshot = store.get_snapshot(Mode::Assistant, Mode::Debugger).unwrap();
    assert_eq!(snapshot.active_skills, vec!["rust"]);
    assert_eq!(snapshot.current_task.as_deref(), Some("fix build"));
    assert_eq!(snapshot.recent_messages.len(), 1);

    let outcome = manager.switch_mode_with_snapshot(Mode::Debugger, TransitionTrigger::Manual, 1.0, input);
    assert_eq!(outcome, SwitchOutcome::Unchanged);
    assert_eq!(store.get_cache_stats().size, 1);
}

#[test]
fn test_shutdown_ends_focus_once() {
    let (clock, bus, manager) = setup();
    let mut ended = FilteredSubscriber::new(&bus, EventFilter::new().only_types(vec!["focus-ended"]));
    manager.focus().enable_focus_mode(Mode::Assistant, 10).unwrap();

    manager.shutdown();
    manager.shutdown();
    assert!(!manager.focus().is_active());
    assert_eq!(clock.pending_timers(), 0);
    assert_eq!(ended.drain().len(), 1);

    drop(manager);
    assert!(ended.drain().is_empty());
}

#[test]
fn test_time_in_current_mode() {
    let (clock, _bus, manager) = setup();
    clock.advance(seconds(90));
    assert_eq!(manager.time_in_current_mode(), seconds(90));
    manager.switch_mode(Mode::Developer, TransitionTrigger::Manual, 1.0);
    clock.advance(seconds(5));
    assert_eq!(manager.time_in_current_mode(), seconds(5));
}

#[test]
fn test_concurrent_auto_switch_applies_once() {
    let (clock, bus, manager) = setup();
    let mut events = FilteredSubscriber::new(&bus, EventFilter::new().only_types(vec!["mode-changed"]));
    clock.advance(seconds(30));
    let messages = planning_request();

    let applied: Vec<Option<ModeTransition>> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| manager.auto_switch(&messages)))
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(applied.iter().filter(|t| t.is_some()).count(), 1);
    assert_eq!(manager.get_current_mode(), Mode::Planning);
    assert_eq!(manager.get_mode_history().len(), 1);
    assert_eq!(events.drain().len(), 1);
}

#[test]
fn test_concurrent_switches_keep_history_and_events_in_order() {
    let mut config = PilotConfig::default();
    config.switching.history_limit = 16;
    let (_clock, bus, manager) = setup_with(config);
    let mut events = FilteredSubscriber::new(&bus, EventFilter::new().only_types(vec!["mode-changed"]));

    let switched: usize = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|worker| {
                let manager = &manager;
                scope.spawn(move || {
                    (0..25)
                        .filter(|i| {
                            let to = if (worker + i) % 2 == 0 { Mode::Developer } else { Mode::Reviewer };
                            manager.switch_mode(to, TransitionTrigger::Manual, 1.0).is_switched()
                        })
                        .count()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).sum()
    });

    let changes: Vec<ModeTransition> = events
        .drain()
        .into_iter()
        .filter_map(|event| match event {
            ModeEvent::ModeChanged { transition } => Some(transition),
            _ => None,
        })
        .collect();
    assert_eq!(changes.len(), switched);
    assert!(changes.windows(2).all(|w| w[0].to == w[1].from));

    let history = manager.get_mode_history();
    assert!(history.len() <= 16);
    assert_eq!(history.as_slice(), &changes[changes.len() - history.len()..]);
    assert_eq!(history.last().map(|t| t.to), Some(manager.get_current_mode()));
}
