use super::*;
use crate::modes::Mode;
use crate::types::{Message, ToolCall};

fn analyzer() -> ContextAnalyzer {
    ContextAnalyzer::new()
}

#[test]
fn test_empty_conversation_is_assistant() {
    let analysis = analyzer().analyze_conversation(&[]);
    assert_eq!(analysis.mode, Mode::Assistant);
    assert_eq!(analysis.confidence, 0.0);
    assert!(analysis.triggers.is_empty());
    assert_eq!(analysis.metadata, AnalysisMetadata::default());
}

#[test]
fn test_non_textual_input_degrades() {
    let msg = Message {
        role: crate::types::MessageRole::User,
        parts: vec![crate::types::MessagePart::Image {
            url: "file:///tmp/diagram.png".into(),
        }],
        tool_calls: Vec::new(),
    };
    let analysis = analyzer().analyze_conversation(&[msg]);
    assert_eq!(analysis.mode, Mode::Assistant);
    assert_eq!(analysis.confidence, 0.0);
}

#[test]
fn test_confidences_are_clamped() {
    let shouting = "security vulnerability injection xss csrf exploit security mode ".repeat(20);
    let messages: Vec<_> = (0..5).map(|_| Message::user(shouting.clone())).collect();
    let scores = calculate_all_mode_confidences(&messages);
    for score in scores {
        assert!((0.0..=1.0).contains(&score));
    }
    assert_eq!(scores[Mode::Security.index()], 1.0);
}

#[test]
fn test_recent_messages_weigh_more() {
    let old_plan = vec![
        Message::user("let's design the architecture"),
        Message::user("fix this bug"),
    ];
    let new_plan = vec![
        Message::user("fix this bug"),
        Message::user("let's design the architecture"),
    ];

    let a = calculate_all_mode_confidences(&old_plan);
    let b = calculate_all_mode_confidences(&new_plan);
    assert!(b[Mode::Planning.index()] > a[Mode::Planning.index()]);
    assert!(a[Mode::Debugger.index()] > b[Mode::Debugger.index()]);
}

#[test]
fn test_only_last_five_messages_count() {
    let mut messages = vec![Message::user("security vulnerability injection")];
    messages.extend((0..5).map(|i| Message::user(format!("note {}", i))));
    let scores = calculate_all_mode_confidences(&messages);
    assert_eq!(scores[Mode::Security.index()], 0.0);
}

#[test]
fn test_system_messages_ignored() {
    let messages = vec![Message::system("You are a security auditor. Find every vulnerability.")];
    let analysis = analyzer().analyze_conversation(&messages);
    assert_eq!(analysis.mode, Mode::Assistant);
    assert_eq!(analysis.confidence, 0.0);
}

#[test]
fn test_planning_conversation() {
    let messages = vec![
        Message::user("I want to plan the architecture for a new service"),
        Message::assistant("Sure, what are the requirements?"),
        Message::user("Research the options and draft a roadmap"),
    ];
    let analysis = analyzer().analyze_conversation(&messages);
    assert_eq!(analysis.mode, Mode::Planning);
    assert!(analysis.confidence > 0.0);
    assert_eq!(
        analysis.triggers,
        vec!["plan", "architecture", "requirements", "research", "roadmap"]
    );
    assert_eq!(
        analysis.metadata.recent_topics,
        vec![
            "I want to plan the architecture for a new service",
            "Research the options and draft a roadmap"
        ]
    );
}

#[test]
fn test_error_line_boosts_debugger() {
    let messages = vec![Message::user(
        "cargo test output:\nerror[E0425]: cannot find value `x` in this scope",
    )];
    let analysis = analyzer().analyze_conversation(&messages);
    assert_eq!(analysis.mode, Mode::Debugger);
    assert!(analysis.metadata.error_messages_present);
    // one keyword hit (0.2) plus the error-line boost (0.25)
    assert!((analysis.confidence - 0.45).abs() < 1e-9);
}

#[test]
fn test_code_block_boosts_developer() {
    let messages = vec![Message::user("```rust\nfn main() {}\n```")];
    let analysis = analyzer().analyze_conversation(&messages);
    assert_eq!(analysis.mode, Mode::Developer);
    assert!(analysis.metadata.code_blocks_present);
    assert!((analysis.confidence - 0.2).abs() < 1e-9);
}

#[test]
fn test_explicit_mention_boost() {
    let messages = vec![Message::user("please switch to teacher mode")];
    let scores = calculate_all_mode_confidences(&messages);
    assert!((scores[Mode::Teacher.index()] - 0.3).abs() < 1e-9);
}

#[test]
fn test_tie_defaults_to_assistant() {
    // one planning hit and one debugger hit in the same message
    let messages = vec![Message::user("design bug")];
    let analysis = analyzer().analyze_conversation(&messages);
    assert_eq!(analysis.mode, Mode::Assistant);
    assert_eq!(analysis.confidence, 0.0);
    assert_eq!(analysis.metadata.keywords, vec!["design", "bug"]);
}

#[test]
fn test_tool_calls_short_circuit() {
    let messages = vec![
        Message::user("fix the bug in the parser"),
        Message::assistant("Reading the file").with_tool_calls(vec![
            ToolCall::new("1", "read_file").with_argument("path", "src/parser.rs"),
            ToolCall::new("2", "grep"),
        ]),
        Message::user("thanks"),
    ];
    let analysis = analyzer().analyze_conversation(&messages);
    assert_eq!(analysis.mode, Mode::Tool);
    assert_eq!(analysis.confidence, TOOL_USAGE_CONFIDENCE);
    assert_eq!(analysis.triggers, vec!["read_file", "grep"]);
    assert_eq!(analysis.metadata.tools_used, vec!["read_file", "grep"]);
}

#[test]
fn test_tool_calls_outside_window_ignored() {
    let mut messages =
        vec![Message::assistant("").with_tool_calls(vec![ToolCall::new("1", "shell")])];
    messages.extend((0..3).map(|_| Message::user("hello")));
    assert!(analyzer().detect_tool_usage(&messages).is_empty());
}

#[test]
fn test_suggested_modes() {
    let messages = vec![Message::user("there is a bug, the error is a crash")];
    let suggestions = analyzer().get_suggested_modes(&messages, Mode::Developer, 3);

    assert_eq!(suggestions.len(), 3);
    assert_eq!(suggestions[0].mode, Mode::Debugger);
    assert!(suggestions[0].reason.to_lowercase().contains("error"));
    assert!(!suggestions[0].icon.is_empty());
    assert!(suggestions.iter().all(|s| s.mode != Mode::Developer));
    assert!(suggestions.windows(2).all(|w| w[0].confidence >= w[1].confidence));
}

#[test]
fn test_suggested_modes_padded_with_zero_scores() {
    let suggestions = analyzer().get_suggested_modes(&[], Mode::Assistant, 4);
    assert_eq!(suggestions.len(), 4);
    assert!(suggestions.iter().all(|s| s.confidence == 0.0));
    assert!(suggestions.iter().all(|s| s.mode != Mode::Assistant));

    let all = analyzer().get_suggested_modes(&[], Mode::Assistant, 50);
    assert_eq!(all.len(), 9);
}
