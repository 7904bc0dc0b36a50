//! Conversation signals consulted by the suggestion rules

use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

use crate::modes::Mode;
use crate::time::to_std;
use crate::types::{Message, MessageRole, tail};

/// Messages scanned for signals
const CONTEXT_WINDOW: usize = 5;

static ERROR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(error|exception|failed|failure|traceback|panicked|segmentation fault|stack trace|undefined is not|cannot find|command not found)\b",
    )
    .unwrap()
});

static TECHNICAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(api|database|architecture|algorithm|framework|deploy(ment)?|server|endpoint|schema|microservices?|module|component|implement(ation)?|backend|frontend)\b",
    )
    .unwrap()
});

static PLAN_COMPLETE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(plan (is )?(complete|ready|done|finished)|ready to (implement|start coding)|let'?s (start|begin) (implementing|coding)|implementation plan:)",
    )
    .unwrap()
});

static SECURITY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(security|vulnerabilit(y|ies)|exploit|injection|xss|csrf|authentication|authorization|password|secrets?|encrypt(ion)?|cve)\b",
    )
    .unwrap()
});

static PERFORMANCE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(performance|slow(er|ly)?|latency|optimi[sz]e|bottleneck|profil(e|ing)|memory leak|throughput|benchmark)\b",
    )
    .unwrap()
});

static REVIEW_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(review|code quality|best practices?|readability|maintainab(le|ility)|clean ?up)\b",
    )
    .unwrap()
});

static EXPERIMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(prototype|experiment(al)?|proof of concept|poc|spike|mock ?up|try out|quick hack)\b",
    )
    .unwrap()
});

static LEARNING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(^\s*(what is|what are|what's|how does|how do|why does|why do|why is|can you explain|explain)\b|\b(teach me|help me understand|i want to learn|eli5)\b)",
    )
    .unwrap()
});

/// Signals derived from the recent conversation
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationContext {
    pub current_mode: Mode,
    /// Lines that look like errors in the last five messages
    pub error_count: usize,
    pub has_technical_terms: bool,
    pub plan_complete: bool,
    pub has_security_keywords: bool,
    pub has_performance_keywords: bool,
    pub has_review_keywords: bool,
    pub has_experiment_keywords: bool,
    /// The last user message asks to have something explained
    pub is_learning_question: bool,
    /// Complete fenced code blocks
    pub code_block_count: usize,
    pub time_in_mode: Duration,
}

impl ConversationContext {
    /// A context with no signals, for the given mode
    pub fn new(current_mode: Mode) -> Self {
        Self {
            current_mode,
            error_count: 0,
            has_technical_terms: false,
            plan_complete: false,
            has_security_keywords: false,
            has_performance_keywords: false,
            has_review_keywords: false,
            has_experiment_keywords: false,
            is_learning_question: false,
            code_block_count: 0,
            time_in_mode: Duration::ZERO,
        }
    }
}

/// Derive the context from the conversation
pub fn build_context(
    messages: &[Message],
    current_mode: Mode,
    mode_entry_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ConversationContext {
    let window: Vec<String> = tail(messages, CONTEXT_WINDOW)
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| m.text_content())
        .collect();

    let error_count = window
        .iter()
        .flat_map(|text| text.lines())
        .filter(|line| ERROR_PATTERN.is_match(line))
        .count();

    let code_block_count = window
        .iter()
        .map(|text| text.matches("```").count() / 2)
        .sum();

    let plan_complete = messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::Assistant)
        .is_some_and(|m| PLAN_COMPLETE_PATTERN.is_match(&m.text_content()));

    let is_learning_question = messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .is_some_and(|m| LEARNING_PATTERN.is_match(&m.text_content()));

    ConversationContext {
        current_mode,
        error_count,
        has_technical_terms: any_match(&window, &TECHNICAL_PATTERN),
        plan_complete,
        has_security_keywords: any_match(&window, &SECURITY_PATTERN),
        has_performance_keywords: any_match(&window, &PERFORMANCE_PATTERN),
        has_review_keywords: any_match(&window, &REVIEW_PATTERN),
        has_experiment_keywords: any_match(&window, &EXPERIMENT_PATTERN),
        is_learning_question,
        code_block_count,
        time_in_mode: to_std(now - mode_entry_time),
    }
}

fn any_match(window: &[String], pattern: &Regex) -> bool {
    window.iter().any(|text| pattern.is_match(text))
}
