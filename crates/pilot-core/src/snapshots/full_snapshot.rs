//! Full-context state export
//!
//! Produces a `<state_snapshot>` document summarizing a whole conversation so
//! a fresh context can pick up where the old one stopped.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::LazyLock;

use crate::types::{Message, MessageRole};

const GOAL_MIN_CHARS: usize = 10;
const GOAL_MAX_CHARS: usize = 500;
const MAX_KNOWLEDGE: usize = 10;
const MAX_FILES: usize = 15;
const MAX_PLAN_STEPS: usize = 10;

/// Sentences worth carrying over from assistant replies
static KNOWLEDGE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(important|note|remember|must|always|never|requires?|depends on|configured)\b")
        .unwrap()
});

/// Relative or absolute file paths with an extension
static PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s`'(])((?:\.{1,2}/|/)?(?:[\w.-]+/)*[\w-]+\.[A-Za-z0-9]{1,8})\b").unwrap()
});

static FILE_ACTION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(created|modified|updated|edited|deleted|removed|read)\b").unwrap()
});

/// Numbered or bulleted list items
static PLAN_STEP_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:\d+[.)]|[-*])[ \t]+(.+)$").unwrap()
});

/// Build the full-state document for `messages`
pub fn create_full_snapshot(messages: &[Message]) -> String {
    let mut out = String::from("<state_snapshot>\n");

    out.push_str("  <overall_goal>\n");
    let _ = writeln!(out, "    {}", escape_xml(&overall_goal(messages)));
    out.push_str("  </overall_goal>\n");

    out.push_str("  <key_knowledge>\n");
    let knowledge = key_knowledge(messages);
    if knowledge.is_empty() {
        out.push_str("    - None recorded\n");
    }
    for line in knowledge {
        let _ = writeln!(out, "    - {}", escape_xml(&line));
    }
    out.push_str("  </key_knowledge>\n");

    out.push_str("  <file_system_state>\n");
    let files = file_system_state(messages);
    if files.is_empty() {
        out.push_str("    - No files referenced\n");
    }
    for (path, action) in files {
        let _ = writeln!(out, "    - {}: {}", action, escape_xml(&path));
    }
    out.push_str("  </file_system_state>\n");

    out.push_str("  <current_plan>\n");
    let plan = current_plan(messages);
    if plan.is_empty() {
        out.push_str("    1. [TODO] Continue from the last message\n");
    }
    for (i, step) in plan.iter().enumerate() {
        let _ = writeln!(out, "    {}. {}", i + 1, escape_xml(step));
    }
    out.push_str("  </current_plan>\n");

    out.push_str("</state_snapshot>");
    out
}

/// Escape the characters that would break the document structure
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn overall_goal(messages: &[Message]) -> String {
    messages
        .iter()
        .filter(|m| m.role == MessageRole::User)
        .map(|m| m.text_content().trim().to_string())
        .find(|text| text.chars().count() >= GOAL_MIN_CHARS)
        .map(|text| truncate(&text, GOAL_MAX_CHARS))
        .unwrap_or_else(|| "No clear goal identified".to_string())
}

fn key_knowledge(messages: &[Message]) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for message in messages.iter().filter(|m| m.role == MessageRole::Assistant) {
        for line in message.text_content().lines() {
            let line = line.trim().trim_start_matches(['-', '*']).trim();
            if line.is_empty() || !KNOWLEDGE_PATTERN.is_match(line) {
                continue;
            }
            if !lines.iter().any(|l| l == line) {
                lines.push(line.to_string());
            }
        }
    }
    // Most recent knowledge wins when there is too much
    let skip = lines.len().saturating_sub(MAX_KNOWLEDGE);
    lines.into_iter().skip(skip).collect()
}

fn file_system_state(messages: &[Message]) -> BTreeMap<String, &'static str> {
    let mut files = BTreeMap::new();
    for message in messages.iter().filter(|m| m.role != MessageRole::System) {
        for line in message.text_content().lines() {
            let action = FILE_ACTION_PATTERN
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| file_action(m.as_str()));

            for capture in PATH_PATTERN.captures_iter(line) {
                let Some(path) = capture.get(1) else {
                    continue;
                };
                let path = path.as_str().to_string();
                if files.len() >= MAX_FILES && !files.contains_key(&path) {
                    continue;
                }
                let entry = files.entry(path).or_insert("REFERENCED");
                if let Some(action) = action {
                    *entry = action;
                }
            }
        }
    }
    files
}

fn file_action(verb: &str) -> &'static str {
    match verb.to_lowercase().as_str() {
        "created" => "CREATED",
        "deleted" | "removed" => "DELETED",
        "read" => "READ",
        _ => "MODIFIED",
    }
}

fn current_plan(messages: &[Message]) -> Vec<String> {
    let Some(last) = messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::Assistant && PLAN_STEP_PATTERN.is_match(&m.text_content()))
    else {
        return Vec::new();
    };

    last.text_content()
        .lines()
        .filter_map(|line| PLAN_STEP_PATTERN.captures(line))
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
        .take(MAX_PLAN_STEPS)
        .collect()
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}
