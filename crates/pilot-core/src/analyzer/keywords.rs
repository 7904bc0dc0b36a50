//! Per-mode keyword dictionaries

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::modes::Mode;

/// Keywords per mode, in `Mode::ALL` order
const KEYWORDS: [&[&str]; 10] = [
    // assistant
    &["hello", "hi", "thanks", "thank you", "chat", "question"],
    // planning
    &[
        "plan", "planning", "architecture", "design", "research", "roadmap", "strategy",
        "requirements", "approach", "outline",
    ],
    // developer
    &[
        "implement", "code", "function", "class", "method", "refactor", "feature", "module",
        "compile", "build",
    ],
    // tool
    &["run", "execute", "command", "shell", "terminal", "script", "install"],
    // debugger
    &[
        "bug", "error", "debug", "fix", "crash", "exception", "stack trace", "traceback",
        "failing", "broken",
    ],
    // security
    &[
        "security", "vulnerability", "vulnerabilities", "injection", "xss", "csrf", "exploit",
        "authentication", "authorization", "sanitize", "encryption", "cve",
    ],
    // reviewer
    &[
        "review", "quality", "code review", "feedback", "best practice", "best practices",
        "readability", "lint", "pull request",
    ],
    // performance
    &[
        "performance", "slow", "optimize", "optimization", "latency", "bottleneck", "profile",
        "profiling", "benchmark", "memory usage", "throughput",
    ],
    // prototype
    &[
        "prototype", "experiment", "poc", "proof of concept", "mockup", "spike", "quick and dirty",
    ],
    // teacher
    &[
        "learn", "teach", "explain", "understand", "tutorial", "concept", "how does", "what is",
    ],
];

/// One alternation per mode, longest keywords first so phrases win over their prefixes
static KEYWORD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    KEYWORDS
        .iter()
        .map(|words| {
            let mut words: Vec<&str> = words.to_vec();
            words.sort_by_key(|w| std::cmp::Reverse(w.len()));
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap()
        })
        .collect()
});

/// Keywords of one mode found in a text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatch {
    pub mode: Mode,
    /// Distinct keywords in order of first appearance, lowercased
    pub keywords: Vec<String>,
}

/// Keyword list for a mode
pub fn keywords_for(mode: Mode) -> &'static [&'static str] {
    KEYWORDS[mode.index()]
}

/// Every keyword occurrence of `mode` in `text`, lowercased, duplicates kept
pub(crate) fn keyword_hits(mode: Mode, text: &str) -> Vec<String> {
    KEYWORD_PATTERNS[mode.index()]
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Case-insensitive dictionary match; modes without hits are omitted
pub fn detect_keywords(text: &str) -> Vec<KeywordMatch> {
    Mode::ALL
        .iter()
        .filter_map(|&mode| {
            let mut keywords: Vec<String> = Vec::new();
            for hit in keyword_hits(mode, text) {
                if !keywords.contains(&hit) {
                    keywords.push(hit);
                }
            }
            (!keywords.is_empty()).then_some(KeywordMatch { mode, keywords })
        })
        .collect()
}
