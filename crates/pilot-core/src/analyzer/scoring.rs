//! Per-mode confidence scoring

use regex::Regex;
use std::sync::LazyLock;

use super::keywords::{detect_keywords, keyword_hits};
use crate::modes::Mode;
use crate::types::{Message, MessageRole, tail};

/// Messages considered for scoring
pub const SCORING_WINDOW: usize = 5;
/// Keyword hits counted per message and mode
const MAX_HITS_PER_MESSAGE: usize = 3;
/// Score of a single hit in the most recent message
const HIT_WEIGHT: f64 = 0.2;

const EXPLICIT_MENTION_BOOST: f64 = 0.3;
const CODE_BLOCK_BOOST: f64 = 0.2;
const ERROR_LINE_BOOST: f64 = 0.25;
const SECURITY_TERMS_BOOST: f64 = 0.2;

/// Lines shaped like compiler, runtime or test failures
static ERROR_LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^\s*(error(\[\w+\])?:|fatal:|panic:|exception:|traceback \(most recent call last\))|\b\w+(error|exception):|thread '.+' panicked at|\bfailed with exit code\b",
    )
    .unwrap()
});

static EXPLICIT_MENTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    Mode::ALL
        .iter()
        .map(|mode| {
            Regex::new(&format!(
                r"(?i)\b({name} mode|switch to {name}|use {name})\b",
                name = mode.as_str()
            ))
            .unwrap()
        })
        .collect()
});

/// Non-system messages in the scoring window, oldest first
pub(crate) fn scoring_window(messages: &[Message]) -> Vec<&Message> {
    tail(messages, SCORING_WINDOW)
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .collect()
}

pub(crate) fn has_code_block(text: &str) -> bool {
    text.contains("```")
}

pub(crate) fn has_error_line(text: &str) -> bool {
    ERROR_LINE_PATTERN.is_match(text)
}

/// Confidence in [0, 1] for every mode
///
/// Keyword hits are weighted by recency: in a window of `n` messages the
/// `i`-th (0-based, oldest first) counts `(i + 1) / n`.
pub fn calculate_all_mode_confidences(messages: &[Message]) -> [f64; 10] {
    let mut scores = [0.0_f64; 10];
    let window = scoring_window(messages);
    if window.is_empty() {
        return scores;
    }

    let texts: Vec<String> = window.iter().map(|m| m.text_content()).collect();
    let n = texts.len() as f64;

    for (i, text) in texts.iter().enumerate() {
        let weight = (i as f64 + 1.0) / n;
        for mode in Mode::ALL {
            let hits = keyword_hits(mode, text).len().min(MAX_HITS_PER_MESSAGE);
            scores[mode.index()] += hits as f64 * HIT_WEIGHT * weight;
        }
    }

    for mode in Mode::ALL {
        if texts
            .iter()
            .any(|t| EXPLICIT_MENTION_PATTERNS[mode.index()].is_match(t))
        {
            scores[mode.index()] += EXPLICIT_MENTION_BOOST;
        }
    }

    if texts.iter().any(|t| has_code_block(t)) {
        scores[Mode::Developer.index()] += CODE_BLOCK_BOOST;
    }
    if texts.iter().any(|t| has_error_line(t)) {
        scores[Mode::Debugger.index()] += ERROR_LINE_BOOST;
    }

    let mut security_terms: Vec<String> = Vec::new();
    for text in &texts {
        for found in detect_keywords(text) {
            if found.mode != Mode::Security {
                continue;
            }
            for keyword in found.keywords {
                if !security_terms.contains(&keyword) {
                    security_terms.push(keyword);
                }
            }
        }
    }
    if security_terms.len() >= 2 {
        scores[Mode::Security.index()] += SECURITY_TERMS_BOOST;
    }

    for score in &mut scores {
        *score = score.clamp(0.0, 1.0);
    }
    scores
}
