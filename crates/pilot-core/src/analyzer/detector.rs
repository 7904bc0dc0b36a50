//! Conversation analysis

use serde::{Deserialize, Serialize};

use super::keywords::keyword_hits;
use super::scoring::{calculate_all_mode_confidences, has_code_block, has_error_line, scoring_window};
use crate::modes::{Mode, ModeProfile};
use crate::types::{Message, MessageRole, tail};

/// Messages inspected for tool calls
pub const TOOL_WINDOW: usize = 3;
/// Confidence reported when recent tool calls force tool mode
pub const TOOL_USAGE_CONFIDENCE: f64 = 0.9;
/// User messages mined for topics
const TOPIC_MESSAGES: usize = 3;
const TOPIC_MAX_CHARS: usize = 60;

/// Facts gathered while analyzing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// Every distinct keyword matched in the window
    pub keywords: Vec<String>,
    pub tools_used: Vec<String>,
    pub recent_topics: Vec<String>,
    pub code_blocks_present: bool,
    pub error_messages_present: bool,
}

/// Result of classifying a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationAnalysis {
    pub mode: Mode,
    /// In [0, 1]
    pub confidence: f64,
    /// Matched keywords (or tool names) that drove the result, in order
    pub triggers: Vec<String>,
    pub metadata: AnalysisMetadata,
}

impl ConversationAnalysis {
    /// Result for a bare classification, with empty triggers and metadata
    pub fn new(mode: Mode, confidence: f64) -> Self {
        Self {
            mode,
            confidence: confidence.clamp(0.0, 1.0),
            triggers: Vec::new(),
            metadata: AnalysisMetadata::default(),
        }
    }
}

/// A ranked alternative mode for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeSuggestion {
    pub mode: Mode,
    pub confidence: f64,
    pub icon: String,
    pub reason: String,
}

/// Stateless conversation classifier
#[derive(Debug, Clone, Default)]
pub struct ContextAnalyzer;

impl ContextAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Names of tools called in the last three messages, in order, deduplicated
    pub fn detect_tool_usage(&self, messages: &[Message]) -> Vec<String> {
        let mut tools = Vec::new();
        for message in tail(messages, TOOL_WINDOW) {
            for call in &message.tool_calls {
                if !tools.contains(&call.name) {
                    tools.push(call.name.clone());
                }
            }
        }
        tools
    }

    /// Confidence per mode, indexed by [`Mode::index`]
    pub fn calculate_all_mode_confidences(&self, messages: &[Message]) -> [f64; 10] {
        calculate_all_mode_confidences(messages)
    }

    /// Classify the conversation
    ///
    /// Recent tool calls force `tool`. Otherwise the highest-scoring mode wins;
    /// a tie for the top score or an all-zero result yields `assistant` with
    /// confidence 0.
    pub fn analyze_conversation(&self, messages: &[Message]) -> ConversationAnalysis {
        let metadata = self.metadata(messages);

        let tools = self.detect_tool_usage(messages);
        if !tools.is_empty() {
            return ConversationAnalysis {
                mode: Mode::Tool,
                confidence: TOOL_USAGE_CONFIDENCE,
                triggers: tools,
                metadata,
            };
        }

        let scores = calculate_all_mode_confidences(messages);
        let best = scores.iter().copied().fold(0.0_f64, f64::max);
        let leaders: Vec<Mode> = Mode::ALL
            .iter()
            .copied()
            .filter(|m| scores[m.index()] == best)
            .collect();

        let (mode, confidence) = match leaders.as_slice() {
            [single] if best > 0.0 => (*single, best),
            _ => (Mode::Assistant, 0.0),
        };

        let triggers = if confidence > 0.0 {
            self.triggers_for(mode, messages)
        } else {
            Vec::new()
        };

        ConversationAnalysis {
            mode,
            confidence,
            triggers,
            metadata,
        }
    }

    /// The `top_n` best modes other than `current_mode`, highest confidence first
    ///
    /// Always returns `min(top_n, 9)` entries; ties keep table order.
    pub fn get_suggested_modes(
        &self,
        messages: &[Message],
        current_mode: Mode,
        top_n: usize,
    ) -> Vec<ModeSuggestion> {
        let scores = calculate_all_mode_confidences(messages);
        let mut candidates: Vec<(Mode, f64)> = Mode::ALL
            .iter()
            .copied()
            .filter(|&m| m != current_mode)
            .map(|m| (m, scores[m.index()]))
            .collect();
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        candidates
            .into_iter()
            .take(top_n)
            .map(|(mode, confidence)| ModeSuggestion {
                mode,
                confidence,
                icon: ModeProfile::of(mode).icon.to_string(),
                reason: suggestion_reason(mode, confidence),
            })
            .collect()
    }

    fn triggers_for(&self, mode: Mode, messages: &[Message]) -> Vec<String> {
        let mut triggers = Vec::new();
        for message in scoring_window(messages) {
            for hit in keyword_hits(mode, &message.text_content()) {
                if !triggers.contains(&hit) {
                    triggers.push(hit);
                }
            }
        }
        triggers
    }

    fn metadata(&self, messages: &[Message]) -> AnalysisMetadata {
        let window = scoring_window(messages);
        let texts: Vec<String> = window.iter().map(|m| m.text_content()).collect();

        let mut keywords: Vec<String> = Vec::new();
        for text in &texts {
            for mode in Mode::ALL {
                for hit in keyword_hits(mode, text) {
                    if !keywords.contains(&hit) {
                        keywords.push(hit);
                    }
                }
            }
        }

        let mut tools_used: Vec<String> = Vec::new();
        for message in &window {
            for call in &message.tool_calls {
                if !tools_used.contains(&call.name) {
                    tools_used.push(call.name.clone());
                }
            }
        }

        AnalysisMetadata {
            keywords,
            tools_used,
            recent_topics: recent_topics(&window),
            code_blocks_present: texts.iter().any(|t| has_code_block(t)),
            error_messages_present: texts.iter().any(|t| has_error_line(t)),
        }
    }
}

/// First sentence of each of the last few user messages, oldest first
fn recent_topics(window: &[&Message]) -> Vec<String> {
    let users: Vec<&&Message> = window
        .iter()
        .filter(|m| m.role == MessageRole::User)
        .collect();
    let skip = users.len().saturating_sub(TOPIC_MESSAGES);

    users
        .into_iter()
        .skip(skip)
        .filter_map(|m| {
            let text = m.text_content();
            let sentence = text
                .split(['.', '?', '!', '\n'])
                .map(str::trim)
                .find(|s| !s.is_empty())?;
            Some(truncate_chars(sentence, TOPIC_MAX_CHARS))
        })
        .collect()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

fn suggestion_reason(mode: Mode, confidence: f64) -> String {
    let base = match mode {
        Mode::Assistant => "General conversation without specialized needs",
        Mode::Planning => "Planning and architecture discussion detected",
        Mode::Developer => "Code changes or implementation work detected",
        Mode::Tool => "Direct tool execution requested",
        Mode::Debugger => "Error messages or failures detected",
        Mode::Security => "Security concerns detected",
        Mode::Reviewer => "Code review or quality discussion detected",
        Mode::Performance => "Performance or optimization concerns detected",
        Mode::Prototype => "Experimentation or quick prototyping detected",
        Mode::Teacher => "Learning or explanation requested",
    };
    format!("{} ({:.0}% match)", base, confidence * 100.0)
}
