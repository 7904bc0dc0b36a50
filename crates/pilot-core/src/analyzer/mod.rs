//! Context analyzer
//!
//! Classifies a conversation into a [`Mode`](crate::modes::Mode) with a
//! confidence score. Pure: it takes the full message list on every call and
//! never fails; empty or non-textual input degrades to `assistant` with
//! confidence 0.

mod detector;
mod keywords;
mod scoring;

#[cfg(test)]
mod tests;

pub use detector::{
    AnalysisMetadata, ContextAnalyzer, ConversationAnalysis, ModeSuggestion, TOOL_USAGE_CONFIDENCE,
    TOOL_WINDOW,
};
pub use keywords::{KeywordMatch, detect_keywords, keywords_for};
pub use scoring::{SCORING_WINDOW, calculate_all_mode_confidences};
