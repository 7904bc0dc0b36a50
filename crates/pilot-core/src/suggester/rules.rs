//! Suggestion rules, highest priority first

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::context::ConversationContext;
use crate::modes::Mode;

/// Time in planning after which implementation is suggested
pub const PLANNING_DWELL: Duration = Duration::from_secs(5 * 60);

/// A proposed mode change shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub suggested_mode: Mode,
    pub confidence: f64,
    pub reason: String,
    /// The host may switch without asking
    pub auto_switch: bool,
}

pub(crate) struct Rule {
    pub matches: fn(&ConversationContext) -> bool,
    pub mode: Mode,
    pub confidence: f64,
    pub auto_switch: bool,
    pub reason: &'static str,
}

pub(crate) static RULES: &[Rule] = &[
    Rule {
        matches: |c| c.current_mode == Mode::Developer && c.error_count >= 2,
        mode: Mode::Debugger,
        confidence: 0.90,
        auto_switch: true,
        reason: "Multiple errors detected; debugger mode can help isolate the root cause",
    },
    Rule {
        matches: |c| c.current_mode == Mode::Developer && c.error_count == 1,
        mode: Mode::Debugger,
        confidence: 0.75,
        auto_switch: false,
        reason: "An error was detected; consider debugger mode to investigate",
    },
    Rule {
        matches: |c| c.current_mode != Mode::Security && c.has_security_keywords,
        mode: Mode::Security,
        confidence: 0.85,
        auto_switch: false,
        reason: "Security topics detected; security mode enables a focused audit",
    },
    Rule {
        matches: |c| c.current_mode != Mode::Performance && c.has_performance_keywords,
        mode: Mode::Performance,
        confidence: 0.80,
        auto_switch: false,
        reason: "Performance concerns detected; performance mode focuses on profiling and optimization",
    },
    Rule {
        matches: |c| c.current_mode == Mode::Developer && c.has_review_keywords,
        mode: Mode::Reviewer,
        confidence: 0.80,
        auto_switch: false,
        reason: "Review requested; reviewer mode focuses on code quality",
    },
    Rule {
        matches: |c| c.current_mode == Mode::Assistant && c.has_technical_terms,
        mode: Mode::Planning,
        confidence: 0.75,
        auto_switch: false,
        reason: "Technical discussion detected; planning mode helps structure the approach",
    },
    Rule {
        matches: |c| c.current_mode == Mode::Planning && c.plan_complete,
        mode: Mode::Developer,
        confidence: 0.85,
        auto_switch: false,
        reason: "The plan looks complete; developer mode can start implementing it",
    },
    Rule {
        matches: |c| c.current_mode == Mode::Planning && c.time_in_mode > PLANNING_DWELL,
        mode: Mode::Developer,
        confidence: 0.70,
        auto_switch: false,
        reason: "You have been planning for a while; consider moving to implementation",
    },
    Rule {
        matches: |c| c.current_mode != Mode::Prototype && c.has_experiment_keywords,
        mode: Mode::Prototype,
        confidence: 0.75,
        auto_switch: false,
        reason: "Experimentation detected; prototype mode favors fast iteration",
    },
    Rule {
        matches: |c| c.current_mode == Mode::Assistant && c.is_learning_question,
        mode: Mode::Teacher,
        confidence: 0.70,
        auto_switch: false,
        reason: "Learning question detected; teacher mode explains concepts step by step",
    },
];

impl Rule {
    pub fn suggestion(&self) -> Suggestion {
        Suggestion {
            suggested_mode: self.mode,
            confidence: self.confidence,
            reason: self.reason.to_string(),
            auto_switch: self.auto_switch,
        }
    }
}
