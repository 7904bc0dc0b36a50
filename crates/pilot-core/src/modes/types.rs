//! Mode type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, VecDeque};

use crate::error::{PilotError, PilotResult};

/// Operational mode of the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// General conversation, no tools
    #[default]
    Assistant,
    /// Architecture, research and roadmaps
    Planning,
    /// Writing and changing code
    Developer,
    /// Driving external tools directly
    Tool,
    /// Investigating errors and failures
    Debugger,
    /// Auditing for vulnerabilities
    Security,
    /// Reviewing code quality
    Reviewer,
    /// Profiling and optimization
    Performance,
    /// Fast experiments and throwaway code
    Prototype,
    /// Explaining concepts step by step
    Teacher,
}

impl Mode {
    /// Every mode, in table order
    pub const ALL: [Mode; 10] = [
        Mode::Assistant,
        Mode::Planning,
        Mode::Developer,
        Mode::Tool,
        Mode::Debugger,
        Mode::Security,
        Mode::Reviewer,
        Mode::Performance,
        Mode::Prototype,
        Mode::Teacher,
    ];

    /// Index into per-mode tables
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase canonical name
    pub const fn as_str(self) -> &'static str {
        match self {
            Mode::Assistant => "assistant",
            Mode::Planning => "planning",
            Mode::Developer => "developer",
            Mode::Tool => "tool",
            Mode::Debugger => "debugger",
            Mode::Security => "security",
            Mode::Reviewer => "reviewer",
            Mode::Performance => "performance",
            Mode::Prototype => "prototype",
            Mode::Teacher => "teacher",
        }
    }

    /// Parse from string, accepting common aliases
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "assistant" | "chat" => Some(Self::Assistant),
            "planning" | "plan" | "planner" => Some(Self::Planning),
            "developer" | "dev" | "code" => Some(Self::Developer),
            "tool" | "tools" => Some(Self::Tool),
            "debugger" | "debug" => Some(Self::Debugger),
            "security" | "sec" => Some(Self::Security),
            "reviewer" | "review" => Some(Self::Reviewer),
            "performance" | "perf" => Some(Self::Performance),
            "prototype" | "proto" => Some(Self::Prototype),
            "teacher" | "teach" | "learn" => Some(Self::Teacher),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cause of a mode transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionTrigger {
    /// Accepted by the automatic classification gate
    Auto,
    /// User picked a mode
    Manual,
    /// User override; bypasses the focus lock
    Explicit,
    /// Driven by tool activity
    Tool,
}

impl std::fmt::Display for TransitionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Manual => write!(f, "manual"),
            Self::Explicit => write!(f, "explicit"),
            Self::Tool => write!(f, "tool"),
        }
    }
}

/// A completed mode transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeTransition {
    /// From mode
    pub from: Mode,
    /// To mode
    pub to: Mode,
    /// When the switch happened
    pub timestamp: DateTime<Utc>,
    /// What caused it
    pub trigger: TransitionTrigger,
    /// Classifier confidence (1.0 for user-driven switches)
    pub confidence: f64,
}

impl ModeTransition {
    /// Create a transition
    pub fn new(
        from: Mode,
        to: Mode,
        timestamp: DateTime<Utc>,
        trigger: TransitionTrigger,
        confidence: f64,
    ) -> Self {
        Self {
            from,
            to,
            timestamp,
            trigger,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Text form used for session persistence
    pub fn to_serializable(&self) -> SerializableTransition {
        SerializableTransition {
            from: self.from,
            to: self.to,
            timestamp: self.timestamp.to_rfc3339(),
            trigger: self.trigger,
            confidence: self.confidence,
        }
    }
}

/// Transition with its timestamp rendered as RFC 3339 text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializableTransition {
    pub from: Mode,
    pub to: Mode,
    pub timestamp: String,
    pub trigger: TransitionTrigger,
    pub confidence: f64,
}

impl TryFrom<&SerializableTransition> for ModeTransition {
    type Error = PilotError;

    fn try_from(value: &SerializableTransition) -> PilotResult<Self> {
        let timestamp = DateTime::parse_from_rfc3339(&value.timestamp)?.with_timezone(&Utc);
        Ok(ModeTransition::new(
            value.from,
            value.to,
            timestamp,
            value.trigger,
            value.confidence,
        ))
    }
}

/// Live state of the mode manager
#[derive(Debug, Clone)]
pub struct ModeState {
    /// Current mode
    pub current_mode: Mode,
    /// Mode before the last switch
    pub previous_mode: Option<Mode>,
    /// When the current mode was entered
    pub mode_entry_time: DateTime<Utc>,
    /// When the last switch happened (None before the first one)
    pub last_switch_time: Option<DateTime<Utc>>,
    /// Whether the automatic gate may switch modes
    pub auto_switch_enabled: bool,
    /// Transition history, oldest first
    pub history: VecDeque<ModeTransition>,
    /// Active skill ids
    pub active_skills: BTreeSet<String>,
}

impl ModeState {
    /// Initial state: assistant mode, empty history
    pub fn new(now: DateTime<Utc>, auto_switch_enabled: bool) -> Self {
        Self {
            current_mode: Mode::Assistant,
            previous_mode: None,
            mode_entry_time: now,
            last_switch_time: None,
            auto_switch_enabled,
            history: VecDeque::new(),
            active_skills: BTreeSet::new(),
        }
    }

    /// Append a transition, dropping the oldest entries beyond `limit`
    pub(crate) fn record(&mut self, transition: ModeTransition, limit: usize) {
        self.history.push_back(transition);
        while self.history.len() > limit {
            self.history.pop_front();
        }
    }

    /// Time spent in the current mode
    pub fn duration(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.mode_entry_time
    }
}
