//! Transition snapshot types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modes::Mode;
use crate::types::{Message, MessageRole};

/// Most recent messages kept in a snapshot
pub const SNAPSHOT_MESSAGE_LIMIT: usize = 5;

/// Cache key: an ordered mode pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SnapshotKey {
    pub from: Mode,
    pub to: Mode,
}

impl SnapshotKey {
    pub fn new(from: Mode, to: Mode) -> Self {
        Self { from, to }
    }
}

impl std::fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{}", self.from, self.to)
    }
}

/// A message reduced to role and text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMessage {
    pub role: MessageRole,
    pub content: String,
}

impl From<&Message> for SnapshotMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role,
            content: message.text_content(),
        }
    }
}

/// Work products recorded against a snapshot, grouped by the mode that produced them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Findings {
    // debugger
    pub errors: Vec<String>,
    pub root_cause: Option<String>,
    pub fixes: Vec<String>,
    // security
    pub vulnerabilities: Vec<String>,
    pub recommendations: Vec<String>,
    // reviewer
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    // performance
    pub bottlenecks: Vec<String>,
    pub optimizations: Vec<String>,
    /// Anything else, shown for every mode
    pub notes: Vec<String>,
}

impl Findings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }

    pub fn with_root_cause(mut self, root_cause: impl Into<String>) -> Self {
        self.root_cause = Some(root_cause.into());
        self
    }

    pub fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fixes.push(fix.into());
        self
    }

    pub fn with_vulnerability(mut self, vulnerability: impl Into<String>) -> Self {
        self.vulnerabilities.push(vulnerability.into());
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendations.push(recommendation.into());
        self
    }

    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.issues.push(issue.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_bottleneck(mut self, bottleneck: impl Into<String>) -> Self {
        self.bottlenecks.push(bottleneck.into());
        self
    }

    pub fn with_optimization(mut self, optimization: impl Into<String>) -> Self {
        self.optimizations.push(optimization.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}

/// Recovery state captured at a mode transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionSnapshot {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub from_mode: Mode,
    pub to_mode: Mode,
    /// At most [`SNAPSHOT_MESSAGE_LIMIT`] entries, oldest first
    pub recent_messages: Vec<SnapshotMessage>,
    pub active_skills: Vec<String>,
    pub active_tools: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<Findings>,
}

impl TransitionSnapshot {
    pub fn key(&self) -> SnapshotKey {
        SnapshotKey::new(self.from_mode, self.to_mode)
    }
}

/// What the caller knows about the pre-switch state
#[derive(Debug, Clone, Default)]
pub struct SnapshotInput {
    pub messages: Vec<Message>,
    pub active_skills: Vec<String>,
    pub active_tools: Vec<String>,
    pub current_task: Option<String>,
    pub findings: Option<Findings>,
}

impl SnapshotInput {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_active_skills(mut self, skills: Vec<String>) -> Self {
        self.active_skills = skills;
        self
    }

    pub fn with_active_tools(mut self, tools: Vec<String>) -> Self {
        self.active_tools = tools;
        self
    }

    pub fn with_current_task(mut self, task: impl Into<String>) -> Self {
        self.current_task = Some(task.into());
        self
    }

    pub fn with_findings(mut self, findings: Findings) -> Self {
        self.findings = Some(findings);
        self
    }
}

/// Cache occupancy for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    /// Keys as `from->to`, sorted
    pub snapshots: Vec<String>,
}
