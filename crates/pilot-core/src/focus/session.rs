//! Focus session types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::modes::Mode;
use crate::time::to_std;

/// A timed lock on one mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSession {
    /// Locked mode
    pub mode: Mode,
    /// When the session started
    pub start_time: DateTime<Utc>,
    /// When the session expires; always after `start_time`
    pub end_time: DateTime<Utc>,
    /// Total length including extensions
    pub duration_minutes: u32,
    /// Whether the lock is still held
    pub active: bool,
}

impl FocusSession {
    pub(crate) fn new(mode: Mode, start_time: DateTime<Utc>, duration_minutes: u32) -> Self {
        Self {
            mode,
            start_time,
            end_time: start_time + chrono::Duration::minutes(i64::from(duration_minutes)),
            duration_minutes,
            active: true,
        }
    }

    /// Time left at `now`, clamped at zero
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        to_std(self.end_time - now)
    }

    /// Time elapsed since the start at `now`, clamped at zero
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        to_std(now - self.start_time)
    }
}

/// Why a focus session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusEndReason {
    /// Disabled by the user, or replaced by a new session
    Manual,
    /// The session ran out
    Timeout,
    /// The owning manager shut down
    Error,
}

impl std::fmt::Display for FocusEndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Timeout => write!(f, "timeout"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Snapshot of focus progress for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSessionStats {
    pub is_active: bool,
    pub mode: Option<Mode>,
    pub elapsed_minutes: f64,
    pub remaining_minutes: f64,
    pub total_minutes: u32,
    /// 0..=100
    pub percent_complete: f64,
}

impl FocusSessionStats {
    pub(crate) fn inactive() -> Self {
        Self {
            is_active: false,
            mode: None,
            elapsed_minutes: 0.0,
            remaining_minutes: 0.0,
            total_minutes: 0,
            percent_complete: 0.0,
        }
    }
}

/// Result of asking whether a switch is blocked by the focus lock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDecision {
    pub blocked: bool,
    pub reason: Option<String>,
}

impl BlockDecision {
    pub(crate) fn allowed() -> Self {
        Self {
            blocked: false,
            reason: None,
        }
    }

    pub(crate) fn blocked(reason: impl Into<String>) -> Self {
        Self {
            blocked: true,
            reason: Some(reason.into()),
        }
    }
}

/// Render a duration as `m:ss`
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
