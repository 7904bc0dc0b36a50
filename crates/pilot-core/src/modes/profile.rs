//! Static per-mode behavior table
//!
//! Tool policy, prompt template, display metadata and entry threshold for
//! every [`Mode`] live in one array indexed by the enum, so adding a mode is a
//! single table edit rather than a new trait implementation.

use super::types::Mode;

/// Tool access policy for a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAccess {
    /// Every tool is allowed
    All,
    /// No tool is allowed
    None,
    /// Deny patterns first, then allow patterns; unmatched tools are denied
    Patterns {
        allow: &'static [&'static str],
        deny: &'static [&'static str],
    },
}

impl ToolAccess {
    /// Check a tool name against this policy
    pub fn allows(&self, tool_name: &str) -> bool {
        match self {
            Self::All => true,
            Self::None => false,
            Self::Patterns { allow, deny } => {
                if deny.iter().any(|p| pattern_matches(p, tool_name)) {
                    return false;
                }
                allow.iter().any(|p| pattern_matches(p, tool_name))
            }
        }
    }

    /// Raw allow patterns, for display
    pub fn allow_patterns(&self) -> &'static [&'static str] {
        match self {
            Self::All => &["*"],
            Self::None => &[],
            Self::Patterns { allow, .. } => allow,
        }
    }

    /// Raw deny patterns, for display
    pub fn deny_patterns(&self) -> &'static [&'static str] {
        match self {
            Self::All => &[],
            Self::None => &["*"],
            Self::Patterns { deny, .. } => deny,
        }
    }
}

/// Match a tool name against `"name"` or `"prefix*"`, ignoring ASCII case
pub fn pattern_matches(pattern: &str, tool_name: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => {
            tool_name.len() >= prefix.len()
                && tool_name.is_char_boundary(prefix.len())
                && tool_name[..prefix.len()].eq_ignore_ascii_case(prefix)
        }
        None => pattern.eq_ignore_ascii_case(tool_name),
    }
}

/// Everything that varies per mode
#[derive(Debug, Clone, Copy)]
pub struct ModeProfile {
    pub mode: Mode,
    /// Human readable name
    pub display_name: &'static str,
    /// Badge icon
    pub icon: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Confidence required to auto-enter this mode; None uses the configured default
    pub entry_threshold: Option<f64>,
    /// Tool policy
    pub tools: ToolAccess,
    /// Base prompt template
    pub prompt_template: &'static str,
}

const READ_ONLY: &[&str] = &[
    "read_*", "list_*", "search_*", "grep*", "glob*", "find_*", "get_*",
];

static PROFILES: [ModeProfile; 10] = [
    ModeProfile {
        mode: Mode::Assistant,
        display_name: "Assistant",
        icon: "💬",
        description: "General conversation without tool access",
        entry_threshold: None,
        tools: ToolAccess::None,
        prompt_template: "You are a helpful local assistant. Answer clearly and concisely. \
You have no tool access in this mode; if a task needs tools, suggest switching modes.",
    },
    ModeProfile {
        mode: Mode::Planning,
        display_name: "Planning",
        icon: "🗺️",
        description: "Architecture, research and roadmaps with read-only tools",
        entry_threshold: None,
        tools: ToolAccess::Patterns {
            allow: &[
                "read_*", "list_*", "search_*", "grep*", "glob*", "find_*", "get_*", "web_*",
            ],
            deny: &["write_*", "edit_*", "delete_*", "create_*", "git_*", "run_*", "shell*"],
        },
        prompt_template: "You are in planning mode. Explore the codebase, research options, \
and produce a concrete, ordered implementation plan. Do not modify files.",
    },
    ModeProfile {
        mode: Mode::Developer,
        display_name: "Developer",
        icon: "👨‍💻",
        description: "Writing and changing code with full tool access",
        entry_threshold: None,
        tools: ToolAccess::All,
        prompt_template: "You are in developer mode. Implement the requested changes with \
small, verifiable steps. Follow the existing style of the codebase and keep changes minimal.",
    },
    ModeProfile {
        mode: Mode::Tool,
        display_name: "Tool",
        icon: "🔧",
        description: "Direct tool execution",
        entry_threshold: None,
        tools: ToolAccess::All,
        prompt_template: "You are in tool mode. Use the available tools to carry out the \
request directly and report results accurately.",
    },
    ModeProfile {
        mode: Mode::Debugger,
        display_name: "Debugger",
        icon: "🐛",
        description: "Reproducing, isolating and fixing failures",
        entry_threshold: Some(0.85),
        tools: ToolAccess::Patterns {
            allow: &[
                "read_*", "list_*", "search_*", "grep*", "glob*", "find_*", "get_*", "run_*",
                "shell*", "edit_*", "write_*", "git_status", "git_diff", "git_log",
            ],
            deny: &["delete_*", "git_push*", "git_reset*"],
        },
        prompt_template: "You are in debugger mode. Reproduce the failure, form hypotheses, \
isolate the root cause, then apply the smallest fix that resolves it. Report errors, root cause and fixes.",
    },
    ModeProfile {
        mode: Mode::Security,
        display_name: "Security",
        icon: "🔒",
        description: "Auditing for vulnerabilities with read-only tools",
        entry_threshold: Some(0.90),
        tools: ToolAccess::Patterns {
            allow: &[
                "read_*", "list_*", "search_*", "grep*", "glob*", "find_*", "get_*", "git_log",
                "git_diff",
            ],
            deny: &["write_*", "edit_*", "delete_*", "create_*", "run_*", "shell*", "web_*"],
        },
        prompt_template: "You are in security mode. Audit the code for vulnerabilities such as \
injection, XSS, CSRF, unsafe deserialization and secret leakage. Rate severity and recommend fixes.",
    },
    ModeProfile {
        mode: Mode::Reviewer,
        display_name: "Reviewer",
        icon: "👀",
        description: "Reviewing code quality without modifying it",
        entry_threshold: None,
        tools: ToolAccess::Patterns {
            allow: &[
                "read_*", "list_*", "search_*", "grep*", "glob*", "find_*", "get_*", "git_diff",
                "git_log", "git_status",
            ],
            deny: &["write_*", "edit_*", "delete_*", "create_*", "shell*", "git_commit*", "git_push*"],
        },
        prompt_template: "You are in reviewer mode. Review the changes for correctness, \
readability, test coverage and consistency. List issues by severity with concrete suggestions.",
    },
    ModeProfile {
        mode: Mode::Performance,
        display_name: "Performance",
        icon: "⚡",
        description: "Profiling and optimizing hot paths",
        entry_threshold: None,
        tools: ToolAccess::Patterns {
            allow: &[
                "read_*", "list_*", "search_*", "grep*", "glob*", "find_*", "get_*", "run_*",
                "shell*", "profile*", "benchmark*", "edit_*",
            ],
            deny: &["delete_*", "git_push*"],
        },
        prompt_template: "You are in performance mode. Measure before changing anything, \
identify bottlenecks, and propose optimizations with expected impact.",
    },
    ModeProfile {
        mode: Mode::Prototype,
        display_name: "Prototype",
        icon: "🧪",
        description: "Fast experiments and throwaway code",
        entry_threshold: None,
        tools: ToolAccess::Patterns {
            allow: &[
                "read_*", "list_*", "search_*", "grep*", "glob*", "find_*", "get_*", "write_*",
                "edit_*", "create_*", "run_*", "shell*",
            ],
            deny: &["git_*", "delete_*"],
        },
        prompt_template: "You are in prototype mode. Favor speed over polish: build the smallest \
thing that demonstrates the idea and note what would need hardening later.",
    },
    ModeProfile {
        mode: Mode::Teacher,
        display_name: "Teacher",
        icon: "🎓",
        description: "Explaining concepts step by step",
        entry_threshold: None,
        tools: ToolAccess::Patterns {
            allow: READ_ONLY,
            deny: &["write_*", "edit_*", "delete_*", "create_*", "run_*", "shell*", "git_*"],
        },
        prompt_template: "You are in teacher mode. Explain concepts step by step, check \
understanding with short questions, and use small examples.",
    },
];

/// Ordered pairs that step back to a less specialized mode and use a lowered threshold
const STEP_BACK_PAIRS: &[(Mode, Mode)] = &[
    (Mode::Developer, Mode::Planning),
    (Mode::Debugger, Mode::Developer),
    (Mode::Security, Mode::Developer),
    (Mode::Reviewer, Mode::Developer),
    (Mode::Performance, Mode::Developer),
    (Mode::Tool, Mode::Developer),
    (Mode::Planning, Mode::Assistant),
    (Mode::Teacher, Mode::Assistant),
    (Mode::Prototype, Mode::Planning),
];

/// Threshold for stepping back to a less specialized mode
pub const STEP_BACK_THRESHOLD: f64 = 0.60;

impl ModeProfile {
    /// Profile for a mode
    pub fn of(mode: Mode) -> &'static ModeProfile {
        &PROFILES[mode.index()]
    }

    /// All profiles in table order
    pub fn all() -> &'static [ModeProfile] {
        &PROFILES
    }
}

/// Confidence required for an automatic `from → to` switch
pub fn transition_threshold(from: Mode, to: Mode, default_threshold: f64) -> f64 {
    if STEP_BACK_PAIRS.contains(&(from, to)) {
        return STEP_BACK_THRESHOLD;
    }
    ModeProfile::of(to).entry_threshold.unwrap_or(default_threshold)
}
