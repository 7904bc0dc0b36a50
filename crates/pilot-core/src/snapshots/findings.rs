//! Human-readable rendering of snapshot findings

use std::fmt::Write;

use super::types::TransitionSnapshot;
use crate::modes::{Mode, ModeProfile};

/// Render the findings of a snapshot for the mode that produced them
///
/// Returns `None` iff the snapshot carries no findings.
pub fn format_findings(snapshot: &TransitionSnapshot) -> Option<String> {
    let findings = snapshot.findings.as_ref()?;
    let profile = ModeProfile::of(snapshot.from_mode);

    let mut out = format!("## Findings from {} mode\n", profile.display_name);

    match snapshot.from_mode {
        Mode::Debugger => {
            push_list(&mut out, "Errors", &findings.errors);
            if let Some(root_cause) = &findings.root_cause {
                let _ = writeln!(out, "\n**Root cause:** {}", root_cause);
            }
            push_list(&mut out, "Fixes", &findings.fixes);
        }
        Mode::Security => {
            push_list(&mut out, "Vulnerabilities", &findings.vulnerabilities);
            push_list(&mut out, "Recommendations", &findings.recommendations);
        }
        Mode::Reviewer => {
            push_list(&mut out, "Issues", &findings.issues);
            push_list(&mut out, "Suggestions", &findings.suggestions);
        }
        Mode::Performance => {
            push_list(&mut out, "Bottlenecks", &findings.bottlenecks);
            push_list(&mut out, "Optimizations", &findings.optimizations);
        }
        _ => {
            push_list(&mut out, "Errors", &findings.errors);
            if let Some(root_cause) = &findings.root_cause {
                let _ = writeln!(out, "\n**Root cause:** {}", root_cause);
            }
            push_list(&mut out, "Fixes", &findings.fixes);
            push_list(&mut out, "Vulnerabilities", &findings.vulnerabilities);
            push_list(&mut out, "Recommendations", &findings.recommendations);
            push_list(&mut out, "Issues", &findings.issues);
            push_list(&mut out, "Suggestions", &findings.suggestions);
            push_list(&mut out, "Bottlenecks", &findings.bottlenecks);
            push_list(&mut out, "Optimizations", &findings.optimizations);
        }
    }
    push_list(&mut out, "Notes", &findings.notes);

    Some(out.trim_end().to_string())
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n### {}", title);
    for item in items {
        let _ = writeln!(out, "- {}", item);
    }
}
