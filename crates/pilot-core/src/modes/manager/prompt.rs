//! Mode-specific prompt assembly

use std::fmt::Write;
use std::path::PathBuf;

use super::core::ModeManager;
use crate::modes::profile::ModeProfile;
use crate::modes::types::Mode;
use crate::types::ToolDescriptor;

/// Workspace summary included in prompts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    pub path: PathBuf,
    pub file_count: usize,
}

/// Inputs for [`ModeManager::build_prompt`]
#[derive(Debug, Clone)]
pub struct PromptRequest {
    pub mode: Mode,
    /// Full tool catalog; filtered by the mode's policy
    pub tools: Vec<ToolDescriptor>,
    /// Skill ids whose content is appended
    pub skills: Vec<String>,
    pub workspace: Option<WorkspaceInfo>,
    pub additional_instructions: Option<String>,
}

impl PromptRequest {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            tools: Vec::new(),
            skills: Vec::new(),
            workspace: None,
            additional_instructions: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_skills(mut self, skills: Vec<String>) -> Self {
        self.skills = skills;
        self
    }

    pub fn with_workspace(mut self, path: impl Into<PathBuf>, file_count: usize) -> Self {
        self.workspace = Some(WorkspaceInfo {
            path: path.into(),
            file_count,
        });
        self
    }

    pub fn with_additional_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.additional_instructions = Some(instructions.into());
        self
    }
}

impl ModeManager {
    /// Assemble the system prompt for a mode
    ///
    /// Sections, in order: base template, allowed tools, skill content,
    /// workspace summary, additional instructions. Unknown skills are skipped.
    pub fn build_prompt(&self, request: &PromptRequest) -> String {
        let mut sections: Vec<String> = Vec::new();

        let template = self
            .prompts
            .mode_template(request.mode)
            .unwrap_or_else(|| ModeProfile::of(request.mode).prompt_template.to_string());
        sections.push(template.trim_end().to_string());

        let tools = self.filter_tools_for_mode(&request.tools, request.mode);
        let mut tool_section = String::from("## Available Tools\n");
        if tools.is_empty() {
            tool_section.push_str("No tools are available in this mode.");
        } else {
            for tool in &tools {
                match &tool.description {
                    Some(description) => {
                        let _ = writeln!(tool_section, "- {}: {}", tool.name, description);
                    }
                    None => {
                        let _ = writeln!(tool_section, "- {}", tool.name);
                    }
                }
            }
        }
        sections.push(tool_section.trim_end().to_string());

        let skills: Vec<(String, String)> = request
            .skills
            .iter()
            .filter_map(|id| match self.prompts.skill_content(id) {
                Some(content) => Some((id.clone(), content)),
                None => {
                    tracing::debug!("Skill {} not registered, skipping", id);
                    None
                }
            })
            .collect();
        if !skills.is_empty() {
            let mut skill_section = String::from("## Active Skills");
            for (id, content) in skills {
                let _ = write!(skill_section, "\n\n### {}\n{}", id, content.trim_end());
            }
            sections.push(skill_section);
        }

        if let Some(workspace) = &request.workspace {
            sections.push(format!(
                "## Workspace\nPath: {}\nFiles: {}",
                workspace.path.display(),
                workspace.file_count
            ));
        }

        if let Some(instructions) = &request.additional_instructions {
            let instructions = instructions.trim();
            if !instructions.is_empty() {
                sections.push(format!("## Additional Instructions\n{}", instructions));
            }
        }

        sections.join("\n\n")
    }
}
