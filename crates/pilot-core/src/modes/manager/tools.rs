//! Tool filtering

use super::core::ModeManager;
use crate::modes::profile::ModeProfile;
use crate::modes::types::Mode;
use crate::types::ToolDescriptor;

impl ModeManager {
    /// Check a tool against a mode's policy
    pub fn is_tool_allowed(&self, tool_name: &str, mode: Mode) -> bool {
        ModeProfile::of(mode).tools.allows(tool_name)
    }

    /// Check a tool against the current mode's policy
    pub fn is_tool_allowed_now(&self, tool_name: &str) -> bool {
        self.is_tool_allowed(tool_name, self.get_current_mode())
    }

    /// Tools usable in `mode`, in input order
    pub fn filter_tools_for_mode(&self, tools: &[ToolDescriptor], mode: Mode) -> Vec<ToolDescriptor> {
        tools
            .iter()
            .filter(|t| self.is_tool_allowed(&t.name, mode))
            .cloned()
            .collect()
    }

    /// Raw allow patterns of a mode, for display
    pub fn get_allowed_tools(&self, mode: Mode) -> Vec<String> {
        ModeProfile::of(mode)
            .tools
            .allow_patterns()
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    /// Raw deny patterns of a mode, for display
    pub fn get_denied_tools(&self, mode: Mode) -> Vec<String> {
        ModeProfile::of(mode)
            .tools
            .deny_patterns()
            .iter()
            .map(|p| p.to_string())
            .collect()
    }
}
