//! Prompt and skill registry
//!
//! The mode manager reads base templates and skill bodies through the
//! [`PromptSource`] port. [`PromptRegistry`] is the in-process implementation,
//! seeded from the static mode profiles.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::modes::{Mode, ModeProfile};

/// Read-only lookup of prompt material
pub trait PromptSource: Send + Sync {
    /// Base template for a mode
    fn mode_template(&self, mode: Mode) -> Option<String>;

    /// Content of a skill by id
    fn skill_content(&self, skill_id: &str) -> Option<String>;
}

/// Shared prompt source handle
pub type SharedPromptSource = Arc<dyn PromptSource>;

/// In-memory registry of mode templates and skills
#[derive(Debug, Default)]
pub struct PromptRegistry {
    templates: RwLock<HashMap<Mode, String>>,
    skills: RwLock<HashMap<String, String>>,
}

impl PromptRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the builtin template for every mode
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        for profile in ModeProfile::all() {
            registry.set_template(profile.mode, profile.prompt_template);
        }
        registry
    }

    /// Replace the template for a mode
    pub fn set_template(&self, mode: Mode, template: impl Into<String>) {
        self.templates.write().insert(mode, template.into());
    }

    /// Register (or replace) a skill
    pub fn register_skill(&self, id: impl Into<String>, content: impl Into<String>) {
        let id = id.into();
        tracing::debug!("Registered skill: {}", id);
        self.skills.write().insert(id, content.into());
    }

    /// Remove a skill, returning whether it existed
    pub fn unregister_skill(&self, id: &str) -> bool {
        self.skills.write().remove(id).is_some()
    }

    /// Registered skill ids, sorted
    pub fn skill_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.skills.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Wrap in an Arc for sharing
    pub fn shared(self) -> SharedPromptSource {
        Arc::new(self)
    }
}

impl PromptSource for PromptRegistry {
    fn mode_template(&self, mode: Mode) -> Option<String> {
        self.templates.read().get(&mode).cloned()
    }

    fn skill_content(&self, skill_id: &str) -> Option<String> {
        self.skills.read().get(skill_id).cloned()
    }
}
