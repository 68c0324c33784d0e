//! Prompt text, loaded once per process by key.
//!
//! Each key maps to `<dir>/<key>.md`. Missing files fall back to the built-in
//! copy compiled from the repository's `prompts/` directory.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptKey {
    ToolSelector,
    ModeSelector,
    Explain,
    Draft,
    DraftDecider,
    Referral,
    ReferralDecider,
}

impl PromptKey {
    pub const ALL: [PromptKey; 7] = [
        PromptKey::ToolSelector,
        PromptKey::ModeSelector,
        PromptKey::Explain,
        PromptKey::Draft,
        PromptKey::DraftDecider,
        PromptKey::Referral,
        PromptKey::ReferralDecider,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKey::ToolSelector => "tool_selector",
            PromptKey::ModeSelector => "mode_selector",
            PromptKey::Explain => "explain",
            PromptKey::Draft => "draft",
            PromptKey::DraftDecider => "draft_decider",
            PromptKey::Referral => "referral",
            PromptKey::ReferralDecider => "referral_decider",
        }
    }

    fn builtin(&self) -> &'static str {
        match self {
            PromptKey::ToolSelector => include_str!("../../prompts/tool_selector.md"),
            PromptKey::ModeSelector => include_str!("../../prompts/mode_selector.md"),
            PromptKey::Explain => include_str!("../../prompts/explain.md"),
            PromptKey::Draft => include_str!("../../prompts/draft.md"),
            PromptKey::DraftDecider => include_str!("../../prompts/draft_decider.md"),
            PromptKey::Referral => include_str!("../../prompts/referral.md"),
            PromptKey::ReferralDecider => include_str!("../../prompts/referral_decider.md"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PromptStore {
    prompts: HashMap<PromptKey, String>,
}

impl PromptStore {
    pub fn builtin() -> Self {
        Self {
            prompts: PromptKey::ALL
                .iter()
                .map(|k| (*k, k.builtin().trim().to_string()))
                .collect(),
        }
    }

    /// Load overrides from `dir`, keeping the built-in text for absent keys
    pub fn load(dir: &Path) -> Self {
        let mut store = Self::builtin();
        let mut overridden = 0;

        for key in PromptKey::ALL {
            let path = dir.join(format!("{}.md", key.as_str()));
            match std::fs::read_to_string(&path) {
                Ok(text) if !text.trim().is_empty() => {
                    store.prompts.insert(key, text.trim().to_string());
                    overridden += 1;
                }
                Ok(_) => warn!(path = %path.display(), "Prompt file is empty, using built-in text"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(path = %path.display(), "No prompt override")
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to read prompt file"),
            }
        }

        info!(dir = %dir.display(), overridden, "Prompts loaded");
        store
    }

    pub fn with(mut self, key: PromptKey, text: impl Into<String>) -> Self {
        self.prompts.insert(key, text.into());
        self
    }

    pub fn get(&self, key: PromptKey) -> &str {
        self.prompts.get(&key).map(String::as_str).unwrap_or_default()
    }
}

impl Default for PromptStore {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_prompts_present() {
        let store = PromptStore::builtin();
        for key in PromptKey::ALL {
            assert!(!store.get(key).is_empty(), "missing prompt {}", key.as_str());
        }
        assert!(store.get(PromptKey::DraftDecider).contains("NO_DRAFT"));
        assert!(store.get(PromptKey::ReferralDecider).contains("NO_TOOL"));
    }

    #[test]
    fn test_load_overrides_from_dir() {
        let dir = std::env::temp_dir().join(format!("prompts-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("explain.md"), "Custom explain prompt\n").unwrap();

        let store = PromptStore::load(&dir);
        assert_eq!(store.get(PromptKey::Explain), "Custom explain prompt");
        assert_eq!(
            store.get(PromptKey::Draft),
            PromptStore::builtin().get(PromptKey::Draft)
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_dir_falls_back() {
        let store = PromptStore::load(Path::new("/definitely/not/here"));
        assert!(store.get(PromptKey::Referral).contains("referral"));
    }
}
