use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chat-list")
}

fn config_path() -> PathBuf {
    config_dir().join("list.json")
}

// ---------------------------------------------------------------------------
// List presentation config
// ---------------------------------------------------------------------------

/// Persisted presentation knobs for the conversation list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Unread counts above this render the badge compact. Default 99.
    pub unread_badge_cap: u32,
    /// Preview text is truncated to this many chars. Default 120.
    pub preview_max_chars: usize,
    /// Split-pane hosts re-open the first conversation after edits.
    pub open_first_after_edit: bool,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            unread_badge_cap: 99,
            preview_max_chars: 120,
            open_first_after_edit: false,
        }
    }
}

impl ListConfig {
    /// Load from disk, then overlay environment variables.
    pub fn resolve() -> Self {
        Self::load().with_env_overrides()
    }

    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = fs::read_to_string(path) {
            match serde_json::from_str::<ListConfig>(&data) {
                Ok(cfg) => return cfg.clamped(),
                Err(e) => log::warn!("Ignoring malformed list config {}: {}", path.display(), e),
            }
        }
        Self::default()
    }

    pub fn save(&self) {
        self.save_to(&config_path());
    }

    pub fn save_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Ok(data) = serde_json::to_string_pretty(self) {
            if let Err(e) = fs::write(path, data) {
                log::warn!("Failed to write list config: {}", e);
            }
        }
    }

    fn clamped(self) -> Self {
        ListConfig {
            unread_badge_cap: self.unread_badge_cap.clamp(9, 999),
            preview_max_chars: self.preview_max_chars.clamp(16, 1024),
            open_first_after_edit: self.open_first_after_edit,
        }
    }

    fn with_env_overrides(self) -> Self {
        self.apply_overrides(
            std::env::var("CHAT_LIST_BADGE_CAP").ok().as_deref(),
            std::env::var("CHAT_LIST_OPEN_FIRST").ok().as_deref(),
        )
    }

    fn apply_overrides(mut self, badge_cap: Option<&str>, open_first: Option<&str>) -> Self {
        if let Some(cap) = badge_cap.and_then(|v| v.trim().parse().ok()) {
            self.unread_badge_cap = cap;
        }
        if let Some(v) = open_first {
            self.open_first_after_edit = v == "true" || v == "1";
        }
        self.clamped()
    }
}
