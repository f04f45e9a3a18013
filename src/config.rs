//! Application configuration persistence
//!
//! Stores user preferences in `~/.config/markweave/config.yaml`

use serde::{Deserialize, Serialize};

use crate::model::output::Format;
use crate::model::preview::ViewportPreset;

/// Configuration that persists across sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Upper bound on how long the preview loading state waits for the
    /// sandbox ready signal before clearing itself (milliseconds)
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// Debounce window the injected bridge uses to coalesce rapid text
    /// mutations into one content report (milliseconds)
    #[serde(default = "default_content_debounce_ms")]
    pub content_debounce_ms: u64,

    /// Format preselected in the generate dropdown
    #[serde(default)]
    pub default_format: Format,

    /// Viewport preset applied when the preview first opens
    #[serde(default)]
    pub default_viewport: ViewportPreset,
}

fn default_ready_timeout_ms() -> u64 {
    5_000
}

fn default_content_debounce_ms() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ready_timeout_ms: default_ready_timeout_ms(),
            content_debounce_ms: default_content_debounce_ms(),
            default_format: Format::default(),
            default_viewport: ViewportPreset::default(),
        }
    }
}

impl AppConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = crate::config_paths::config_file()
            .ok_or_else(|| "No config directory available".to_string())?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(&path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }
}
