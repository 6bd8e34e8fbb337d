//! lito configuration management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Ceiling for directly-entered text, in characters.
const DEFAULT_MAX_INPUT_CHARS: usize = 1500;
/// Ceiling for a single synthesis segment, in characters.
const DEFAULT_SEGMENT_CHARS: usize = 800;
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LitoConfig {
    /// Base URL of the speech service
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Voice to use when none is given on the command line
    #[serde(default)]
    pub default_voice: Option<String>,

    /// Maximum accepted length for direct text input
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,

    /// Maximum length of a single synthesis segment
    #[serde(default = "default_segment_chars")]
    pub segment_chars: usize,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

fn default_max_input_chars() -> usize {
    DEFAULT_MAX_INPUT_CHARS
}

fn default_segment_chars() -> usize {
    DEFAULT_SEGMENT_CHARS
}

impl Default for LitoConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            default_voice: None,
            max_input_chars: default_max_input_chars(),
            segment_chars: default_segment_chars(),
        }
    }
}

impl LitoConfig {
    /// Get the config file path: ~/.config/cli-programs/lito.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("lito.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: LitoConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }
}
