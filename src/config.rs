//! Highlighter configuration
//!
//! Preferences are read from `~/.config/ftml-highlight/config.yaml`

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::syntax::scheduler::{clamp_parse_delay, DEFAULT_PARSE_DELAY_MS};

/// Failures reading or writing configuration and theme files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no config directory available")]
    NoConfigDir,

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid color {0:?}")]
    Color(String),

    #[error("unknown theme id: {0}")]
    UnknownTheme(String),
}

/// Highlighter settings read at startup
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HighlighterConfig {
    /// Show error overlays and publish error-list changes
    pub error_highlighting: bool,
    /// Debounce window for the diagnostics parse
    pub parse_delay_ms: u64,
    /// Run the debounced diagnostics parse after edits
    pub auto_parse_enabled: bool,
    /// Selected theme id (e.g., "default-dark", "default-light")
    pub theme: String,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            error_highlighting: true,
            parse_delay_ms: DEFAULT_PARSE_DELAY_MS,
            auto_parse_enabled: true,
            theme: "default-dark".to_string(),
        }
    }
}

impl HighlighterConfig {
    /// Load config from the user config dir, or return defaults if missing or broken
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

        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load config from an explicit path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_yaml::from_str(&content)?;
        config.parse_delay_ms = clamp_parse_delay(config.parse_delay_ms);
        Ok(config)
    }

    /// Set the parse delay, applying the minimum
    pub fn set_parse_delay(&mut self, delay_ms: u64) {
        self.parse_delay_ms = clamp_parse_delay(delay_ms);
    }
}
