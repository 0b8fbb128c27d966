//! Configuration settings for Fortell.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub storage: StorageSettings,
    pub script: ScriptSettings,
    pub render: RenderSettings,
    pub prompts: PromptSettings,
}


/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Cloud storage settings for the recording upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Default bucket for uploads (can be overridden per command).
    pub bucket: Option<String>,
    /// Storage API endpoint. Also the host of the public object URLs.
    pub endpoint: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            bucket: None,
            endpoint: "https://storage.googleapis.com".to_string(),
        }
    }
}

/// Script generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptSettings {
    /// LLM model used to write the narration script.
    pub model: String,
    /// Language the narration should be written in.
    pub language: String,
}

impl Default for ScriptSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            language: "English".to_string(),
        }
    }
}

/// Render service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Base URL of the render API.
    pub base_url: String,
    /// Avatar used when none is given on the command line.
    pub avatar_id: String,
    /// Voice used when none is given on the command line.
    pub voice_id: String,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Submit jobs in test mode (watermarked, no credits spent).
    pub test_mode: bool,
    /// Seconds between status polls.
    pub poll_interval_seconds: u64,
    /// Seconds to wait after a transport error before polling again.
    pub error_backoff_seconds: u64,
    /// Total poll attempts before giving up on a job.
    pub max_poll_attempts: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.heygen.com".to_string(),
            avatar_id: "avatar-0qgz9jf0l6".to_string(),
            voice_id: "voice-1".to_string(),
            width: 1080,
            height: 1920,
            test_mode: false,
            poll_interval_seconds: 20,
            error_backoff_seconds: 30,
            max_poll_attempts: 10,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}


impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::FortellError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fortell")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_limits() {
        let settings = Settings::default();
        assert_eq!(settings.render.poll_interval_seconds, 20);
        assert_eq!(settings.render.max_poll_attempts, 10);
        assert_eq!(settings.render.width, 1080);
        assert_eq!(settings.render.height, 1920);
    }

    #[test]
    fn test_settings_roundtrip() {
        let mut settings = Settings::default();
        settings.storage.bucket = Some("demo-bucket".to_string());
        settings.render.test_mode = true;

        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.storage.bucket.as_deref(), Some("demo-bucket"));
        assert!(parsed.render.test_mode);
    }
}
