//! Configuration file management for voxlog.
//!
//! This module handles loading and saving application configuration from TOML files.
//! Configuration is stored in the user's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Audio device to use. Options:
    /// - "default" for system default device
    /// - numeric index (0, 1, 2, etc.) from `voxlog list-devices`
    /// - device name from `voxlog list-devices`
    #[serde(default = "default_device")]
    pub device: String,
    /// Recording sample rate in Hz (16000 recommended for speech recognition)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    /// Reference level in dBFS for full-scale spectrum display (typical: -20 to -6 dBFS)
    #[serde(default = "default_reference_level_db")]
    pub reference_level_db: i8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            device: default_device(),
            sample_rate: default_sample_rate(),
            reference_level_db: default_reference_level_db(),
        }
    }
}

fn default_device() -> String {
    "default".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_reference_level_db() -> i8 {
    -20
}

/// Transcription webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Webhook URL that receives the audio and returns the transcription
    #[serde(default = "default_webhook_url")]
    pub url: String,
    /// Multipart field name the audio file is attached under
    #[serde(default = "default_file_field")]
    pub file_field: String,
    /// Filename hint sent with the upload (extension is advisory only)
    #[serde(default = "default_file_name")]
    pub file_name: String,
    /// Request timeout in seconds; an in-flight upload is not otherwise cancellable
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: default_webhook_url(),
            file_field: default_file_field(),
            file_name: default_file_name(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_webhook_url() -> String {
    "https://n8n.srv965433.hstgr.cloud/webhook/d6809865-6310-4416-a351-3e14de3540cf".to_string()
}

fn default_file_field() -> String {
    "file".to_string()
}

fn default_file_name() -> String {
    "recording.wav".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Interface behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Milliseconds between typewriter characters when revealing a transcription
    #[serde(default = "default_typewriter_interval_ms")]
    pub typewriter_interval_ms: u64,
    /// Whether to play notification tones (start/stop/keystroke)
    #[serde(default = "default_sounds")]
    pub sounds: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            typewriter_interval_ms: default_typewriter_interval_ms(),
            sounds: default_sounds(),
        }
    }
}

fn default_typewriter_interval_ms() -> u64 {
    40
}

fn default_sounds() -> bool {
    true
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoxlogConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl VoxlogConfig {
    /// Loads configuration from the user's config directory, writing the
    /// defaults on first run.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the config file exists but cannot be read or parsed
    pub fn load_or_create() -> anyhow::Result<Self> {
        let config_path = config_path()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            tracing::info!("Default configuration written to {}", config_path.display());
            return Ok(config);
        }

        let config_content = fs::read_to_string(&config_path)?;
        let config: VoxlogConfig = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Saves configuration to the user's config directory.
    ///
    /// # Errors
    /// - If the config directory cannot be determined or created
    /// - If the file cannot be written
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = config_path()?;
        let config_content = toml::to_string_pretty(self)?;
        fs::write(&config_path, config_content)?;
        tracing::info!("Configuration saved");
        Ok(())
    }
}

/// Retrieves the path to the config file, creating the directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn config_path() -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
    let config_path = home.join(".config").join("voxlog").join("voxlog.toml");

    std::fs::create_dir_all(config_path.parent().unwrap())?;

    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config: VoxlogConfig = toml::from_str("").unwrap();
        assert_eq!(config.audio.device, "default");
        assert_eq!(config.audio.sample_rate, 16000);
        assert_eq!(config.webhook.file_field, "file");
        assert_eq!(config.webhook.file_name, "recording.wav");
        assert_eq!(config.webhook.timeout_secs, 60);
        assert_eq!(config.ui.typewriter_interval_ms, 40);
        assert!(config.ui.sounds);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let config: VoxlogConfig = toml::from_str(
            r#"
            [webhook]
            url = "https://example.com/hook"
            timeout_secs = 10

            [ui]
            sounds = false
            "#,
        )
        .unwrap();
        assert_eq!(config.webhook.url, "https://example.com/hook");
        assert_eq!(config.webhook.timeout_secs, 10);
        assert!(!config.ui.sounds);
        assert_eq!(config.audio.sample_rate, 16000);
    }

    #[test]
    fn test_config_round_trip() {
        let config = VoxlogConfig::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: VoxlogConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.webhook.url, config.webhook.url);
        assert_eq!(parsed.audio.reference_level_db, -20);
    }
}
