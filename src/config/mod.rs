//! Configuration management for voxlog.
//!
//! This module handles loading and saving application configuration from TOML
//! files stored in the user's config directory.

pub mod file;

pub use file::{config_path, AudioConfig, UiConfig, VoxlogConfig, WebhookConfig};
