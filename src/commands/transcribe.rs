//! Transcribe a pre-recorded audio file without recording.
//!
//! Accepts an audio file path and sends it through the same webhook pipeline
//! as the `record` command, printing the result to stdout.

use std::path::{Path, PathBuf};

use crate::config::VoxlogConfig;
use crate::history::HistoryStore;
use crate::upload::WebhookClient;

/// Handles transcription of a pre-recorded audio file.
///
/// Uploads the given audio file to the configured webhook, appends the
/// result to history, and prints it to stdout.
///
/// # Errors
/// - If the file does not exist or cannot be read
/// - If the upload fails
pub async fn handle_transcribe(
    file: PathBuf,
    config: &VoxlogConfig,
    data_dir: &Path,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== voxlog transcribe command ===");

    if !file.exists() {
        return Err(anyhow::anyhow!("Audio file not found: {}", file.display()));
    }

    tracing::info!("Transcribing file: {}", file.display());

    let payload = std::fs::read(&file)
        .map_err(|e| anyhow::anyhow!("Failed to read '{}': {e}", file.display()))?;

    let client = WebhookClient::new(&config.webhook)?;
    let text = client.send(payload).await.map_err(|e| {
        tracing::error!("Transcription failed: {e}");
        anyhow::anyhow!("Transcription failed: {e}")
    })?;

    let trimmed_text = text.trim().to_string();
    tracing::debug!("Transcription completed: {} characters", trimmed_text.len());

    let mut store = HistoryStore::open(data_dir)?;
    if let Err(e) = store.append(&trimmed_text) {
        tracing::warn!("Failed to save transcription to history: {}", e);
    }

    println!("{trimmed_text}");
    Ok(())
}
