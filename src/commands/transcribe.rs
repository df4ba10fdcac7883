//! Transcribe a pre-recorded audio file without recording.
//!
//! Accepts an audio file path and transcribes it using the configured
//! provider/model, reusing the same gateway pipeline as the `record` command.
//! The file is validated (existence, type, size) before anything is sent.

use crate::commands::{data_dir, deliver_output, load_transcription_config, open_review};
use crate::config;
use crate::history::HistoryManager;
use crate::transcription;
use std::path::PathBuf;

/// Handles transcription of a pre-recorded audio file.
///
/// # Arguments
/// * `file` - Path to the audio file to transcribe
/// * `clipboard` - If true, copy to clipboard instead of opening review
/// * `output_file` - Optional file path to write the text to instead
pub async fn handle_transcribe(
    file: PathBuf,
    clipboard: bool,
    output_file: Option<String>,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== medscribe Transcribe Command ===");

    // Reject bad payloads before loading anything else
    transcription::validate_audio_file(&file)?;

    tracing::info!("Transcribing file: {}", file.display());

    let config_data = config::MedscribeConfig::load().map_err(|err| {
        tracing::error!("Failed to load configuration: {err}");
        anyhow::anyhow!("Configuration error: {err}")
    })?;

    let transcription_config = load_transcription_config(&config_data.providers)?;

    tracing::debug!("Starting transcription...");
    let result = transcription::transcribe(&transcription_config, &file)
        .await
        .map_err(|e| {
            tracing::error!("Transcription failed: {e}");
            anyhow::anyhow!("Transcription failed: {e}")
        })?;

    tracing::debug!("Transcription completed: {} chars", result.text.len());

    let absolute = file.canonicalize().unwrap_or(file.clone());
    let mut history = HistoryManager::new(&data_dir()?)?;
    if let Err(e) = history.save_result(&result, Some(&absolute)) {
        tracing::warn!("Failed to save transcription to history: {}", e);
    }

    if !deliver_output(&result.text, clipboard, output_file.as_deref())? {
        let title = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "Transcription".to_string());
        open_review(&result, &absolute, title)?;
    }

    Ok(())
}
