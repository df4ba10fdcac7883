//! Retry transcription of a retained recording without re-recording audio.
//!
//! Useful when transcription failed due to network issues, API key problems,
//! or to re-run a dictation against a different model.

use crate::commands::{data_dir, deliver_output, load_transcription_config, open_review};
use crate::config;
use crate::history::HistoryManager;
use crate::recording::RecordingHistory;
use crate::transcription;

/// Retries transcription of a retained recording.
///
/// # Arguments
/// * `recording_index` - Recording to retry (1 = most recent, None = most recent)
pub async fn handle_retry(
    recording_index: Option<usize>,
    clipboard: bool,
    output_file: Option<String>,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== medscribe Retry Command ===");

    let recording_history = RecordingHistory::new(&data_dir()?)?;
    let all_recordings = recording_history.get_all_recordings()?;

    if all_recordings.is_empty() {
        return Err(anyhow::anyhow!("No recordings found in history"));
    }

    let index = recording_index.unwrap_or(1);
    if index < 1 || index > all_recordings.len() {
        return Err(anyhow::anyhow!(
            "Recording index out of range. Available recordings: 1-{}",
            all_recordings.len()
        ));
    }

    let recording = &all_recordings[index - 1];
    let audio_path = &recording.audio_path;

    if !audio_path.exists() {
        return Err(anyhow::anyhow!(
            "Audio file not found: {}",
            audio_path.display()
        ));
    }

    tracing::info!("Retrying transcription for recording #{}", index);

    let config_data = config::MedscribeConfig::load().map_err(|err| {
        tracing::error!("Failed to load configuration: {err}");
        anyhow::anyhow!("Configuration error: {err}")
    })?;

    let transcription_config = load_transcription_config(&config_data.providers)?;

    tracing::debug!("Starting transcription for retry...");
    let result = transcription::transcribe(&transcription_config, audio_path)
        .await
        .map_err(|e| {
            tracing::error!("Retry transcription failed: {e}");
            anyhow::anyhow!("Transcription failed: {e}")
        })?;

    let mut history = HistoryManager::new(&data_dir()?)?;
    if let Err(e) = history.save_result(&result, Some(audio_path)) {
        tracing::warn!("Failed to save transcription to history: {}", e);
    }

    if !deliver_output(&result.text, clipboard, output_file.as_deref())? {
        let title = format!(
            "Dictation {} (retry)",
            recording.created_at.format("%Y-%m-%d %H:%M")
        );
        open_review(&result, audio_path, title)?;
    }

    Ok(())
}
