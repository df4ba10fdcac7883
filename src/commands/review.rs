//! Re-open a saved transcription in the playback review view.

use crate::commands::{data_dir, open_review};
use crate::history::{HistoryManager, TranscriptionEntry};

/// Opens a saved transcription (1 = most recent) for playback review.
///
/// # Errors
/// - If the history is empty or the index is out of range
/// - If the entry has no stored result or its audio is gone
pub async fn handle_review(entry_index: Option<usize>) -> Result<(), anyhow::Error> {
    tracing::info!("=== medscribe Review Command ===");

    let mut history = HistoryManager::new(&data_dir()?)?;
    let entries = history.get_all_transcriptions()?;

    if entries.is_empty() {
        return Err(anyhow::anyhow!("No transcriptions found in history"));
    }

    let index = entry_index.unwrap_or(1);
    if index < 1 || index > entries.len() {
        return Err(anyhow::anyhow!(
            "Transcription index out of range. Available transcriptions: 1-{}",
            entries.len()
        ));
    }

    open_entry(&entries[index - 1])
}

/// Opens a specific history entry in the review view.
pub fn open_entry(entry: &TranscriptionEntry) -> Result<(), anyhow::Error> {
    let result = entry.result.as_ref().ok_or_else(|| {
        anyhow::anyhow!("This transcription has no stored timing data to review")
    })?;

    let audio_path = entry
        .audio_path
        .as_ref()
        .filter(|p| p.exists())
        .ok_or_else(|| {
            anyhow::anyhow!(
                "The audio for this transcription is no longer available. \
                 Recordings are retained for the 10 most recent dictations."
            )
        })?;

    tracing::info!(
        "Reviewing transcription #{} from {}",
        entry.id,
        entry.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    let title = format!(
        "Dictation {}",
        entry.created_at.format("%Y-%m-%d %H:%M")
    );
    open_review(result, audio_path, title)
}
