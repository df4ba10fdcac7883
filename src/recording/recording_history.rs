//! Retention of recent recordings for retry and re-review.
//!
//! Keeps the encoded audio of the last few dictations plus a JSON metadata
//! sidecar per recording, so a failed transcription can be retried without
//! recapturing audio. Older recordings (audio and metadata) are deleted to
//! bound disk usage.

use anyhow::Result;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Number of recordings retained before the oldest is deleted.
const MAX_RECORDINGS: usize = 10;

/// Metadata about a retained recording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingMetadata {
    /// Unique identifier for this recording session
    pub id: String,
    /// Path to the encoded audio file
    pub audio_path: PathBuf,
    /// Model used for transcription, when one ran
    pub model_id: Option<String>,
    /// Audio duration in seconds, when known
    #[serde(default)]
    pub duration: Option<f64>,
    /// Timestamp when the recording was created
    pub created_at: DateTime<Local>,
}

/// Manages the on-disk recording retention directory.
pub struct RecordingHistory {
    history_dir: PathBuf,
}

impl RecordingHistory {
    /// Creates a retention manager rooted in the given data directory.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let history_dir = data_dir.join("recordings");
        fs::create_dir_all(&history_dir)?;
        Ok(Self { history_dir })
    }

    /// Records metadata for a new recording, evicting the oldest entry when
    /// the retention limit is reached.
    pub fn save_recording(
        &self,
        audio_path: PathBuf,
        model_id: Option<String>,
        duration: Option<f64>,
    ) -> Result<String> {
        self.evict_oldest_if_full()?;

        let now = Local::now();
        let recording_id = now.timestamp_millis().to_string();
        let metadata = RecordingMetadata {
            id: recording_id.clone(),
            audio_path,
            model_id,
            duration,
            created_at: now,
        };

        let metadata_path = self.history_dir.join(format!("{recording_id}.json"));
        fs::write(metadata_path, serde_json::to_string_pretty(&metadata)?)?;
        tracing::info!("Recording metadata saved with ID: {}", recording_id);

        Ok(recording_id)
    }

    /// Retrieves all recordings ordered by most recent first.
    pub fn get_all_recordings(&self) -> Result<Vec<RecordingMetadata>> {
        let mut recordings = self.load_all()?;
        recordings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recordings)
    }

    /// Reads every parseable metadata sidecar in the retention directory.
    fn load_all(&self) -> Result<Vec<RecordingMetadata>> {
        let entries = fs::read_dir(&self.history_dir)?;
        Ok(entries
            .filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension().is_some_and(|ext| ext == "json") {
                    let content = fs::read_to_string(&path).ok()?;
                    serde_json::from_str(&content).ok()
                } else {
                    None
                }
            })
            .collect())
    }

    /// Deletes the oldest recording (audio and metadata) when the directory
    /// is at capacity.
    fn evict_oldest_if_full(&self) -> Result<()> {
        let mut recordings = self.load_all()?;
        if recordings.len() < MAX_RECORDINGS {
            return Ok(());
        }

        recordings.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        let oldest = &recordings[0];

        if oldest.audio_path.exists() {
            if let Err(e) = fs::remove_file(&oldest.audio_path) {
                tracing::warn!("Failed to delete old recording audio: {}", e);
            } else {
                tracing::info!(
                    "Deleted old recording audio: {}",
                    oldest.audio_path.display()
                );
            }
        }

        let metadata_path = self.history_dir.join(format!("{}.json", oldest.id));
        if let Err(e) = fs::remove_file(&metadata_path) {
            tracing::warn!("Failed to delete old recording metadata: {}", e);
        }

        Ok(())
    }
}
