//! Transcription history storage and retrieval using SQLite.
//!
//! Manages persistent storage of all transcriptions with timestamps. Besides
//! the plain text, each row keeps the serialized transcription result (with
//! its timing data) and the path to the encoded audio, so a past dictation
//! can be re-opened in the review view.

use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

use crate::transcription::TranscriptionResult;

/// A single transcription entry in the history.
#[derive(Debug, Clone)]
pub struct TranscriptionEntry {
    /// Unique identifier for this transcription
    pub id: i64,
    /// The transcribed text content
    pub text: String,
    /// Full transcription result with timing data, when stored
    pub result: Option<TranscriptionResult>,
    /// Path to the encoded audio, when it was retained
    pub audio_path: Option<PathBuf>,
    /// When this transcription was created
    pub created_at: DateTime<Local>,
}

impl TranscriptionEntry {
    /// Whether the entry can be opened in the playback review view.
    pub fn is_reviewable(&self) -> bool {
        self.result.is_some()
            && self
                .audio_path
                .as_ref()
                .is_some_and(|p| p.exists())
    }
}

/// Manages the transcription history database.
pub struct HistoryManager {
    /// Path to the SQLite database file
    database_path: PathBuf,
    /// Connection to the database (lazy-loaded)
    connection: Option<Connection>,
}

impl HistoryManager {
    /// Creates a new history manager for the given data directory.
    ///
    /// # Arguments
    /// * `data_dir` - Directory where the database file will be stored
    pub fn new(data_dir: &Path) -> Result<Self> {
        let database_path = data_dir.join("transcription_history.db");

        Ok(Self {
            database_path,
            connection: None,
        })
    }

    /// Initializes database connection and creates tables if necessary.
    ///
    /// # Errors
    /// - If the database file cannot be opened
    /// - If table creation fails
    fn get_connection(&mut self) -> Result<&Connection> {
        if self.connection.is_none() {
            let connection = Connection::open(&self.database_path)?;

            connection.execute("PRAGMA foreign_keys = ON", [])?;

            connection.execute(
                "CREATE TABLE IF NOT EXISTS transcriptions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    text TEXT NOT NULL,
                    result_json TEXT,
                    audio_path TEXT,
                    created_at TEXT NOT NULL
                )",
                [],
            )?;

            self.connection = Some(connection);
        }

        Ok(self.connection.as_ref().unwrap())
    }

    /// Saves a transcription with its full result and audio location.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If result serialization or insertion fails
    pub fn save_result(
        &mut self,
        result: &TranscriptionResult,
        audio_path: Option<&Path>,
    ) -> Result<i64> {
        let result_json = serde_json::to_string(result)?;
        let audio = audio_path.map(|p| p.to_string_lossy().to_string());
        let timestamp = Local::now().to_rfc3339();

        let connection = self.get_connection()?;
        connection.execute(
            "INSERT INTO transcriptions (text, result_json, audio_path, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![result.text, result_json, audio, timestamp],
        )?;
        let id = connection.last_insert_rowid();

        tracing::debug!("Transcription saved to history (id {id})");
        Ok(id)
    }

    /// Retrieves all transcriptions ordered by most recent first.
    ///
    /// # Errors
    /// - If database connection fails
    /// - If query execution fails
    /// - If timestamp parsing fails
    pub fn get_all_transcriptions(&mut self) -> Result<Vec<TranscriptionEntry>> {
        let connection = self.get_connection()?;

        let mut statement = connection.prepare(
            "SELECT id, text, result_json, audio_path, created_at
             FROM transcriptions ORDER BY created_at DESC",
        )?;

        let entries = statement
            .query_map([], row_to_entry)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

}

/// Maps a database row to a history entry.
///
/// A malformed result_json column degrades to a text-only entry rather than
/// failing the whole query.
fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<TranscriptionEntry> {
    let id = row.get::<_, i64>(0)?;
    let text = row.get::<_, String>(1)?;
    let result_json = row.get::<_, Option<String>>(2)?;
    let audio_path = row.get::<_, Option<String>>(3)?;
    let timestamp_str = row.get::<_, String>(4)?;

    let created_at = DateTime::parse_from_rfc3339(&timestamp_str)
        .map(|dt| dt.with_timezone(&Local))
        .map_err(|_| {
            rusqlite::Error::InvalidParameterName("Invalid timestamp format".to_string())
        })?;

    let result = result_json.and_then(|json| match serde_json::from_str(&json) {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::warn!("Discarding malformed result for history entry {id}: {e}");
            None
        }
    });

    Ok(TranscriptionEntry {
        id,
        text,
        result,
        audio_path: audio_path.map(PathBuf::from),
        created_at,
    })
}
