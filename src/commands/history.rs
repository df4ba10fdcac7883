//! Transcription history viewing command.

use crate::clipboard::copy_to_clipboard;
use crate::commands::{data_dir, review};
use crate::history::{HistoryManager, HistorySelection, HistoryViewer};

/// Opens the interactive history viewer.
///
/// Enter copies the selected transcription to the clipboard; `r` re-opens a
/// reviewable entry in the playback view.
pub async fn handle_history() -> Result<(), anyhow::Error> {
    tracing::info!("=== medscribe History Viewer ===");

    let mut history = HistoryManager::new(&data_dir()?)?;
    let entries = history.get_all_transcriptions()?;

    if entries.is_empty() {
        println!("No transcriptions in history yet. Run 'medscribe' to record one.");
        return Ok(());
    }

    let mut viewer = HistoryViewer::new(entries)?;
    match viewer.run()? {
        Some(HistorySelection::Copy(text)) => {
            copy_to_clipboard(&text)?;
            tracing::debug!("History entry copied to clipboard");
        }
        Some(HistorySelection::Review(entry)) => {
            review::open_entry(&entry)?;
        }
        None => {}
    }

    Ok(())
}
