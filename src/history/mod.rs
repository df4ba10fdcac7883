//! Transcription history: persistent storage and the interactive viewer.

pub mod storage;
pub mod ui;

pub use storage::{HistoryManager, TranscriptionEntry};
pub use ui::{HistorySelection, HistoryViewer};
