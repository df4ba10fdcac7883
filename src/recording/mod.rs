//! Audio capture: device handling, the recording TUI, and retention of
//! recent recordings.

pub mod audio;
pub mod ffmpeg;
pub mod recording_history;
pub mod ui;
pub mod visualize;

pub use audio::AudioRecorder;
pub use recording_history::{RecordingHistory, RecordingMetadata};
pub use ui::{RecordingCommand, RecordingTui};
