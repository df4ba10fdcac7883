//! Interactive transcript review with time-synced highlighting.
//!
//! Renders a transcription result next to its audio: the alignment tracker
//! decides which unit is current, the layout maps units to screen positions,
//! and the UI applies emphasis, keeps the active unit centered, and turns
//! clicks into seek commands.

pub mod layout;
pub mod ui;

pub use ui::ReviewUi;
