//! Transcript representation and playback alignment.
//!
//! A transcription result carries timing at word level, segment level, or not
//! at all. This module selects the active granularity and maps the playback
//! clock to the unit currently being spoken, so the review UI can highlight
//! and follow along.

pub mod tracker;
pub mod unit;

pub use tracker::{AlignmentTracker, ClockEffect, SeekCommand};
pub use unit::{TimedUnit, Transcript};
