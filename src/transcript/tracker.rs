//! Time-to-unit alignment for transcript playback.
//!
//! The tracker is a small state machine advanced by discrete playback events:
//! clock updates, play/pause, end of playback, and user seeks. It never
//! touches the display; the review UI reads `active_unit()`/`is_playing()`
//! after each event and applies the returned effect.

use super::unit::Transcript;

/// Effect of a clock update, consumed by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEffect {
    /// Bring the unit at this index into view, smoothly centered. Safe to
    /// re-emit for a unit already in view.
    ScrollTo(usize),
    /// No unit contains the clock; drop any existing highlight.
    ClearHighlight,
}

/// Seek-and-play command for the playback surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekCommand {
    /// Index of the unit the user activated.
    pub unit: usize,
    /// Position to jump the playback clock to, in seconds.
    pub seconds: f64,
}

/// Maps the playback clock to the currently active transcript unit.
///
/// State is reset whenever a new transcript is loaded, so no highlight from a
/// previous result carries over. All methods run on the single UI event loop;
/// events are delivered serially and are never reentrant.
pub struct AlignmentTracker {
    transcript: Transcript,
    active_unit: Option<usize>,
    playing: bool,
}

impl AlignmentTracker {
    pub fn new(transcript: Transcript) -> Self {
        Self {
            transcript,
            active_unit: None,
            playing: false,
        }
    }

    /// Replaces the transcript and fully resets tracker state.
    pub fn load(&mut self, transcript: Transcript) {
        self.transcript = transcript;
        self.active_unit = None;
        self.playing = false;
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns the first unit in sequence order whose interval contains
    /// `clock`, or `None` when the clock falls in a gap or outside the
    /// transcript entirely.
    ///
    /// Overlapping units resolve to the lowest matching index. That is a
    /// sequence-order contract, not a closest-interval heuristic, and tests
    /// pin it as documented behavior.
    pub fn locate(&self, clock: f64) -> Option<usize> {
        self.transcript.units().iter().position(|u| u.contains(clock))
    }

    /// Recomputes the active unit from a new clock reading.
    pub fn on_clock_update(&mut self, clock: f64) -> ClockEffect {
        self.active_unit = self.locate(clock);
        match self.active_unit {
            Some(unit) => ClockEffect::ScrollTo(unit),
            None => ClockEffect::ClearHighlight,
        }
    }

    pub fn on_play(&mut self) {
        self.playing = true;
    }

    pub fn on_pause(&mut self) {
        self.playing = false;
    }

    /// End of playback always clears the highlight, regardless of where the
    /// clock stopped.
    pub fn on_ended(&mut self) {
        self.active_unit = None;
        self.playing = false;
    }

    /// Builds the seek-and-play command for a user-activated unit.
    ///
    /// Does not update the active unit; the clock update that follows the
    /// seek re-derives it. Out-of-range indices are rejected silently since
    /// they can only come from a stale rendering layer.
    pub fn seek_to(&self, unit: usize) -> Option<SeekCommand> {
        self.transcript.units().get(unit).map(|u| SeekCommand {
            unit,
            seconds: u.start,
        })
    }

    pub fn active_unit(&self) -> Option<usize> {
        self.active_unit
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Emphasis gate for the renderer: the active unit is emphasized
    /// (bold+underline) only while playback is running.
    pub fn is_emphasized(&self, unit: usize) -> bool {
        self.playing && self.active_unit == Some(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::unit::TimedUnit;

    fn units(timings: &[(&str, f64, f64)]) -> Transcript {
        Transcript::Words(
            timings
                .iter()
                .map(|&(t, s, e)| TimedUnit::new(t, s, e))
                .collect(),
        )
    }

    fn gap_tracker() -> AlignmentTracker {
        AlignmentTracker::new(units(&[("a", 0.0, 1.0), ("b", 1.5, 2.5)]))
    }

    #[test]
    fn locate_inside_a_unit_returns_its_index() {
        let tracker = gap_tracker();
        assert_eq!(tracker.locate(0.5), Some(0));
        assert_eq!(tracker.locate(2.0), Some(1));
    }

    #[test]
    fn locate_in_a_gap_returns_none() {
        let tracker = gap_tracker();
        assert_eq!(tracker.locate(1.2), None);
    }

    #[test]
    fn locate_outside_the_transcript_returns_none() {
        let tracker = gap_tracker();
        assert_eq!(tracker.locate(3.0), None);
    }

    #[test]
    fn locate_at_interval_bounds_matches() {
        let tracker = gap_tracker();
        assert_eq!(tracker.locate(0.0), Some(0));
        assert_eq!(tracker.locate(1.0), Some(0));
        assert_eq!(tracker.locate(1.5), Some(1));
    }

    #[test]
    fn overlapping_units_resolve_to_first_in_sequence_order() {
        // Malformed input is accepted; the contract is lowest matching index,
        // not longest or closest interval.
        let tracker = AlignmentTracker::new(units(&[
            ("a", 0.0, 2.0),
            ("b", 1.0, 3.0),
            ("c", 1.0, 1.5),
        ]));
        assert_eq!(tracker.locate(1.2), Some(0));
    }

    #[test]
    fn empty_transcript_is_inert() {
        let tracker = AlignmentTracker::new(Transcript::Plain("no timing".to_string()));
        assert_eq!(tracker.locate(0.0), None);
        assert_eq!(tracker.locate(123.4), None);
        assert_eq!(tracker.seek_to(0), None);
    }

    #[test]
    fn clock_update_emits_scroll_for_active_unit() {
        let mut tracker = gap_tracker();
        assert_eq!(tracker.on_clock_update(0.5), ClockEffect::ScrollTo(0));
        assert_eq!(tracker.active_unit(), Some(0));
    }

    #[test]
    fn clock_update_in_gap_clears_highlight() {
        let mut tracker = gap_tracker();
        tracker.on_clock_update(0.5);
        assert_eq!(tracker.on_clock_update(1.2), ClockEffect::ClearHighlight);
        assert_eq!(tracker.active_unit(), None);
    }

    #[test]
    fn emphasis_requires_playing() {
        let mut tracker = gap_tracker();
        tracker.on_clock_update(0.5);

        assert!(!tracker.is_emphasized(0));
        tracker.on_play();
        assert!(tracker.is_emphasized(0));
        assert!(!tracker.is_emphasized(1));
        tracker.on_pause();
        assert!(!tracker.is_emphasized(0));
    }

    #[test]
    fn ended_resets_state_regardless_of_prior_index() {
        let mut tracker = gap_tracker();
        tracker.on_play();
        tracker.on_clock_update(2.0);
        assert_eq!(tracker.active_unit(), Some(1));

        tracker.on_ended();
        assert_eq!(tracker.active_unit(), None);
        assert!(!tracker.is_playing());
    }

    #[test]
    fn seek_to_valid_unit_targets_its_start() {
        let tracker = gap_tracker();
        let cmd = tracker.seek_to(1).unwrap();
        assert_eq!(cmd.unit, 1);
        assert_eq!(cmd.seconds, 1.5);
        // The seek itself leaves the active unit untouched.
        assert_eq!(tracker.active_unit(), None);
    }

    #[test]
    fn seek_to_out_of_range_is_rejected() {
        let tracker = gap_tracker();
        assert_eq!(tracker.seek_to(5), None);
    }

    #[test]
    fn loading_a_new_transcript_resets_state() {
        let mut tracker = gap_tracker();
        tracker.on_play();
        tracker.on_clock_update(0.5);
        assert_eq!(tracker.active_unit(), Some(0));

        tracker.load(units(&[("x", 10.0, 11.0)]));
        assert_eq!(tracker.active_unit(), None);
        assert!(!tracker.is_playing());
    }
}
