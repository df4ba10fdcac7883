//! Timestamped transcript units and granularity selection.

use serde::{Deserialize, Serialize};

use crate::transcription::TranscriptionResult;

/// A word or segment of transcript text with start/end times in seconds.
///
/// Intervals are inclusive on both ends. Ordered sequences are expected to be
/// non-decreasing in `start`, but malformed input is not rejected; lookup is
/// defined over whatever order the provider returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedUnit {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

impl TimedUnit {
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Whether the given clock position falls inside this unit's interval.
    pub fn contains(&self, clock: f64) -> bool {
        self.start <= clock && clock <= self.end
    }
}

/// A transcript at a single timing granularity.
///
/// Word-level timing takes precedence over segment-level when a result
/// carries both. Results without any timing data fall back to plain text,
/// which renders without playback interactivity.
#[derive(Debug, Clone)]
pub enum Transcript {
    Words(Vec<TimedUnit>),
    Segments(Vec<TimedUnit>),
    Plain(String),
}

impl Transcript {
    /// Selects the active granularity from a transcription result.
    pub fn from_result(result: &TranscriptionResult) -> Self {
        if let Some(words) = &result.words {
            if !words.is_empty() {
                return Transcript::Words(
                    words
                        .iter()
                        .map(|w| TimedUnit::new(w.text.clone(), w.start, w.end))
                        .collect(),
                );
            }
        }

        if let Some(segments) = &result.segments {
            if !segments.is_empty() {
                return Transcript::Segments(
                    segments
                        .iter()
                        .map(|s| TimedUnit::new(s.text.clone(), s.start, s.end))
                        .collect(),
                );
            }
        }

        Transcript::Plain(result.text.clone())
    }

    /// The unit sequence for the active granularity. Empty for plain text.
    pub fn units(&self) -> &[TimedUnit] {
        match self {
            Transcript::Words(units) | Transcript::Segments(units) => units,
            Transcript::Plain(_) => &[],
        }
    }

    /// Whether units carry timing that playback can align against.
    pub fn is_interactive(&self) -> bool {
        !self.units().is_empty()
    }

    /// The fallback text for transcripts without timing data.
    pub fn plain_text(&self) -> Option<&str> {
        match self {
            Transcript::Plain(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::{SegmentTiming, WordTiming};

    fn result_with(
        words: Option<Vec<WordTiming>>,
        segments: Option<Vec<SegmentTiming>>,
    ) -> TranscriptionResult {
        TranscriptionResult {
            text: "the patient presents".to_string(),
            language: None,
            duration: None,
            words,
            segments,
            metadata: None,
        }
    }

    #[test]
    fn words_take_precedence_over_segments() {
        let result = result_with(
            Some(vec![WordTiming {
                text: "the".to_string(),
                start: 0.0,
                end: 0.3,
            }]),
            Some(vec![SegmentTiming {
                id: 0,
                text: "the patient presents".to_string(),
                start: 0.0,
                end: 2.0,
            }]),
        );

        let transcript = Transcript::from_result(&result);
        assert!(matches!(transcript, Transcript::Words(_)));
        assert_eq!(transcript.units().len(), 1);
        assert_eq!(transcript.units()[0].text, "the");
    }

    #[test]
    fn empty_word_list_falls_through_to_segments() {
        let result = result_with(
            Some(vec![]),
            Some(vec![SegmentTiming {
                id: 0,
                text: "the patient presents".to_string(),
                start: 0.0,
                end: 2.0,
            }]),
        );

        let transcript = Transcript::from_result(&result);
        assert!(matches!(transcript, Transcript::Segments(_)));
    }

    #[test]
    fn no_timing_data_falls_back_to_plain_text() {
        let transcript = Transcript::from_result(&result_with(None, None));
        assert!(matches!(transcript, Transcript::Plain(_)));
        assert!(transcript.units().is_empty());
        assert!(!transcript.is_interactive());
        assert_eq!(transcript.plain_text(), Some("the patient presents"));
    }

    #[test]
    fn interval_bounds_are_inclusive() {
        let unit = TimedUnit::new("word", 1.0, 2.0);
        assert!(unit.contains(1.0));
        assert!(unit.contains(2.0));
        assert!(!unit.contains(0.999));
        assert!(!unit.contains(2.001));
    }
}
