//! Unified transcription result shape.
//!
//! Every provider response is reshaped into `TranscriptionResult` before it
//! leaves the API layer, so the rest of the application never sees vendor
//! JSON. Results are serializable and are persisted alongside the transcript
//! text in history, which lets `medscribe review` re-open them later.

use serde::{Deserialize, Serialize};

/// A single word with timing, as reshaped from a provider response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTiming {
    pub text: String,
    /// Start of the word in seconds from the beginning of the audio.
    pub start: f64,
    /// End of the word in seconds.
    pub end: f64,
}

/// A coarser transcript segment (sentence or utterance) with timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTiming {
    /// Ordinal position of the segment within the result.
    pub id: usize,
    pub text: String,
    pub start: f64,
    pub end: f64,
}

/// Provider metadata carried through for display; never interpreted by the
/// alignment layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    /// Coarse confidence label ("high", "medium", "low") when the provider
    /// reports a usable confidence score.
    pub confidence: Option<String>,
    /// Model name as reported by the provider.
    pub model: Option<String>,
}

/// The result of one transcription exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionResult {
    /// Full transcript text. Always present, even when timing data is not.
    pub text: String,
    #[serde(default)]
    pub language: Option<String>,
    /// Total audio duration in seconds, when the provider reports it.
    #[serde(default)]
    pub duration: Option<f64>,
    /// Word-level timing, ordered by start time.
    #[serde(default)]
    pub words: Option<Vec<WordTiming>>,
    /// Segment-level timing, ordered by start time.
    #[serde(default)]
    pub segments: Option<Vec<SegmentTiming>>,
    #[serde(default)]
    pub metadata: Option<ResultMetadata>,
}

impl TranscriptionResult {
    /// A result carrying only plain text, used when a provider returns no
    /// usable timing data.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language: None,
            duration: None,
            words: None,
            segments: None,
            metadata: None,
        }
    }
}

/// Maps a numeric confidence score (0.0–1.0) to a coarse display label.
pub fn confidence_label(score: f64) -> &'static str {
    if score >= 0.9 {
        "high"
    } else if score >= 0.7 {
        "medium"
    } else {
        "low"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_labels_bucket_correctly() {
        assert_eq!(confidence_label(0.97), "high");
        assert_eq!(confidence_label(0.9), "high");
        assert_eq!(confidence_label(0.8), "medium");
        assert_eq!(confidence_label(0.42), "low");
    }

    #[test]
    fn result_round_trips_through_json() {
        let result = TranscriptionResult {
            text: "bp one twenty over eighty".to_string(),
            language: Some("en".to_string()),
            duration: Some(3.2),
            words: Some(vec![WordTiming {
                text: "bp".to_string(),
                start: 0.0,
                end: 0.4,
            }]),
            segments: Some(vec![SegmentTiming {
                id: 0,
                text: "bp one twenty over eighty".to_string(),
                start: 0.0,
                end: 3.2,
            }]),
            metadata: Some(ResultMetadata {
                confidence: Some("high".to_string()),
                model: Some("nova-3".to_string()),
            }),
        };

        let json = serde_json::to_string(&result).unwrap();
        let parsed: TranscriptionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.text, result.text);
        assert_eq!(parsed.words.unwrap()[0].text, "bp");
        assert_eq!(parsed.segments.unwrap()[0].id, 0);
    }

    #[test]
    fn missing_optional_fields_deserialize_to_none() {
        let parsed: TranscriptionResult =
            serde_json::from_str(r#"{"text":"plain only"}"#).unwrap();
        assert!(parsed.words.is_none());
        assert!(parsed.segments.is_none());
        assert!(parsed.metadata.is_none());
    }
}
