//! Deepgram API implementation.
//!
//! Handles transcription requests to Deepgram's prerecorded audio API. The
//! audio is sent as a single binary POST; options are passed as query
//! parameters built from the provider configuration. Word timestamps come
//! back on every response; utterances (when enabled) provide the coarser
//! segment-level timing.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::TranscriptionConfig;
use crate::config::file::DeepgramConfig;
use crate::transcription::model::TranscriptionModel;
use crate::transcription::result::{
    confidence_label, ResultMetadata, SegmentTiming, TranscriptionResult, WordTiming,
};

#[derive(Debug, Deserialize)]
struct DeepgramResponse {
    metadata: Option<DeepgramMetadata>,
    results: DeepgramResults,
}

#[derive(Debug, Deserialize)]
struct DeepgramMetadata {
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
    utterances: Option<Vec<DeepgramUtterance>>,
}

#[derive(Debug, Deserialize)]
struct DeepgramChannel {
    detected_language: Option<String>,
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(Debug, Deserialize)]
struct DeepgramAlternative {
    transcript: String,
    confidence: Option<f64>,
    words: Option<Vec<DeepgramWord>>,
}

#[derive(Debug, Deserialize)]
struct DeepgramWord {
    word: String,
    start: f64,
    end: f64,
    punctuated_word: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DeepgramUtterance {
    start: f64,
    end: f64,
    transcript: String,
}

/// Transcribes an audio file using Deepgram's prerecorded API.
///
/// Uses a single binary POST with token authentication. Vocabulary terms are
/// passed as keyterm parameters to bias recognition toward clinical
/// terminology.
pub async fn transcribe(
    config: &TranscriptionConfig,
    audio_path: &Path,
) -> anyhow::Result<TranscriptionResult> {
    let audio_data = std::fs::read(audio_path)
        .map_err(|e| anyhow::anyhow!("Failed to read audio file: {e}"))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;

    let url = build_url(
        config.model.endpoint(),
        &config.model,
        &config.providers.deepgram,
        &config.vocabulary,
    );

    tracing::debug!(
        "Deepgram API Call:\n  URL: {}\n  Method: POST\n  Headers:\n    Authorization: Token <redacted>\n    Content-Type: application/octet-stream",
        url
    );

    let response = match client
        .post(&url)
        .header("Authorization", format!("Token {}", config.api_key))
        .header("Content-Type", "application/octet-stream")
        .body(audio_data)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            let error_msg = if e.is_connect() {
                "Failed to connect to Deepgram API server. Check your internet connection."
                    .to_string()
            } else if e.is_timeout() {
                "Request to Deepgram timed out. The API server is not responding.".to_string()
            } else {
                format!("Deepgram network error: {e}")
            };
            return Err(anyhow::anyhow!(error_msg));
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let human_readable = match status.as_u16() {
            401 => "Deepgram API key is invalid or expired. Please run 'medscribe auth' to update your API key.".to_string(),
            403 => "You don't have permission to use Deepgram's API. Check your API key and account status.".to_string(),
            413 => "Deepgram rejected the upload as too large. Try a shorter recording or a more compressed format.".to_string(),
            429 => "Too many requests to Deepgram. You've hit the API rate limit. Please wait and try again.".to_string(),
            500 | 502 | 503 | 504 => "Deepgram API server is experiencing issues. Please try again later.".to_string(),
            _ => format!("Deepgram API error (status {status}): {error_body}"),
        };

        return Err(anyhow::anyhow!(human_readable));
    }

    let parsed: DeepgramResponse = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse Deepgram response: {e}"))?;

    reshape(parsed, config.model.api_model_name())
}

/// Builds the request URL with query parameters from the provider config.
fn build_url(
    endpoint: &str,
    model: &TranscriptionModel,
    deepgram: &DeepgramConfig,
    vocabulary: &[String],
) -> String {
    let mut params = vec![format!("model={}", model.api_model_name())];

    let flags = [
        ("filler_words", deepgram.filler_words),
        ("measurements", deepgram.measurements),
        ("numerals", deepgram.numerals),
        ("paragraphs", deepgram.paragraphs),
        ("profanity_filter", deepgram.profanity_filter),
        ("punctuate", deepgram.punctuate),
        ("smart_format", deepgram.smart_format),
        ("utterances", deepgram.utterances),
        ("detect_language", deepgram.detect_language),
        ("mip_opt_out", deepgram.mip_opt_out),
    ];
    for (name, enabled) in flags {
        if enabled {
            params.push(format!("{name}=true"));
        }
    }

    if deepgram.utterances {
        params.push(format!("utt_split={}", deepgram.utt_split));
    }

    // nova-3 takes keyterm; earlier models take keywords
    let term_param = match model {
        TranscriptionModel::DeepgramNova3 => "keyterm",
        _ => "keywords",
    };
    for term in vocabulary {
        params.push(format!("{term_param}={}", urlencoding::encode(term)));
    }

    format!("{endpoint}?{}", params.join("&"))
}

/// Reshapes the vendor response into the unified result format.
fn reshape(response: DeepgramResponse, model_name: &str) -> anyhow::Result<TranscriptionResult> {
    let channel = response
        .results
        .channels
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Deepgram returned no audio channels"))?;

    let language = channel.detected_language.clone();

    let alternative = channel
        .alternatives
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("Deepgram returned no transcript alternatives"))?;

    let words = alternative.words.map(|words| {
        words
            .into_iter()
            .map(|w| WordTiming {
                text: w.punctuated_word.unwrap_or(w.word),
                start: w.start,
                end: w.end,
            })
            .collect::<Vec<_>>()
    });

    let segments = response.results.utterances.map(|utterances| {
        utterances
            .into_iter()
            .enumerate()
            .map(|(id, u)| SegmentTiming {
                id,
                text: u.transcript,
                start: u.start,
                end: u.end,
            })
            .collect::<Vec<_>>()
    });

    Ok(TranscriptionResult {
        text: alternative.transcript.trim().to_string(),
        language,
        duration: response.metadata.and_then(|m| m.duration),
        words,
        segments,
        metadata: Some(ResultMetadata {
            confidence: alternative.confidence.map(|c| confidence_label(c).to_string()),
            model: Some(model_name.to_string()),
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTEN_JSON: &str = r#"{
        "metadata": {"duration": 4.1},
        "results": {
            "channels": [{
                "detected_language": "en",
                "alternatives": [{
                    "transcript": "Patient presents with acute dyspnea.",
                    "confidence": 0.96,
                    "words": [
                        {"word": "patient", "start": 0.1, "end": 0.6,
                         "confidence": 0.99, "punctuated_word": "Patient"},
                        {"word": "presents", "start": 0.6, "end": 1.1,
                         "confidence": 0.98, "punctuated_word": "presents"}
                    ]
                }]
            }],
            "utterances": [
                {"start": 0.1, "end": 4.0,
                 "transcript": "Patient presents with acute dyspnea."}
            ]
        }
    }"#;

    #[test]
    fn listen_response_reshapes_to_unified_result() {
        let parsed: DeepgramResponse = serde_json::from_str(LISTEN_JSON).unwrap();
        let result = reshape(parsed, "nova-3").unwrap();

        assert_eq!(result.text, "Patient presents with acute dyspnea.");
        assert_eq!(result.language.as_deref(), Some("en"));
        assert_eq!(result.duration, Some(4.1));

        let words = result.words.unwrap();
        assert_eq!(words.len(), 2);
        // punctuated form wins when present
        assert_eq!(words[0].text, "Patient");

        let segments = result.segments.unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, 0);

        let metadata = result.metadata.unwrap();
        assert_eq!(metadata.confidence.as_deref(), Some("high"));
        assert_eq!(metadata.model.as_deref(), Some("nova-3"));
    }

    #[test]
    fn empty_channels_is_an_error() {
        let parsed: DeepgramResponse = serde_json::from_str(
            r#"{"results": {"channels": []}}"#,
        )
        .unwrap();
        assert!(reshape(parsed, "nova-3").is_err());
    }

    #[test]
    fn url_includes_model_and_enabled_flags_only() {
        let mut config = DeepgramConfig::default();
        config.punctuate = true;
        config.smart_format = true;
        config.utterances = true;

        let url = build_url(
            "https://api.deepgram.com/v1/listen",
            &TranscriptionModel::DeepgramNova3,
            &config,
            &[],
        );

        assert!(url.contains("model=nova-3"));
        assert!(url.contains("punctuate=true"));
        assert!(url.contains("smart_format=true"));
        assert!(url.contains("utterances=true"));
        assert!(url.contains("utt_split=0.8"));
        assert!(!url.contains("numerals"));
    }

    #[test]
    fn vocabulary_terms_are_url_encoded_keyterms() {
        let url = build_url(
            "https://api.deepgram.com/v1/listen",
            &TranscriptionModel::DeepgramNova3,
            &DeepgramConfig::default(),
            &["metoprolol tartrate".to_string()],
        );
        assert!(url.contains("keyterm=metoprolol%20tartrate"));

        let url = build_url(
            "https://api.deepgram.com/v1/listen",
            &TranscriptionModel::DeepgramNova2,
            &DeepgramConfig::default(),
            &["metoprolol".to_string()],
        );
        assert!(url.contains("keywords=metoprolol"));
    }
}
