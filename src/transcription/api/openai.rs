//! OpenAI Whisper API implementation.
//!
//! Handles transcription requests to OpenAI's Whisper API using multipart
//! form data. Requests verbose JSON output with word and segment timestamp
//! granularities so the review view has timing data to align against.

use std::path::Path;

use serde::Deserialize;

use super::TranscriptionConfig;
use crate::transcription::result::{
    ResultMetadata, SegmentTiming, TranscriptionResult, WordTiming,
};

/// OpenAI verbose transcription response
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    text: String,
    language: Option<String>,
    duration: Option<f64>,
    words: Option<Vec<OpenAiWord>>,
    segments: Option<Vec<OpenAiSegment>>,
}

#[derive(Debug, Deserialize)]
struct OpenAiWord {
    word: String,
    start: f64,
    end: f64,
}

#[derive(Debug, Deserialize)]
struct OpenAiSegment {
    start: f64,
    end: f64,
    text: String,
}

/// Transcribes an audio file using OpenAI's Whisper API.
///
/// Uses multipart form data with bearer token authentication.
///
/// Vocabulary terms are passed as the `prompt` parameter to guide
/// transcription context; Whisper uses the prompt to improve accuracy for
/// domain-specific terms like drug names and anatomy.
pub async fn transcribe(
    config: &TranscriptionConfig,
    audio_path: &Path,
) -> anyhow::Result<TranscriptionResult> {
    let audio_data = std::fs::read(audio_path)
        .map_err(|e| anyhow::anyhow!("Failed to read audio file: {e}"))?;

    let client = reqwest::Client::new();

    let file_name = audio_path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    let file_part = reqwest::multipart::Part::bytes(audio_data)
        .file_name(file_name.clone())
        .mime_str("audio/mpeg")
        .map_err(|e| anyhow::anyhow!("Failed to create file part for upload: {e}"))?;

    let mut form = reqwest::multipart::Form::new()
        .part("file", file_part)
        .text("model", config.model.api_model_name().to_string())
        .text("response_format", "verbose_json".to_string())
        .text("timestamp_granularities[]", "word".to_string())
        .text("timestamp_granularities[]", "segment".to_string());

    if !config.vocabulary.is_empty() {
        let prompt = config.vocabulary.join(", ");
        form = form.text("prompt", prompt);
        tracing::debug!(
            "Vocabulary used as prompt for OpenAI model: {:?}",
            config.vocabulary
        );
    }

    let url = config.model.endpoint();

    tracing::debug!(
        "OpenAI API Call:\n  URL: {}\n  Method: POST\n  Headers:\n    Authorization: Bearer <redacted>\n    Content-Type: multipart/form-data\n  Body parameters: model={}, response_format=verbose_json",
        url,
        config.model.api_model_name()
    );

    let response = match client
        .post(url)
        .bearer_auth(&config.api_key)
        .multipart(form)
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            let error_msg = if e.is_connect() {
                "Failed to connect to OpenAI API server. Check your internet connection.".to_string()
            } else if e.is_timeout() {
                "Request to OpenAI timed out. The API server is not responding.".to_string()
            } else {
                format!("OpenAI network error: {e}")
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
            401 => "OpenAI API key is invalid or expired. Please run 'medscribe auth' to update your API key.".to_string(),
            403 => "You don't have permission to use OpenAI's API. Check your API key and account status.".to_string(),
            413 => "OpenAI rejected the upload as too large. Try a shorter recording or a more compressed format.".to_string(),
            429 => "Too many requests to OpenAI. You've hit the API rate limit. Please wait and try again.".to_string(),
            500 | 502 | 503 | 504 => "OpenAI API server is experiencing issues. Please try again later.".to_string(),
            _ => format!("OpenAI API error (status {status}): {error_body}"),
        };

        return Err(anyhow::anyhow!(human_readable));
    }

    let transcription: OpenAiResponse = response
        .json()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to parse OpenAI response: {e}"))?;

    tracing::debug!(
        "OpenAI API Response:\n  Status: Success\n  Transcription length: {} characters\n  Words: {}\n  Segments: {}",
        transcription.text.len(),
        transcription.words.as_ref().map_or(0, |w| w.len()),
        transcription.segments.as_ref().map_or(0, |s| s.len())
    );

    Ok(reshape(transcription, config.model.api_model_name()))
}

/// Reshapes the vendor response into the unified result format.
fn reshape(response: OpenAiResponse, model_name: &str) -> TranscriptionResult {
    let words = response.words.map(|words| {
        words
            .into_iter()
            .map(|w| WordTiming {
                text: w.word,
                start: w.start,
                end: w.end,
            })
            .collect::<Vec<_>>()
    });

    let segments = response.segments.map(|segments| {
        segments
            .into_iter()
            .enumerate()
            .map(|(id, s)| SegmentTiming {
                id,
                text: s.text.trim().to_string(),
                start: s.start,
                end: s.end,
            })
            .collect::<Vec<_>>()
    });

    TranscriptionResult {
        text: response.text.trim().to_string(),
        language: response.language,
        duration: response.duration,
        words,
        segments,
        metadata: Some(ResultMetadata {
            confidence: None,
            model: Some(model_name.to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERBOSE_JSON: &str = r#"{
        "task": "transcribe",
        "language": "english",
        "duration": 2.5,
        "text": " Patient denies chest pain. ",
        "words": [
            {"word": "Patient", "start": 0.0, "end": 0.5},
            {"word": "denies", "start": 0.5, "end": 0.9},
            {"word": "chest", "start": 1.0, "end": 1.4},
            {"word": "pain", "start": 1.4, "end": 1.8}
        ],
        "segments": [
            {"id": 0, "seek": 0, "start": 0.0, "end": 2.5,
             "text": " Patient denies chest pain.",
             "tokens": [], "temperature": 0.0, "avg_logprob": -0.2,
             "compression_ratio": 1.0, "no_speech_prob": 0.01}
        ]
    }"#;

    #[test]
    fn verbose_response_reshapes_to_unified_result() {
        let response: OpenAiResponse = serde_json::from_str(VERBOSE_JSON).unwrap();
        let result = reshape(response, "whisper-1");

        assert_eq!(result.text, "Patient denies chest pain.");
        assert_eq!(result.language.as_deref(), Some("english"));
        assert_eq!(result.duration, Some(2.5));

        let words = result.words.unwrap();
        assert_eq!(words.len(), 4);
        assert_eq!(words[0].text, "Patient");
        assert_eq!(words[3].end, 1.8);

        let segments = result.segments.unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, 0);
        assert_eq!(segments[0].text, "Patient denies chest pain.");

        assert_eq!(
            result.metadata.unwrap().model.as_deref(),
            Some("whisper-1")
        );
    }

    #[test]
    fn response_without_timing_still_parses() {
        let response: OpenAiResponse =
            serde_json::from_str(r#"{"text": "no timestamps here"}"#).unwrap();
        let result = reshape(response, "whisper-1");
        assert_eq!(result.text, "no timestamps here");
        assert!(result.words.is_none());
        assert!(result.segments.is_none());
    }
}
