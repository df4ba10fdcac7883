//! Transcription API client with provider-specific implementations.
//!
//! This module is the gateway between a local audio file and the external
//! speech-to-text service: it validates the payload up front, routes the
//! request to the provider implementation for the configured model, and
//! returns the reshaped `TranscriptionResult`. One request, one response; no
//! retry policy lives here.

mod deepgram;
mod openai;

use std::path::Path;

use super::model::TranscriptionModel;
use super::provider::TranscriptionProvider;
use super::result::TranscriptionResult;
use crate::config::file::ProvidersConfig;

/// Upper bound on the audio payload, matching the strictest provider limit
/// (OpenAI caps uploads at 25 MB).
pub const MAX_AUDIO_BYTES: u64 = 25 * 1024 * 1024;

/// Audio container extensions the providers accept.
const SUPPORTED_EXTENSIONS: &[&str] = &[
    "wav", "mp3", "m4a", "mp4", "ogg", "oga", "flac", "webm",
];

/// Configuration for transcription requests
#[derive(Debug, Clone)]
pub struct TranscriptionConfig {
    /// The model to use
    pub model: TranscriptionModel,
    /// The API key for authentication
    pub api_key: String,
    /// Clinical vocabulary terms to improve transcription accuracy
    pub vocabulary: Vec<String>,
    /// Provider-specific configurations
    pub providers: ProvidersConfig,
}

impl TranscriptionConfig {
    /// Creates a new transcription configuration
    pub fn new(
        model: TranscriptionModel,
        api_key: String,
        vocabulary: Vec<String>,
        providers: ProvidersConfig,
    ) -> Self {
        Self {
            model,
            api_key,
            vocabulary,
            providers,
        }
    }
}

/// Validates an audio payload before it is sent anywhere.
///
/// # Errors
/// - If the file does not exist
/// - If the extension is not a recognized audio container
/// - If the file exceeds the provider size limit
pub fn validate_audio_file(audio_path: &Path) -> anyhow::Result<()> {
    if !audio_path.exists() {
        return Err(anyhow::anyhow!(
            "Audio file not found: {}",
            audio_path.display()
        ));
    }

    let extension = audio_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(anyhow::anyhow!(
            "Unsupported audio format '.{extension}'. Supported formats: {}",
            SUPPORTED_EXTENSIONS.join(", ")
        ));
    }

    let size = std::fs::metadata(audio_path)?.len();
    if size > MAX_AUDIO_BYTES {
        return Err(anyhow::anyhow!(
            "Audio file is too large ({:.1} MB). The maximum upload size is {} MB.",
            size as f64 / (1024.0 * 1024.0),
            MAX_AUDIO_BYTES / (1024 * 1024)
        ));
    }

    Ok(())
}

/// Transcribes an audio file using the configured transcription model.
///
/// This function routes the request to the appropriate provider-specific
/// implementation based on the configured model. The caller doesn't need to
/// know which provider is being used.
///
/// # Errors
/// - If the payload fails validation (missing, wrong type, oversized)
/// - If the API request fails due to network issues (connection, timeout)
/// - If the API returns an HTTP error (401 for invalid key, 429 for rate limit, etc.)
/// - If the API response cannot be parsed
pub async fn transcribe(
    config: &TranscriptionConfig,
    audio_path: &Path,
) -> anyhow::Result<TranscriptionResult> {
    validate_audio_file(audio_path)?;

    tracing::info!(
        "Transcribing with {} ({})",
        config.model.provider().name(),
        config.model.id()
    );

    let result = match config.model.provider() {
        TranscriptionProvider::OpenAI => openai::transcribe(config, audio_path).await,
        TranscriptionProvider::Deepgram => deepgram::transcribe(config, audio_path).await,
    }?;

    tracing::debug!(
        "Transcription result: {} chars, {} words, {} segments",
        result.text.len(),
        result.words.as_ref().map_or(0, |w| w.len()),
        result.segments.as_ref().map_or(0, |s| s.len())
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_missing_file() {
        let err = validate_audio_file(Path::new("/nonexistent/visit.mp3")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn validate_rejects_unknown_extension() {
        let path = std::env::temp_dir().join("medscribe-validate-test.txt");
        std::fs::write(&path, b"not audio").unwrap();
        let err = validate_audio_file(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported audio format"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn validate_accepts_small_wav() {
        let path = std::env::temp_dir().join("medscribe-validate-test.wav");
        std::fs::write(&path, b"RIFF").unwrap();
        assert!(validate_audio_file(&path).is_ok());
        std::fs::remove_file(&path).ok();
    }
}
