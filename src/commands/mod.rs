//! Application command handlers for medscribe.
//!
//! This module organizes command handling into separate submodules, each
//! responsible for a specific application command.
//!
//! # Commands
//! - `record`: Audio recording with transcription and review (default)
//! - `transcribe`: Transcribe a pre-recorded audio file
//! - `review`: Re-open a saved transcription in the playback view
//! - `retry`: Retry transcription of a retained recording
//! - `auth`: Provider + model selection and API key management
//! - `history`: Transcription history viewer
//! - `vocabulary`: Clinical vocabulary management
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available audio input devices
//! - `logs`: Display recent log entries

pub mod auth;
pub mod config;
pub mod history;
pub mod list_devices;
pub mod logs;
pub mod record;
pub mod retry;
pub mod review;
pub mod transcribe;
pub mod vocabulary;

pub use auth::handle_auth;
pub use config::handle_config;
pub use history::handle_history;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use record::handle_record;
pub use retry::handle_retry;
pub use review::handle_review;
pub use transcribe::handle_transcribe;
pub use vocabulary::handle_vocabulary;

use std::path::{Path, PathBuf};

use anyhow::anyhow;

use crate::clipboard::copy_to_clipboard;
use crate::config as app_config;
use crate::playback::PlayerHandle;
use crate::review::ReviewUi;
use crate::transcript::{AlignmentTracker, Transcript};
use crate::transcription::{self, TranscriptionConfig, TranscriptionResult};
use crate::vocabulary::VocabularyManager;

/// Application data directory (history database, retained recordings).
pub(crate) fn data_dir() -> anyhow::Result<PathBuf> {
    let dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("medscribe");
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Builds the transcription request configuration from the selected model,
/// its API key, the vocabulary list, and provider settings.
///
/// # Errors
/// - If no model has been selected yet
/// - If the selected provider has no stored API key
pub(crate) fn load_transcription_config(
    providers: &crate::config::file::ProvidersConfig,
) -> anyhow::Result<TranscriptionConfig> {
    let model_id = app_config::get_selected_model()?.ok_or_else(|| {
        anyhow!("No model selected. Please run 'medscribe auth' to select a transcription model")
    })?;

    let model = transcription::TranscriptionModel::from_id(&model_id)
        .ok_or_else(|| anyhow!("Unknown model: {model_id}"))?;
    let provider = model.provider();

    let api_key = app_config::get_api_key(provider.id())?.ok_or_else(|| {
        anyhow!(
            "No API key for {}. Please run 'medscribe auth'",
            provider.name()
        )
    })?;

    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config");
    let vocabulary = VocabularyManager::new(&config_dir)?.load_terms()?;

    Ok(TranscriptionConfig::new(
        model,
        api_key,
        vocabulary,
        providers.clone(),
    ))
}

/// Delivers transcript text to an explicit destination.
///
/// Returns `true` when the text was routed to a file or the clipboard
/// because the caller asked for it; `false` means no explicit destination
/// was requested and the caller should open the review view.
pub(crate) fn deliver_output(
    text: &str,
    clipboard: bool,
    output_file: Option<&str>,
) -> anyhow::Result<bool> {
    if let Some(file_path) = output_file {
        std::fs::write(file_path, text)
            .map_err(|e| anyhow!("Failed to write to file '{file_path}': {e}"))?;
        tracing::debug!("Transcribed text written to file: {file_path}");
        return Ok(true);
    }

    if clipboard {
        if let Err(e) = copy_to_clipboard(text) {
            tracing::warn!("Failed to copy to clipboard: {e}");
        } else {
            tracing::debug!("Transcription copied to clipboard");
        }
        return Ok(true);
    }

    Ok(false)
}

/// Opens the playback review view for a transcription result.
pub(crate) fn open_review(
    result: &TranscriptionResult,
    audio_path: &Path,
    title: String,
) -> anyhow::Result<()> {
    let transcript = Transcript::from_result(result);
    let tracker = AlignmentTracker::new(transcript);
    let player = PlayerHandle::new(audio_path, result.duration)?;

    let mut review = ReviewUi::new(result, tracker, player, title)?;
    review.run()
}
