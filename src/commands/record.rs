//! Audio recording, transcription, and review.
//!
//! Records audio with a live visualization, transcribes on Enter, saves the
//! result to history, and opens the playback review view (or routes the text
//! to the clipboard/a file when requested). Supports external triggers via
//! SIGUSR1 signal.

use crate::commands::{data_dir, deliver_output, load_transcription_config, open_review};
use crate::config;
use crate::history::HistoryManager;
use crate::recording::{AudioRecorder, RecordingCommand, RecordingHistory, RecordingTui};
use crate::transcription::{self, TranscriptionAnimation, TranscriptionResult};
use crate::ui::ErrorScreen;
use chrono::Local;
use std::path::PathBuf;

/// Handles audio recording, transcription, and review.
pub async fn handle_record(
    clipboard: bool,
    output_file: Option<String>,
) -> Result<(), anyhow::Error> {
    tracing::info!("=== medscribe Recorder Started ===");

    let config_data = match config::MedscribeConfig::load() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err}");
            let error_message = format!(
                "Configuration Error:\n\n{err}\n\nPlease check your ~/.config/medscribe/medscribe.toml file and try again."
            );
            show_error_screen(&error_message)?;
            return Err(anyhow::anyhow!("Configuration error: {err}"));
        }
    };

    tracing::info!(
        "Configuration loaded: device={}, sample_rate={}Hz, peak_threshold={}%, reference_level={}dBFS",
        config_data.audio.device,
        config_data.audio.sample_rate,
        config_data.audio.peak_volume_threshold,
        config_data.audio.reference_level_db
    );

    let mut recorder = AudioRecorder::new(
        config_data.audio.sample_rate,
        config_data.audio.device.clone(),
    );

    if let Err(e) = recorder.start() {
        tracing::error!("Failed to start recording: {}", e);
        show_error_screen(&format!(
            "Recording Error:\n\n{e}\n\nPlease check your audio configuration and try again."
        ))?;
        return Err(e);
    }

    let mut tui = RecordingTui::new(
        recorder.sample_rate(),
        config_data.audio.peak_volume_threshold,
        config_data.audio.reference_level_db,
        config_data.audio.visualization,
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize UI: {e}"))?;

    // External transcribe trigger for window-manager keybindings
    let term = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGUSR1, term.clone())
        .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;

    tracing::debug!(
        "Entering recording loop. Press 'Enter' to transcribe or 'Escape'/'q' to cancel."
    );
    let mut frame_count = 0u64;
    let mut should_transcribe = false;

    loop {
        if term.load(std::sync::atomic::Ordering::Relaxed) {
            tracing::info!("Received SIGUSR1: transcribing via external trigger");
            should_transcribe = true;
            break;
        }

        match tui.handle_input() {
            Ok(RecordingCommand::Continue) => {
                frame_count += 1;
                if frame_count % 60 == 0 {
                    tracing::debug!("Recording: {:.1}s recorded", recorder.duration_seconds());
                }

                let samples = recorder.samples();
                tui.render(&samples)
                    .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
            }
            Ok(RecordingCommand::Transcribe) => {
                should_transcribe = true;
                break;
            }
            Ok(RecordingCommand::Cancel) => {
                break;
            }
            Ok(RecordingCommand::TogglePause) => {
                recorder.toggle_pause();
                tui.is_paused = recorder.is_paused();
                let samples = recorder.samples();
                tui.render(&samples)
                    .map_err(|e| anyhow::anyhow!("Render failed: {e}"))?;
            }
            Err(e) => {
                tracing::error!("Input handling error: {}", e);
                return Err(anyhow::anyhow!("Input handling error: {e}"));
            }
        }
    }

    tracing::debug!("Stopping recording and saving audio...");
    let duration = recorder.duration_seconds();
    let filepath = recording_path(&config_data.audio.output_format)?;

    recorder
        .stop(Some(filepath.clone()), &config_data.audio.output_format)
        .map_err(|e| {
            tracing::error!("Failed to save recording: {}", e);
            e
        })?;

    // Retain the recording for retry even when transcription is skipped
    let recording_history = RecordingHistory::new(&data_dir()?)?;
    let model_id = config::get_selected_model().ok().flatten();
    if let Err(e) = recording_history.save_recording(filepath.clone(), model_id, Some(duration)) {
        tracing::warn!("Failed to save recording metadata: {}", e);
    }

    if !should_transcribe {
        tui.cleanup()
            .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;
        tracing::info!("=== medscribe Recorder Exited (cancelled) ===");
        return Ok(());
    }

    let result = match transcribe_with_animation(&mut tui, &config_data, &filepath).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Transcription failed: {}", e);
            tui.cleanup().ok();
            show_error_screen(&format!("Error: Transcription failed - {e}"))?;
            return Err(e);
        }
    };

    // Persist before any output so a crash never loses the transcript
    let mut history = HistoryManager::new(&data_dir()?)?;
    if let Err(e) = history.save_result(&result, Some(&filepath)) {
        tracing::warn!("Failed to save transcription to history: {}", e);
    }

    tui.cleanup()
        .map_err(|e| anyhow::anyhow!("Cleanup failed: {e}"))?;

    if !deliver_output(&result.text, clipboard, output_file.as_deref())? {
        let title = format!("Dictation {}", Local::now().format("%Y-%m-%d %H:%M"));
        open_review(&result, &filepath, title)?;
    }

    tracing::info!("=== medscribe Recorder Exited Successfully ===");
    Ok(())
}

/// Transcribes a recording while animating progress in the recording TUI.
///
/// # Errors
/// - If no model/API key is configured
/// - If transcription fails
async fn transcribe_with_animation(
    tui: &mut RecordingTui,
    config_data: &config::MedscribeConfig,
    audio_path: &PathBuf,
) -> anyhow::Result<TranscriptionResult> {
    let transcription_config = load_transcription_config(&config_data.providers)?;

    tracing::debug!(
        "Starting transcription with model '{}' for file '{}'",
        transcription_config.model.id(),
        audio_path.display()
    );

    let mut animation = TranscriptionAnimation::new(80);

    let request_config = transcription_config.clone();
    let request_path = audio_path.clone();
    let transcription_handle = tokio::spawn(async move {
        transcription::transcribe(&request_config, &request_path).await
    });

    loop {
        if let Err(e) = tui.render_transcription_animation(&mut animation) {
            tracing::warn!("Failed to render animation: {}", e);
        }

        if transcription_handle.is_finished() {
            break;
        }

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    }

    match transcription_handle.await {
        Ok(result) => result,
        Err(e) => Err(anyhow::anyhow!("Transcription task failed: {e}")),
    }
}

/// Builds the retained-audio path for a new recording.
///
/// The extension follows the configured ffmpeg codec.
fn recording_path(output_format: &str) -> anyhow::Result<PathBuf> {
    let codec = output_format.split_whitespace().next().unwrap_or("mp3");
    let extension = match codec {
        "libopus" | "libvorbis" => "ogg",
        "flac" => "flac",
        "aac" => "m4a",
        "pcm_s16le" => "wav",
        _ => codec,
    };

    let recordings_dir = data_dir()?.join("recordings");
    std::fs::create_dir_all(&recordings_dir)?;

    let filename = format!(
        "medscribe-{}.{extension}",
        Local::now().timestamp_millis()
    );
    Ok(recordings_dir.join(filename))
}

/// Shows a blocking full-screen error and cleans it up.
fn show_error_screen(message: &str) -> anyhow::Result<()> {
    let mut error_screen = ErrorScreen::new()?;
    error_screen.show_error(message)?;
    error_screen.cleanup()?;
    Ok(())
}
