//! Provider and model authentication.
//!
//! Unified authentication flow: select a provider/model combination and
//! optionally enter an API key. Users can keep existing API keys by pressing
//! Enter without entering anything.

use crate::config;
use crate::transcription;
use cliclack::{intro, note, outro, password, select};
use console::style;

/// Handles provider + model selection and API key management.
///
/// Shows all available provider/model combinations for the user to choose
/// from. If a provider already has an API key saved, the user can press Enter
/// to keep it. Supports switching between models of the same provider without
/// re-entering the API key.
pub async fn handle_auth() -> Result<(), anyhow::Error> {
    tracing::info!("=== medscribe Authentication ===");

    ctrlc::set_handler(move || {}).expect("setting Ctrl-C handler");

    intro(style(" medscribe auth ").on_white().black())?;

    if let Some(current_model_id) = config::get_selected_model().ok().flatten() {
        note("current model", current_model_id)?;
    }

    // Build list of all provider/model combinations
    let mut provider_model_options: Vec<(
        transcription::TranscriptionProvider,
        transcription::TranscriptionModel,
    )> = Vec::new();
    let mut display_options: Vec<String> = Vec::new();

    for provider in transcription::TranscriptionProvider::all() {
        for model in transcription::TranscriptionModel::models_for_provider(provider) {
            display_options.push(format!("{} / {}", provider.name(), model.description()));
            provider_model_options.push((provider.clone(), model));
        }
    }

    if provider_model_options.is_empty() {
        return Err(anyhow::anyhow!("No provider/model combinations available"));
    }

    let mut select_prompt = select("Select provider and model:");
    for (i, option) in display_options.iter().enumerate() {
        select_prompt = select_prompt.item(i, option, "");
    }
    let selected_idx: usize = select_prompt
        .interact()
        .map_err(|e| anyhow::anyhow!("Selection cancelled: {e}"))?;

    let (selected_provider, selected_model) = &provider_model_options[selected_idx];

    // Check if we already have an API key for this provider
    let current_api_key = config::get_api_key(selected_provider.id()).ok().flatten();

    let api_key = if current_api_key.is_some() {
        let prompt = format!(
            "Enter API key for {} (press Enter to keep current):",
            selected_provider.name()
        );
        password(&prompt)
            .allow_empty()
            .interact()
            .map_err(|e| anyhow::anyhow!("API key input cancelled: {e}"))?
    } else {
        let prompt = format!("Enter API key for {}:", selected_provider.name());
        password(&prompt)
            .interact()
            .map_err(|e| anyhow::anyhow!("API key input cancelled: {e}"))?
    };

    // Empty input keeps the current key when one exists
    let api_key_to_save = if api_key.is_empty() {
        match current_api_key {
            Some(key) => key,
            None => return Err(anyhow::anyhow!("API key cannot be empty")),
        }
    } else {
        api_key
    };

    config::save_api_key(selected_provider.id(), &api_key_to_save)?;
    config::save_selected_model(selected_model.id())?;

    outro("✅ Configuration saved.")?;

    tracing::info!(
        "Authentication completed: provider={}, model={}",
        selected_provider.id(),
        selected_model.id()
    );

    Ok(())
}
