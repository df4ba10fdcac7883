//! Secure storage of API credentials and model selection.
//!
//! Credentials live outside the editable config file, in a TOML document
//! under the user's local data directory with permissions restricted to the
//! owner. The selected model is stored alongside the keys so switching
//! providers never requires re-entering a key.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// On-disk secrets document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Secrets {
    /// Currently selected model ID, if any
    #[serde(default)]
    selected_model: Option<String>,
    /// API keys by provider ID
    #[serde(default)]
    api_keys: HashMap<String, String>,
}

/// Retrieves the stored API key for a provider, if any.
pub fn get_api_key(provider_id: &str) -> anyhow::Result<Option<String>> {
    let secrets = load_secrets()?;
    Ok(secrets.api_keys.get(provider_id).cloned())
}

/// Saves an API key for a provider, creating the secrets file if needed.
pub fn save_api_key(provider_id: &str, api_key: &str) -> anyhow::Result<()> {
    let mut secrets = load_secrets()?;
    secrets.api_keys.insert(provider_id.to_string(), api_key.to_string());
    store_secrets(&secrets)?;
    tracing::info!("API key saved for provider '{provider_id}'");
    Ok(())
}

/// Retrieves the currently selected model ID, if any.
pub fn get_selected_model() -> anyhow::Result<Option<String>> {
    let secrets = load_secrets()?;
    Ok(secrets.selected_model)
}

/// Saves the selected model ID.
pub fn save_selected_model(model_id: &str) -> anyhow::Result<()> {
    let mut secrets = load_secrets()?;
    secrets.selected_model = Some(model_id.to_string());
    store_secrets(&secrets)?;
    tracing::info!("Selected model saved: {model_id}");
    Ok(())
}

/// Loads the secrets document, returning defaults when the file is absent.
fn load_secrets() -> anyhow::Result<Secrets> {
    let path = secrets_path()?;
    if !path.exists() {
        return Ok(Secrets::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| anyhow!("Failed to read secrets file: {e}"))?;
    let secrets: Secrets = toml::from_str(&content)
        .map_err(|e| anyhow!("Secrets file is malformed: {e}"))?;
    Ok(secrets)
}

/// Writes the secrets document with owner-only permissions.
fn store_secrets(secrets: &Secrets) -> anyhow::Result<()> {
    let path = secrets_path()?;
    let content = toml::to_string_pretty(secrets)?;
    fs::write(&path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        fs::set_permissions(&path, perms)?;
    }

    Ok(())
}

/// Path to the secrets file, creating the data directory if needed.
fn secrets_path() -> anyhow::Result<PathBuf> {
    let data_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".local")
        .join("share")
        .join("medscribe");
    fs::create_dir_all(&data_dir)?;
    Ok(data_dir.join("secrets.toml"))
}
