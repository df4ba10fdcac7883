//! Configuration management for medscribe.
//!
//! This module handles loading and saving application configuration from TOML
//! files, as well as secure storage of API credentials. Configuration is
//! stored in the user's config directory, while credentials are stored with
//! restricted permissions in the user's local data directory.

pub mod file;
pub mod secrets;

pub use file::{MedscribeConfig, VisualizationType};
pub use secrets::{get_api_key, get_selected_model, save_api_key, save_selected_model};
