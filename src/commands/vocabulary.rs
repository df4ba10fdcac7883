//! Clinical vocabulary management command.

use crate::vocabulary::{VocabularyManager, VocabularyViewer};

/// Opens the interactive vocabulary editor.
///
/// Terms added here are sent with every transcription request to bias
/// recognition toward domain terminology.
pub async fn handle_vocabulary() -> Result<(), anyhow::Error> {
    tracing::info!("=== medscribe Vocabulary Editor ===");

    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?
        .join(".config");

    let mut manager = VocabularyManager::new(&config_dir)?;
    let terms = manager.load_terms()?;

    let mut viewer = VocabularyViewer::new(terms)?;
    viewer.run(&mut manager)?;

    Ok(())
}
