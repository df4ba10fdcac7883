//! Clinical vocabulary management.
//!
//! Stores a list of domain terms (drug names, anatomy, specialist jargon)
//! that are passed to the transcription provider to bias recognition. Terms
//! live one per line in a plain text file under the config directory.

pub mod ui;

pub use ui::VocabularyViewer;

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Manages the vocabulary terms file.
pub struct VocabularyManager {
    file_path: PathBuf,
}

impl VocabularyManager {
    /// Creates a manager rooted in the given config directory.
    pub fn new(config_dir: &Path) -> Result<Self> {
        let dir = config_dir.join("medscribe");
        fs::create_dir_all(&dir)?;
        Ok(Self {
            file_path: dir.join("vocabulary.txt"),
        })
    }

    /// Loads all terms, skipping blank lines.
    pub fn load_terms(&self) -> Result<Vec<String>> {
        if !self.file_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.file_path)?;
        Ok(content
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }

    /// Adds a term unless it is already present (case-insensitive).
    pub fn add_term(&mut self, term: &str) -> Result<bool> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(false);
        }

        let mut terms = self.load_terms()?;
        if terms
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(term))
        {
            return Ok(false);
        }

        terms.push(term.to_string());
        self.save_terms(&terms)?;
        tracing::debug!("Vocabulary term added: {term}");
        Ok(true)
    }

    /// Removes the term at the given index, if it exists.
    pub fn remove_term(&mut self, index: usize) -> Result<Option<String>> {
        let mut terms = self.load_terms()?;
        if index >= terms.len() {
            return Ok(None);
        }

        let removed = terms.remove(index);
        self.save_terms(&terms)?;
        tracing::debug!("Vocabulary term removed: {removed}");
        Ok(Some(removed))
    }

    fn save_terms(&self, terms: &[String]) -> Result<()> {
        let mut content = terms.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(&self.file_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager_in_temp(name: &str) -> (VocabularyManager, PathBuf) {
        let dir = std::env::temp_dir().join(format!("medscribe-vocab-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        (VocabularyManager::new(&dir).unwrap(), dir)
    }

    #[test]
    fn empty_store_loads_no_terms() {
        let (manager, dir) = manager_in_temp("empty");
        assert!(manager.load_terms().unwrap().is_empty());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn add_and_remove_round_trip() {
        let (mut manager, dir) = manager_in_temp("roundtrip");

        assert!(manager.add_term("metoprolol").unwrap());
        assert!(manager.add_term("dyspnea").unwrap());
        assert_eq!(manager.load_terms().unwrap(), vec!["metoprolol", "dyspnea"]);

        assert_eq!(
            manager.remove_term(0).unwrap().as_deref(),
            Some("metoprolol")
        );
        assert_eq!(manager.load_terms().unwrap(), vec!["dyspnea"]);
        assert_eq!(manager.remove_term(5).unwrap(), None);

        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn duplicates_and_blanks_are_rejected() {
        let (mut manager, dir) = manager_in_temp("dupes");

        assert!(manager.add_term("Lisinopril").unwrap());
        assert!(!manager.add_term("lisinopril").unwrap());
        assert!(!manager.add_term("   ").unwrap());
        assert_eq!(manager.load_terms().unwrap().len(), 1);

        fs::remove_dir_all(dir).ok();
    }
}
