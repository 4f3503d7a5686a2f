//! Reads job postings and CVs into plain text

use crate::error::{CvMatcherError, Result};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Routes a document to the extractor for its type, remembering results per path.
#[derive(Default)]
pub struct InputManager {
    extracted: HashMap<PathBuf, String>,
    bypass_cache: bool,
}

impl InputManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(mut self, enable: bool) -> Self {
        self.bypass_cache = !enable;
        self
    }

    /// Plain text of the document at `path`.
    pub async fn extract_text(&mut self, path: &Path) -> Result<String> {
        if let Some(text) = self.cached(path) {
            debug!("Reusing extracted text for {}", path.display());
            return Ok(text.to_string());
        }

        let text = read_document(path).await?;
        if !self.bypass_cache {
            self.extracted.insert(path.to_path_buf(), text.clone());
        }
        Ok(text)
    }

    fn cached(&self, path: &Path) -> Option<&str> {
        if self.bypass_cache {
            return None;
        }
        self.extracted.get(path).map(String::as_str)
    }

    pub fn clear_cache(&mut self) {
        self.extracted.clear();
    }

    pub fn cache_size(&self) -> usize {
        self.extracted.len()
    }
}

async fn read_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CvMatcherError::InvalidInput(format!(
            "File does not exist: {}",
            path.display()
        )));
    }

    let file_type = FileType::from_path(path)
        .ok_or_else(|| CvMatcherError::InvalidInput(format!("File has no extension: {}", path.display())))?;

    info!("Reading {:?} document {}", file_type, path.display());
    match file_type {
        FileType::Pdf => PdfExtractor.extract(path).await,
        FileType::Text => PlainTextExtractor.extract(path).await,
        FileType::Markdown => MarkdownExtractor.extract(path).await,
        FileType::Unknown => Err(CvMatcherError::UnsupportedFormat(format!(
            "No extractor for {}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_cached_text_survives_file_change() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cv.txt");
        std::fs::write(&path, "Rust developer").unwrap();

        let mut manager = InputManager::new();
        assert_eq!(manager.extract_text(&path).await.unwrap(), "Rust developer");

        std::fs::write(&path, "Go developer").unwrap();
        assert_eq!(manager.extract_text(&path).await.unwrap(), "Rust developer");
        assert_eq!(manager.cache_size(), 1);
    }

    #[tokio::test]
    async fn test_disabled_cache_rereads() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cv.txt");
        std::fs::write(&path, "first").unwrap();

        let mut manager = InputManager::new().with_cache(false);
        manager.extract_text(&path).await.unwrap();
        std::fs::write(&path, "second").unwrap();

        assert_eq!(manager.extract_text(&path).await.unwrap(), "second");
        assert_eq!(manager.cache_size(), 0);
    }

    #[tokio::test]
    async fn test_missing_extension_is_invalid_input() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("README");
        std::fs::write(&path, "text").unwrap();

        let result = InputManager::new().extract_text(&path).await;
        assert!(matches!(result, Err(CvMatcherError::InvalidInput(_))));
    }
}
