//! Embedding model management for downloading and managing Model2Vec models

use crate::error::{CvMatcherError, Result};
use hf_hub::api::tokio::Api;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files a Model2Vec directory must contain to be loadable.
const REQUIRED_FILES: [&str; 3] = ["tokenizer.json", "model.safetensors", "config.json"];

/// Fetched when present, never required.
const OPTIONAL_FILES: [&str; 1] = ["README.md"];

/// Information about an available embedding model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelInfo {
    pub name: String,
    pub repo_id: String,
    pub size_mb: u64,
    pub description: String,
    pub model_type: EmbeddingModelType,
    pub dimensions: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum EmbeddingModelType {
    Model2Vec,
    Potion,
}

/// Built-in catalogue: (id, name, repo, size MB, description, type, dimensions).
const CATALOGUE: &[(&str, &str, &str, u64, &str, EmbeddingModelType, u32)] = &[
    (
        "potion-base-8M",
        "Potion Base 8M",
        "minishlab/potion-base-8M",
        33,
        "High-quality Model2Vec embeddings with 8M parameters",
        EmbeddingModelType::Potion,
        256,
    ),
    (
        "m2v-base",
        "Model2Vec Base",
        "minishlab/M2V_base_output",
        90,
        "Legacy Model2Vec base embeddings model",
        EmbeddingModelType::Model2Vec,
        256,
    ),
    (
        "m2v-large",
        "Model2Vec Large",
        "minishlab/M2V_large_output",
        250,
        "High-capacity Model2Vec large embeddings model",
        EmbeddingModelType::Model2Vec,
        512,
    ),
];

/// Hub repository for a catalogue id.
pub fn catalogue_repo_id(model_id: &str) -> Option<&'static str> {
    CATALOGUE
        .iter()
        .find(|entry| entry.0 == model_id)
        .map(|entry| entry.2)
}

/// Manager for embedding models - handles download, removal and lookup
pub struct EmbeddingModelManager {
    models_dir: PathBuf,
    available_models: BTreeMap<String, EmbeddingModelInfo>,
    downloaded_models: HashSet<String>,
}

impl EmbeddingModelManager {
    /// Create a new embedding model manager
    pub async fn new(models_dir: PathBuf) -> Result<Self> {
        if !models_dir.exists() {
            fs::create_dir_all(&models_dir).await?;
        }

        let available_models = CATALOGUE
            .iter()
            .map(|(id, name, repo_id, size_mb, description, model_type, dimensions)| {
                (
                    id.to_string(),
                    EmbeddingModelInfo {
                        name: name.to_string(),
                        repo_id: repo_id.to_string(),
                        size_mb: *size_mb,
                        description: description.to_string(),
                        model_type: *model_type,
                        dimensions: *dimensions,
                    },
                )
            })
            .collect();

        let mut manager = Self {
            models_dir,
            available_models,
            downloaded_models: HashSet::new(),
        };

        manager.scan_downloaded_models().await?;

        Ok(manager)
    }

    /// Scan for already downloaded models
    async fn scan_downloaded_models(&mut self) -> Result<()> {
        let mut entries = fs::read_dir(&self.models_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() && is_valid_model_directory(&entry.path()) {
                self.downloaded_models
                    .insert(entry.file_name().to_string_lossy().to_string());
            }
        }

        Ok(())
    }

    /// Download an embedding model from Hugging Face Hub
    pub async fn download_model(&mut self, model_id: &str, force: bool) -> Result<PathBuf> {
        let model_info = self
            .available_models
            .get(model_id)
            .ok_or_else(|| CvMatcherError::ModelNotFound(model_id.to_string()))?
            .clone();

        let model_dir = self.models_dir.join(model_id);

        if !force && self.downloaded_models.contains(model_id) {
            return Ok(model_dir);
        }

        info!(
            "Downloading embedding model {} ({} MB) from {}",
            model_info.name, model_info.size_mb, model_info.repo_id
        );

        fs::create_dir_all(&model_dir).await?;

        let api = Api::new()
            .map_err(|e| CvMatcherError::Network(format!("Failed to initialize HF API: {}", e)))?;
        let repo = api.repo(hf_hub::Repo::model(model_info.repo_id.clone()));

        for file in REQUIRED_FILES {
            let cached = repo.get(file).await.map_err(|e| {
                CvMatcherError::Network(format!("Failed to download required file {}: {}", file, e))
            })?;
            fs::copy(&cached, model_dir.join(file)).await?;
            info!("Downloaded {}", file);
        }

        for file in OPTIONAL_FILES {
            match repo.get(file).await {
                Ok(cached) => {
                    fs::copy(&cached, model_dir.join(file)).await?;
                }
                Err(e) => warn!("Optional file {} not found: {}", file, e),
            }
        }

        self.downloaded_models.insert(model_id.to_string());
        Ok(model_dir)
    }

    /// Delete a downloaded model directory
    pub async fn remove_model(&mut self, model_id: &str) -> Result<PathBuf> {
        if !self.downloaded_models.contains(model_id) {
            return Err(CvMatcherError::ModelNotFound(format!("{} is not downloaded", model_id)));
        }

        let model_dir = self.models_dir.join(model_id);
        fs::remove_dir_all(&model_dir).await?;
        self.downloaded_models.remove(model_id);
        Ok(model_dir)
    }

    /// Get path to a downloaded model
    pub fn get_model_path(&self, model_id: &str) -> Option<PathBuf> {
        if self.downloaded_models.contains(model_id) {
            Some(self.models_dir.join(model_id))
        } else {
            None
        }
    }

    /// All catalogue models, ordered by id
    pub fn list_available_models(&self) -> Vec<(&String, &EmbeddingModelInfo)> {
        self.available_models.iter().collect()
    }

    pub fn list_downloaded_models(&self) -> Vec<String> {
        let mut models: Vec<String> = self.downloaded_models.iter().cloned().collect();
        models.sort();
        models
    }

    pub fn get_model_info(&self, model_id: &str) -> Option<&EmbeddingModelInfo> {
        self.available_models.get(model_id)
    }

    pub fn is_model_downloaded(&self, model_id: &str) -> bool {
        self.downloaded_models.contains(model_id)
    }

    /// Resolve model ID from various formats (id, repo_id, name)
    pub fn resolve_model_id(&self, input: &str) -> Option<String> {
        if self.available_models.contains_key(input) {
            return Some(input.to_string());
        }

        if let Some((id, _)) = self.available_models.iter().find(|(_, info)| info.repo_id == input) {
            return Some(id.clone());
        }

        let input_lower = input.to_lowercase();
        self.available_models
            .iter()
            .find(|(_, info)| info.name.to_lowercase() == input_lower)
            .map(|(id, _)| id.clone())
    }
}

/// Whether `path` holds every file a Model2Vec model needs.
///
/// Directories left behind by an interrupted download fail this check.
pub fn is_valid_model_directory(path: &Path) -> bool {
    REQUIRED_FILES.iter().all(|file| path.join(file).is_file())
}
