//! Embedding backends and vector similarity

use anyhow::Context;
use crate::config::Config;
use crate::error::{CvMatcherError, Result};
use crate::processing::embedding_manager::{catalogue_repo_id, is_valid_model_directory};
use log::info;
use model2vec_rs::model::StaticModel;
use std::path::PathBuf;
use std::time::Instant;

/// A loaded sentence-embedding model.
pub trait EmbeddingModel: Send + Sync + 'static {
    /// Pooled embedding for `text`. Every call on one model yields vectors of the same length.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn name(&self) -> &str;
}

/// Produces an [`EmbeddingModel`]. Called from the blocking thread pool.
pub trait ModelLoader: Send + Sync + 'static {
    type Model: EmbeddingModel;

    fn load(&self) -> Result<Self::Model>;

    /// Where the model comes from, for log output.
    fn describe(&self) -> String;
}

/// Cosine similarity in [-1, 1].
///
/// Returns 0 when the lengths differ, a vector is empty, or a norm is zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Model2Vec static embeddings.
pub struct Model2VecModel {
    model: StaticModel,
    model_name: String,
}

impl EmbeddingModel for Model2VecModel {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = self.model.encode_single(text);
        if embedding.is_empty() {
            return Err(CvMatcherError::EmbeddingUnavailable(format!(
                "model '{}' returned no embedding",
                self.model_name
            )));
        }
        Ok(embedding)
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

/// Where a Model2Vec model is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// Directory containing `tokenizer.json`, `model.safetensors` and `config.json`.
    Local(PathBuf),
    /// Hugging Face repository id, fetched on load.
    Hub(String),
}

/// Loads a [`Model2VecModel`] from disk or the Hugging Face Hub.
pub struct Model2VecLoader {
    model_name: String,
    source: ModelSource,
}

impl Model2VecLoader {
    pub fn new(model_name: impl Into<String>, source: ModelSource) -> Self {
        Self {
            model_name: model_name.into(),
            source,
        }
    }

    /// Resolve the configured default model: a complete downloaded copy under the
    /// models directory wins, then a catalogue id, then the raw value as a
    /// local path or repo id.
    pub fn from_config(config: &Config) -> Self {
        Self::for_model(config, &config.models.default_embedding_model)
    }

    pub fn for_model(config: &Config, model: &str) -> Self {
        let local_path = config.models_dir().join(model);
        let source = if is_valid_model_directory(&local_path) {
            ModelSource::Local(local_path)
        } else if let Some(repo_id) = catalogue_repo_id(model) {
            ModelSource::Hub(repo_id.to_string())
        } else if PathBuf::from(model).exists() {
            ModelSource::Local(PathBuf::from(model))
        } else {
            ModelSource::Hub(model.to_string())
        };

        Self::new(model, source)
    }

    pub fn source(&self) -> &ModelSource {
        &self.source
    }
}

impl ModelLoader for Model2VecLoader {
    type Model = Model2VecModel;

    fn load(&self) -> Result<Model2VecModel> {
        let start_time = Instant::now();

        let location = match &self.source {
            ModelSource::Local(path) => path.to_string_lossy().into_owned(),
            ModelSource::Hub(repo_id) => repo_id.clone(),
        };

        let model = StaticModel::from_pretrained(
            &location,
            None, // token
            None, // normalize
            None, // subfolder
        )
        .with_context(|| format!("Failed to load model '{}'", location))
        .map_err(|e| CvMatcherError::EmbeddingUnavailable(format!("{:#}", e)))?;

        info!("Embedding model '{}' loaded in {:.2?}", self.model_name, start_time.elapsed());

        Ok(Model2VecModel {
            model,
            model_name: self.model_name.clone(),
        })
    }

    fn describe(&self) -> String {
        match &self.source {
            ModelSource::Local(path) => format!("{} ({})", self.model_name, path.display()),
            ModelSource::Hub(repo_id) => format!("{} (hub: {})", self.model_name, repo_id),
        }
    }
}
