//! Configuration management for the CV matcher

use crate::error::{CvMatcherError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default threshold above which a chunk counts as skill-like.
pub const DEFAULT_PHRASE_THRESHOLD: f32 = 0.35;

/// Default threshold above which a job phrase is matched to a CV phrase.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub models: ModelConfig,
    pub keywords: KeywordConfig,
    pub embedding: EmbeddingConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub models_dir: PathBuf,
    pub default_embedding_model: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    /// Terms appended to the built-in skill vocabulary.
    pub extra_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub phrase_threshold: f32,
    pub match_threshold: f32,
    pub category_prompts: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    pub enable_caching: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
    pub pretty_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

/// Prompts describing skill-like concepts, compared in this order.
pub fn default_category_prompts() -> Vec<String> {
    [
        "programming language or technology skill",
        "software development framework or tool",
        "professional work experience",
        "soft skill or interpersonal ability",
        "education or certification",
        "technical competency",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models: ModelConfig::default(),
            keywords: KeywordConfig::default(),
            embedding: EmbeddingConfig::default(),
            processing: ProcessingConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        let models_dir = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cv-matcher")
            .join("models");

        Self {
            models_dir,
            default_embedding_model: "potion-base-8M".to_string(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            phrase_threshold: DEFAULT_PHRASE_THRESHOLD,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            category_prompts: default_category_prompts(),
        }
    }
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self { enable_caching: true }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
            pretty_json: true,
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults on first use.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)
                .map_err(|e| CvMatcherError::Configuration(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| CvMatcherError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-matcher")
            .join("config.toml")
    }

    /// Reject threshold values outside the cosine range and empty prompt lists.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("embedding.phrase_threshold", self.embedding.phrase_threshold),
            ("embedding.match_threshold", self.embedding.match_threshold),
        ] {
            if !(-1.0..=1.0).contains(&value) {
                return Err(CvMatcherError::Configuration(format!(
                    "{} must be within [-1, 1], got {}",
                    name, value
                )));
            }
        }

        if self.embedding.category_prompts.iter().all(|p| p.trim().is_empty()) {
            return Err(CvMatcherError::Configuration(
                "embedding.category_prompts must contain at least one prompt".to_string(),
            ));
        }

        Ok(())
    }

    pub fn models_dir(&self) -> &PathBuf {
        &self.models.models_dir
    }
}
