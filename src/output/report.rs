//! Report structure shared by all output formats

use crate::processing::embedding_comparator::EmbeddingComparisonResult;
use crate::processing::keyword_analyzer::AnalysisResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which comparator produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMethod {
    Keyword,
    Embedding,
}

impl fmt::Display for ComparisonMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonMethod::Keyword => write!(f, "keyword"),
            ComparisonMethod::Embedding => write!(f, "embedding"),
        }
    }
}

impl FromStr for ComparisonMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "keyword" | "keywords" => Ok(ComparisonMethod::Keyword),
            "embedding" | "embeddings" | "semantic" => Ok(ComparisonMethod::Embedding),
            _ => Err(format!("Invalid method: {}. Supported: keyword, embedding", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "result", rename_all = "lowercase")]
pub enum ComparisonOutcome {
    Keyword(AnalysisResult),
    Embedding(EmbeddingComparisonResult),
}

impl ComparisonOutcome {
    pub fn method(&self) -> ComparisonMethod {
        match self {
            ComparisonOutcome::Keyword(_) => ComparisonMethod::Keyword,
            ComparisonOutcome::Embedding(_) => ComparisonMethod::Embedding,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub generated_at: DateTime<Utc>,
    pub job_path: String,
    pub cv_path: String,
    pub requested_method: ComparisonMethod,
    pub embedding_model: Option<String>,
    pub processing_time_ms: u64,
    /// Set when the embedding comparison failed and the keyword analyzer ran instead.
    pub fallback_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub metadata: ReportMetadata,
    pub outcome: ComparisonOutcome,
}

impl MatchReport {
    pub fn new(metadata: ReportMetadata, outcome: ComparisonOutcome) -> Self {
        Self { metadata, outcome }
    }

    /// Headline score on a 0–100 scale.
    pub fn headline_score(&self) -> u8 {
        match &self.outcome {
            ComparisonOutcome::Keyword(result) => result.match_score,
            ComparisonOutcome::Embedding(result) => similarity_percentage(result.overall_similarity),
        }
    }
}

/// Cosine similarity as a percentage, negatives clamped to 0.
pub fn similarity_percentage(similarity: f32) -> u8 {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!("keyword".parse::<ComparisonMethod>(), Ok(ComparisonMethod::Keyword));
        assert_eq!("Embedding".parse::<ComparisonMethod>(), Ok(ComparisonMethod::Embedding));
        assert!("llm".parse::<ComparisonMethod>().is_err());
    }

    #[test]
    fn test_similarity_percentage() {
        assert_eq!(similarity_percentage(0.734), 73);
        assert_eq!(similarity_percentage(-0.2), 0);
        assert_eq!(similarity_percentage(1.0), 100);
    }
}
