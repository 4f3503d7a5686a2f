//! Embedding-based comparison of a job posting and a CV

use crate::config::{default_category_prompts, EmbeddingConfig, DEFAULT_MATCH_THRESHOLD, DEFAULT_PHRASE_THRESHOLD};
use crate::error::Result;
use crate::processing::embeddings::{cosine_similarity, EmbeddingModel, ModelLoader};
use crate::processing::model_handle::{ModelHandle, ModelState};
use crate::processing::phrases::{clean_phrase, split_into_chunks};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A job phrase paired with its closest CV phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseMatch {
    pub job: String,
    pub cv: String,
    pub similarity: f32,
}

/// Outcome of an embedding comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingComparisonResult {
    pub overall_similarity: f32,
    pub job_phrases: Vec<String>,
    pub cv_phrases: Vec<String>,
    pub matches: Vec<PhraseMatch>,
    pub gaps: Vec<String>,
}

/// Similarity cut-offs and the skill-category prompts.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparatorSettings {
    /// A chunk is skill-like when its similarity to a prompt exceeds this.
    pub phrase_threshold: f32,
    /// A job phrase is matched when its best CV similarity exceeds this.
    pub match_threshold: f32,
    pub category_prompts: Vec<String>,
}

impl Default for ComparatorSettings {
    fn default() -> Self {
        Self {
            phrase_threshold: DEFAULT_PHRASE_THRESHOLD,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            category_prompts: default_category_prompts(),
        }
    }
}

impl From<&EmbeddingConfig> for ComparatorSettings {
    fn from(config: &EmbeddingConfig) -> Self {
        Self {
            phrase_threshold: config.phrase_threshold,
            match_threshold: config.match_threshold,
            category_prompts: config.category_prompts.clone(),
        }
    }
}

/// Compares texts through a shared, lazily loaded embedding model.
pub struct EmbeddingComparator<L: ModelLoader> {
    handle: Arc<ModelHandle<L>>,
    settings: ComparatorSettings,
}

impl<L: ModelLoader> EmbeddingComparator<L> {
    pub fn new(handle: Arc<ModelHandle<L>>, settings: ComparatorSettings) -> Self {
        Self { handle, settings }
    }

    pub fn settings(&self) -> &ComparatorSettings {
        &self.settings
    }

    pub fn model_state(&self) -> ModelState {
        self.handle.state()
    }

    /// Embedding for `text`, loading the model on first use.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let model = self.handle.get().await?;
        model.embed(text)
    }

    /// Cosine similarity between the embeddings of two texts.
    pub async fn calculate_similarity(&self, text1: &str, text2: &str) -> Result<f32> {
        let a = self.embed(text1).await?;
        let b = self.embed(text2).await?;
        Ok(cosine_similarity(&a, &b))
    }

    /// Chunks of `text` that resemble one of the category prompts, cleaned and
    /// deduplicated in first-occurrence order.
    pub async fn extract_skill_phrases(&self, text: &str) -> Result<Vec<String>> {
        let mut cache = EmbeddingCache::default();
        self.extract_with_cache(text, &mut cache).await
    }

    async fn extract_with_cache(&self, text: &str, cache: &mut EmbeddingCache) -> Result<Vec<String>> {
        let chunks = split_into_chunks(text);
        if chunks.is_empty() {
            return Ok(Vec::new());
        }

        let mut prompt_embeddings = Vec::with_capacity(self.settings.category_prompts.len());
        for prompt in &self.settings.category_prompts {
            prompt_embeddings.push(cache.get_or_embed(self, prompt).await?);
        }

        let mut phrases: Vec<String> = Vec::new();
        for chunk in &chunks {
            let chunk_embedding = cache.get_or_embed(self, chunk).await?;
            let is_skill_like = prompt_embeddings
                .iter()
                .any(|prompt| cosine_similarity(&chunk_embedding, prompt) > self.settings.phrase_threshold);

            if is_skill_like {
                let cleaned = clean_phrase(chunk);
                if !cleaned.is_empty() && !phrases.contains(&cleaned) {
                    phrases.push(cleaned);
                }
            }
        }

        debug!("Extracted {} skill phrases from {} chunks", phrases.len(), chunks.len());
        Ok(phrases)
    }

    /// Whole-document similarity plus phrase-level matches and gaps.
    pub async fn compare_texts(&self, job_posting: &str, cv: &str) -> Result<EmbeddingComparisonResult> {
        let overall_similarity = self.calculate_similarity(job_posting, cv).await?;

        let mut cache = EmbeddingCache::default();
        let job_phrases = self.extract_with_cache(job_posting, &mut cache).await?;
        let cv_phrases = self.extract_with_cache(cv, &mut cache).await?;

        let mut job_embedded = Vec::with_capacity(job_phrases.len());
        for phrase in &job_phrases {
            job_embedded.push((phrase.clone(), cache.get_or_embed(self, phrase).await?.to_vec()));
        }
        let mut cv_embedded = Vec::with_capacity(cv_phrases.len());
        for phrase in &cv_phrases {
            cv_embedded.push((phrase.clone(), cache.get_or_embed(self, phrase).await?.to_vec()));
        }

        let (matches, gaps) = pair_phrases(&job_embedded, &cv_embedded, self.settings.match_threshold);

        debug!(
            "Embedding comparison: overall {:.3}, {} job phrases, {} cv phrases, {} matches",
            overall_similarity,
            job_phrases.len(),
            cv_phrases.len(),
            matches.len()
        );

        Ok(EmbeddingComparisonResult {
            overall_similarity,
            job_phrases,
            cv_phrases,
            matches,
            gaps,
        })
    }
}

/// Per-call memo of embeddings keyed by exact text.
#[derive(Default)]
struct EmbeddingCache {
    entries: HashMap<String, Arc<Vec<f32>>>,
}

impl EmbeddingCache {
    async fn get_or_embed<L: ModelLoader>(
        &mut self,
        comparator: &EmbeddingComparator<L>,
        text: &str,
    ) -> Result<Arc<Vec<f32>>> {
        if let Some(embedding) = self.entries.get(text) {
            return Ok(Arc::clone(embedding));
        }
        let embedding = Arc::new(comparator.embed(text).await?);
        self.entries.insert(text.to_string(), Arc::clone(&embedding));
        Ok(embedding)
    }
}

/// Greedy best-match pairing.
///
/// Each job phrase takes the CV phrase with the highest similarity, the
/// earliest one on ties, and counts as matched only above `threshold`.
/// Unmatched job phrases are returned as gaps in their original order.
pub fn pair_phrases<E: AsRef<[f32]>>(
    job: &[(String, E)],
    cv: &[(String, E)],
    threshold: f32,
) -> (Vec<PhraseMatch>, Vec<String>) {
    let mut matches = Vec::new();
    let mut gaps = Vec::new();

    for (job_phrase, job_embedding) in job {
        let mut best: Option<(&str, f32)> = None;
        for (cv_phrase, cv_embedding) in cv {
            let similarity = cosine_similarity(job_embedding.as_ref(), cv_embedding.as_ref());
            if best.map_or(true, |(_, best_similarity)| similarity > best_similarity) {
                best = Some((cv_phrase.as_str(), similarity));
            }
        }

        match best {
            Some((cv_phrase, similarity)) if similarity > threshold => matches.push(PhraseMatch {
                job: job_phrase.clone(),
                cv: cv_phrase.to_string(),
                similarity,
            }),
            _ => gaps.push(job_phrase.clone()),
        }
    }

    (matches, gaps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CvMatcherError;

    fn embedded(items: &[(&str, Vec<f32>)]) -> Vec<(String, Vec<f32>)> {
        items.iter().map(|(p, e)| (p.to_string(), e.clone())).collect()
    }

    #[test]
    fn test_similarity_exactly_at_threshold_is_not_a_match() {
        let job = embedded(&[("rust", vec![1.0, 0.0, 0.0, 0.0])]);
        let cv = embedded(&[("systems", vec![1.0, 1.0, 1.0, 1.0])]);

        let (matches, gaps) = pair_phrases(&job, &cv, 0.5);
        assert!(matches.is_empty());
        assert_eq!(gaps, vec!["rust"]);
    }

    #[test]
    fn test_similarity_above_threshold_matches() {
        let job = embedded(&[("rust", vec![1.0, 0.0])]);
        let cv = embedded(&[("rust lang", vec![0.9, 0.1])]);

        let (matches, gaps) = pair_phrases(&job, &cv, 0.5);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].job, "rust");
        assert_eq!(matches[0].cv, "rust lang");
        assert!(matches[0].similarity > 0.9);
        assert!(gaps.is_empty());
    }

    #[test]
    fn test_best_match_wins_and_ties_keep_first() {
        let job = embedded(&[("docker", vec![1.0, 0.0])]);
        let cv = embedded(&[
            ("weak", vec![0.6, 0.8]),
            ("first best", vec![2.0, 0.0]),
            ("second best", vec![3.0, 0.0]),
        ]);

        let (matches, _) = pair_phrases(&job, &cv, 0.5);
        assert_eq!(matches[0].cv, "first best");
        assert_eq!(matches[0].similarity, 1.0);
    }

    #[test]
    fn test_no_cv_phrases_means_all_gaps() {
        let job = embedded(&[("a", vec![1.0]), ("b", vec![1.0])]);
        let (matches, gaps) = pair_phrases(&job, &[], 0.5);
        assert!(matches.is_empty());
        assert_eq!(gaps, vec!["a", "b"]);
    }

    #[test]
    fn test_gaps_keep_job_order() {
        let job = embedded(&[
            ("x", vec![0.0, 1.0]),
            ("y", vec![1.0, 0.0]),
            ("z", vec![0.0, 1.0]),
        ]);
        let cv = embedded(&[("y2", vec![1.0, 0.0])]);

        let (matches, gaps) = pair_phrases(&job, &cv, 0.5);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].job, "y");
        assert_eq!(gaps, vec!["x", "z"]);
    }

    struct FailingLoader;

    struct NeverModel;

    impl EmbeddingModel for NeverModel {
        fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "never"
        }
    }

    impl ModelLoader for FailingLoader {
        type Model = NeverModel;

        fn load(&self) -> Result<NeverModel> {
            Err(CvMatcherError::EmbeddingUnavailable("no model asset".to_string()))
        }

        fn describe(&self) -> String {
            "failing loader".to_string()
        }
    }

    /// Maps text to fixed vectors by keyword: "skill" and "rust" sit on the
    /// prompt direction, "edge" sits at exactly 0.5 from it, anything else is orthogonal.
    struct KeywordModel;

    impl EmbeddingModel for KeywordModel {
        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            let vector = if lower.contains("skill") || lower.contains("rust") {
                vec![1.0, 1.0, 1.0, 1.0]
            } else if lower.contains("edge") {
                vec![1.0, 0.0, 0.0, 0.0]
            } else {
                vec![0.0, 1.0, -1.0, 0.0]
            };
            Ok(vector)
        }

        fn name(&self) -> &str {
            "keyword"
        }
    }

    struct KeywordLoader;

    impl ModelLoader for KeywordLoader {
        type Model = KeywordModel;

        fn load(&self) -> Result<KeywordModel> {
            Ok(KeywordModel)
        }

        fn describe(&self) -> String {
            "keyword loader".to_string()
        }
    }

    fn keyword_comparator(phrase_threshold: f32) -> EmbeddingComparator<KeywordLoader> {
        EmbeddingComparator::new(
            Arc::new(ModelHandle::new(KeywordLoader)),
            ComparatorSettings {
                phrase_threshold,
                match_threshold: DEFAULT_MATCH_THRESHOLD,
                category_prompts: vec!["skill".to_string()],
            },
        )
    }

    #[tokio::test]
    async fn test_chunk_exactly_at_phrase_threshold_is_dropped() {
        let comparator = keyword_comparator(0.5);

        let phrases = comparator
            .extract_skill_phrases("Rust tooling. Edge computing. Gardening")
            .await
            .unwrap();
        assert_eq!(phrases, vec!["rust tooling"]);

        let lowered = keyword_comparator(0.49);
        let phrases = lowered
            .extract_skill_phrases("Rust tooling. Edge computing. Gardening")
            .await
            .unwrap();
        assert_eq!(phrases, vec!["rust tooling", "edge computing"]);
    }

    #[tokio::test]
    async fn test_cleaned_phrases_are_deduplicated_in_order() {
        let comparator = keyword_comparator(0.35);

        let phrases = comparator
            .extract_skill_phrases("Rust services. rust services. * Rust Services. Edge skills")
            .await
            .unwrap();
        assert_eq!(phrases, vec!["rust services", "edge skills"]);
    }

    #[tokio::test]
    async fn test_empty_inputs_compare_cleanly() {
        let comparator = keyword_comparator(0.35);

        assert!(comparator.extract_skill_phrases("").await.unwrap().is_empty());

        let result = comparator.compare_texts("", "").await.unwrap();
        assert!(result.job_phrases.is_empty());
        assert!(result.cv_phrases.is_empty());
        assert!(result.matches.is_empty());
        assert!(result.gaps.is_empty());
    }

    #[tokio::test]
    async fn test_load_failure_propagates() {
        let comparator = EmbeddingComparator::new(
            Arc::new(ModelHandle::new(FailingLoader)),
            ComparatorSettings::default(),
        );

        let result = comparator.compare_texts("Rust developer", "Rust").await;
        assert!(matches!(result, Err(CvMatcherError::EmbeddingUnavailable(_))));
        assert!(matches!(comparator.model_state(), ModelState::Failed(_)));
    }
}
