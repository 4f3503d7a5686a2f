//! Keyword analyzer: vocabulary scan, match/gap computation and scoring

use crate::error::{CvMatcherError, Result};
use crate::processing::recommendations::generate_recommendations;
use crate::processing::skills::SkillVocabulary;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Outcome of a keyword comparison between a job posting and a CV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub job_skills: Vec<String>,
    pub cv_skills: Vec<String>,
    pub matching_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    /// 0 – 100
    pub match_score: u8,
    pub recommendations: Vec<String>,
}

/// Vocabulary term paired with its whole-word pattern.
struct SkillPattern {
    term: String,
    regex: Regex,
}

/// Scans text for vocabulary terms on word boundaries.
pub struct KeywordAnalyzer {
    vocabulary: SkillVocabulary,
    patterns: Vec<SkillPattern>,
}

impl KeywordAnalyzer {
    /// Analyzer over the built-in vocabulary.
    pub fn new() -> Result<Self> {
        Self::with_vocabulary(SkillVocabulary::new())
    }

    pub fn with_vocabulary(vocabulary: SkillVocabulary) -> Result<Self> {
        let patterns = vocabulary
            .terms()
            .iter()
            .map(|term| {
                // A match may not touch another letter or digit on either side.
                let pattern = format!(r"(?:^|[^\p{{L}}\p{{N}}]){}(?:$|[^\p{{L}}\p{{N}}])", regex::escape(term));
                Regex::new(&pattern)
                    .map(|regex| SkillPattern { term: term.clone(), regex })
                    .map_err(|e| {
                        CvMatcherError::Configuration(format!("Invalid skill term '{}': {}", term, e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { vocabulary, patterns })
    }

    /// Vocabulary terms occurring in `text`, sorted ascending.
    pub fn extract_skills(&self, text: &str) -> Vec<String> {
        let normalized = text.to_lowercase();

        let found: BTreeSet<&str> = self
            .patterns
            .iter()
            .filter(|p| p.regex.is_match(&normalized))
            .map(|p| p.term.as_str())
            .collect();

        found.into_iter().map(str::to_string).collect()
    }

    /// Compare a job posting against a CV.
    pub fn analyze(&self, job_posting: &str, cv: &str) -> AnalysisResult {
        let job_skills = self.extract_skills(job_posting);
        let cv_skills = self.extract_skills(cv);

        let cv_lookup: HashSet<String> = cv_skills.iter().map(|s| s.to_lowercase()).collect();

        let (matching_skills, missing_skills): (Vec<String>, Vec<String>) = job_skills
            .iter()
            .cloned()
            .partition(|skill| cv_lookup.contains(&skill.to_lowercase()));

        let match_score = calculate_match_score(matching_skills.len(), job_skills.len());

        debug!(
            "Keyword analysis: {} job skills, {} cv skills, {} matching, score {}",
            job_skills.len(),
            cv_skills.len(),
            matching_skills.len(),
            match_score
        );

        let recommendations = generate_recommendations(match_score, &matching_skills, &missing_skills, cv);

        AnalysisResult {
            job_skills,
            cv_skills,
            matching_skills,
            missing_skills,
            match_score,
            recommendations,
        }
    }

    pub fn vocabulary(&self) -> &SkillVocabulary {
        &self.vocabulary
    }

    pub fn skill_count(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Percentage of job skills matched, rounded half-up; 0 when there are no job skills.
pub fn calculate_match_score(matching: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let ratio = matching.min(total) as f64 / total as f64;
    (ratio * 100.0).round() as u8
}
