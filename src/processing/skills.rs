//! Skill vocabulary used by the keyword analyzer

use std::collections::HashSet;

/// Built-in skill terms, in canonical order.
const DEFAULT_SKILLS: &[&str] = &[
    // Programming Languages
    "javascript", "typescript", "python", "java", "c++", "c#", "rust", "go", "ruby", "php", "swift", "kotlin",
    // Frontend
    "react", "vue", "angular", "svelte", "html", "css", "sass", "tailwind", "bootstrap",
    // Backend
    "node", "nodejs", "express", "django", "flask", "spring", "fastapi", "rails",
    // Databases
    "sql", "mysql", "postgresql", "mongodb", "redis", "firebase", "dynamodb",
    // Cloud & DevOps
    "aws", "azure", "gcp", "docker", "kubernetes", "ci/cd", "jenkins", "terraform",
    // Tools
    "git", "github", "gitlab", "jira", "figma", "vscode",
    // Soft Skills
    "leadership", "communication", "teamwork", "problem-solving", "analytical", "creative",
    "organized", "motivated", "detail-oriented", "self-starter", "collaborative",
    // Seniority and roles
    "senior", "junior", "lead", "manager", "architect", "full-stack", "frontend", "backend",
    // Qualifications
    "degree", "bachelor", "master", "phd", "certified", "certification",
    // Other tech
    "api", "rest", "graphql", "microservices", "agile", "scrum", "testing", "tdd",
];

/// Ordered, duplicate-free set of lowercase skill terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillVocabulary {
    terms: Vec<String>,
}

impl SkillVocabulary {
    /// Vocabulary with the built-in terms only.
    pub fn new() -> Self {
        Self::with_extra_skills(&[])
    }

    /// Built-in terms followed by `extra`, lowercased and trimmed.
    /// Blank entries and repeats are skipped; first occurrence wins.
    pub fn with_extra_skills(extra: &[String]) -> Self {
        let mut seen = HashSet::new();
        let terms = DEFAULT_SKILLS
            .iter()
            .map(|s| s.to_string())
            .chain(extra.iter().map(|s| s.trim().to_lowercase()))
            .filter(|term| !term.is_empty() && seen.insert(term.clone()))
            .collect();

        Self { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.terms.iter().any(|t| t == term)
    }
}

impl Default for SkillVocabulary {
    fn default() -> Self {
        Self::new()
    }
}
