//! CV matcher library
//!
//! Two comparators score a CV against a job posting:
//! [`processing::keyword_analyzer::KeywordAnalyzer`] (synchronous, vocabulary based) and
//! [`processing::embedding_comparator::EmbeddingComparator`] (asynchronous, embedding based).

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{CvMatcherError, Result};
pub use processing::embedding_comparator::{EmbeddingComparator, EmbeddingComparisonResult, PhraseMatch};
pub use processing::keyword_analyzer::{AnalysisResult, KeywordAnalyzer};
