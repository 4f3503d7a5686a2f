//! Text analysis: keyword scoring and embedding comparison

pub mod embedding_comparator;
pub mod embedding_manager;
pub mod embeddings;
pub mod keyword_analyzer;
pub mod model_handle;
pub mod phrases;
pub mod recommendations;
pub mod skills;
