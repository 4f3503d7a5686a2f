//! Report model and output formatting

pub mod formatter;
pub mod report;

pub use formatter::ReportGenerator;
pub use report::{ComparisonMethod, ComparisonOutcome, MatchReport, ReportMetadata};
