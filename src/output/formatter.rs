//! Output formatters: console, JSON and Markdown

use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::report::{similarity_percentage, ComparisonOutcome, MatchReport};
use crate::processing::embedding_comparator::EmbeddingComparisonResult;
use crate::processing::keyword_analyzer::AnalysisResult;
use colored::{Color, Colorize};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Trait for formatting match reports
pub trait OutputFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for machine consumption
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for saved reports
pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Report generator that dispatches to the formatter for a format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let (prefix, color) = match level {
            1 => ("█", Color::Blue),
            2 => ("▓", Color::Green),
            _ => ("▒", Color::Yellow),
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, score: u8) -> String {
        let (badge, color) = match score {
            80..=100 => ("EXCELLENT", Color::Green),
            60..=79 => ("GOOD", Color::BrightGreen),
            40..=59 => ("PARTIAL", Color::Yellow),
            _ => ("LOW", Color::BrightRed),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_list(&self, items: &[String], color: Color) -> String {
        if items.is_empty() {
            return "  (none)\n".to_string();
        }
        items
            .iter()
            .map(|item| format!("  • {}\n", self.colorize(item, color)))
            .collect()
    }

    fn format_keyword(&self, output: &mut String, result: &AnalysisResult) {
        output.push_str(&self.format_header("Skills", 2));
        output.push_str(&format!(
            "Job posting skills ({}):\n{}",
            result.job_skills.len(),
            self.format_list(&result.job_skills, Color::White)
        ));
        output.push_str(&format!(
            "Matching skills ({}):\n{}",
            result.matching_skills.len(),
            self.format_list(&result.matching_skills, Color::Green)
        ));
        output.push_str(&format!(
            "Missing skills ({}):\n{}",
            result.missing_skills.len(),
            self.format_list(&result.missing_skills, Color::Red)
        ));
        if self.detailed {
            output.push_str(&format!(
                "CV skills ({}):\n{}",
                result.cv_skills.len(),
                self.format_list(&result.cv_skills, Color::Cyan)
            ));
        }

        output.push_str(&self.format_header("Recommendations", 2));
        for (i, recommendation) in result.recommendations.iter().enumerate() {
            output.push_str(&format!("  {}. {}\n", i + 1, recommendation));
        }
    }

    fn format_embedding(&self, output: &mut String, result: &EmbeddingComparisonResult) {
        output.push_str(&format!(
            "Overall similarity: {:.3}\n",
            result.overall_similarity
        ));

        output.push_str(&self.format_header("Matched Requirements", 2));
        if result.matches.is_empty() {
            output.push_str("  (none)\n");
        }
        for m in &result.matches {
            output.push_str(&format!(
                "  ✅ {} ↔ {} ({:.1}%)\n",
                self.colorize(&m.job, Color::Green),
                m.cv,
                m.similarity * 100.0
            ));
        }

        output.push_str(&self.format_header("Gaps", 2));
        output.push_str(&self.format_list(&result.gaps, Color::Red));

        if self.detailed {
            output.push_str(&self.format_header("Extracted Phrases", 3));
            output.push_str(&format!(
                "Job posting ({}):\n{}",
                result.job_phrases.len(),
                self.format_list(&result.job_phrases, Color::White)
            ));
            output.push_str(&format!(
                "CV ({}):\n{}",
                result.cv_phrases.len(),
                self.format_list(&result.cv_phrases, Color::Cyan)
            ));
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut output = String::new();
        let metadata = &report.metadata;

        output.push_str(&self.format_header("📊 CV MATCH ANALYSIS", 1));
        output.push_str(&format!(
            "Generated: {} | Method: {} | Processing time: {}ms\n",
            metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.outcome.method(),
            metadata.processing_time_ms
        ));
        if let Some(model) = &metadata.embedding_model {
            output.push_str(&format!("Embedding model: {}\n", model));
        }
        if let Some(reason) = &metadata.fallback_reason {
            output.push_str(&self.colorize(
                &format!("⚠️  Embedding comparison unavailable ({}), used keyword analysis\n", reason),
                Color::Yellow,
            ));
        }

        let score = report.headline_score();
        output.push_str(&format!("\nMatch Score: {}% {}\n", score, self.format_score_badge(score)));

        match &report.outcome {
            ComparisonOutcome::Keyword(result) => self.format_keyword(&mut output, result),
            ComparisonOutcome::Embedding(result) => self.format_embedding(&mut output, result),
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_list(items: &[String]) -> String {
        if items.is_empty() {
            return "_None_\n".to_string();
        }
        items.iter().map(|item| format!("- {}\n", item)).collect()
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &MatchReport) -> Result<String> {
        let mut md = String::new();
        let metadata = &report.metadata;

        md.push_str("# CV Match Analysis\n\n");
        if self.include_metadata {
            md.push_str("| Field | Value |\n|---|---|\n");
            md.push_str(&format!("| Generated | {} |\n", metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")));
            md.push_str(&format!("| Job posting | `{}` |\n", metadata.job_path));
            md.push_str(&format!("| CV | `{}` |\n", metadata.cv_path));
            md.push_str(&format!("| Method | {} |\n", report.outcome.method()));
            if let Some(model) = &metadata.embedding_model {
                md.push_str(&format!("| Embedding model | {} |\n", model));
            }
            md.push('\n');
        }
        if let Some(reason) = &metadata.fallback_reason {
            md.push_str(&format!("> Embedding comparison unavailable ({}); keyword analysis used.\n\n", reason));
        }

        md.push_str(&format!("**Match score: {}%**\n\n", report.headline_score()));

        match &report.outcome {
            ComparisonOutcome::Keyword(result) => {
                md.push_str("## Matching Skills\n\n");
                md.push_str(&Self::markdown_list(&result.matching_skills));
                md.push_str("\n## Missing Skills\n\n");
                md.push_str(&Self::markdown_list(&result.missing_skills));
                md.push_str("\n## Recommendations\n\n");
                for (i, recommendation) in result.recommendations.iter().enumerate() {
                    let _ = writeln!(md, "{}. {}", i + 1, recommendation);
                }
            }
            ComparisonOutcome::Embedding(result) => {
                let _ = writeln!(
                    md,
                    "Overall similarity: {:.3} ({}%)\n",
                    result.overall_similarity,
                    similarity_percentage(result.overall_similarity)
                );
                md.push_str("## Matched Requirements\n\n");
                if result.matches.is_empty() {
                    md.push_str("_None_\n");
                } else {
                    md.push_str("| Job posting | CV | Similarity |\n|---|---|---|\n");
                    for m in &result.matches {
                        let _ = writeln!(md, "| {} | {} | {:.1}% |", m.job, m.cv, m.similarity * 100.0);
                    }
                }
                md.push_str("\n## Gaps\n\n");
                md.push_str(&Self::markdown_list(&result.gaps));
            }
        }

        Ok(md)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata),
        }
    }

    pub fn generate_report(&self, report: &MatchReport, format: &OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}

/// Where `--save` writes: `target` itself, or a suggested file name inside it
/// when `target` is an existing directory.
pub fn resolve_save_path(target: &Path, format: &OutputFormat, cv_path: &Path) -> PathBuf {
    if target.is_dir() {
        target.join(suggest_filename(format, &cv_path.to_string_lossy(), true))
    } else {
        target.to_path_buf()
    }
}

pub fn suggest_filename(format: &OutputFormat, cv_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(cv_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_match{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_match{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_match{}.md", base_name, timestamp_suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::{ComparisonMethod, ReportMetadata};
    use crate::processing::embedding_comparator::PhraseMatch;
    use chrono::Utc;
    use tempfile::TempDir;

    fn metadata(method: ComparisonMethod) -> ReportMetadata {
        ReportMetadata {
            generated_at: Utc::now(),
            job_path: "job.txt".to_string(),
            cv_path: "cv.pdf".to_string(),
            requested_method: method,
            embedding_model: None,
            processing_time_ms: 3,
            fallback_reason: None,
        }
    }

    fn keyword_report() -> MatchReport {
        MatchReport::new(
            metadata(ComparisonMethod::Keyword),
            ComparisonOutcome::Keyword(AnalysisResult {
                job_skills: vec!["react".to_string(), "typescript".to_string()],
                cv_skills: vec!["javascript".to_string(), "react".to_string()],
                matching_skills: vec!["react".to_string()],
                missing_skills: vec!["typescript".to_string()],
                match_score: 50,
                recommendations: vec!["📚 Priority skills to learn: typescript".to_string()],
            }),
        )
    }

    fn embedding_report() -> MatchReport {
        MatchReport::new(
            metadata(ComparisonMethod::Embedding),
            ComparisonOutcome::Embedding(EmbeddingComparisonResult {
                overall_similarity: 0.72,
                job_phrases: vec!["rust".to_string(), "kubernetes".to_string()],
                cv_phrases: vec!["rust services".to_string()],
                matches: vec![PhraseMatch {
                    job: "rust".to_string(),
                    cv: "rust services".to_string(),
                    similarity: 0.81,
                }],
                gaps: vec!["kubernetes".to_string()],
            }),
        )
    }

    #[test]
    fn test_console_without_colors() {
        let output = ConsoleFormatter::new(false, true).format_report(&keyword_report()).unwrap();
        assert!(output.contains("Match Score: 50% [PARTIAL]"));
        assert!(output.contains("• typescript"));
        assert!(output.contains("1. 📚 Priority skills to learn: typescript"));
        assert!(output.contains("CV skills (2)"));
    }

    #[test]
    fn test_console_embedding_report() {
        let output = ConsoleFormatter::new(false, false).format_report(&embedding_report()).unwrap();
        assert!(output.contains("Match Score: 72%"));
        assert!(output.contains("rust ↔ rust services (81.0%)"));
        assert!(output.contains("• kubernetes"));
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let output = JsonFormatter::new(false).format_report(&keyword_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["outcome"]["method"], "keyword");
        assert_eq!(value["outcome"]["result"]["matchScore"], 50);
        assert_eq!(value["outcome"]["result"]["missingSkills"][0], "typescript");
    }

    #[test]
    fn test_json_report_deserializes() {
        let report = embedding_report();
        let output = JsonFormatter::new(true).format_report(&report).unwrap();
        let parsed: MatchReport = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_markdown_sections() {
        let output = MarkdownFormatter::new(true).format_report(&embedding_report()).unwrap();
        assert!(output.starts_with("# CV Match Analysis"));
        assert!(output.contains("| rust | rust services | 81.0% |"));
        assert!(output.contains("## Gaps\n\n- kubernetes"));
    }

    #[test]
    fn test_fallback_reason_is_shown() {
        let mut report = keyword_report();
        report.metadata.requested_method = ComparisonMethod::Embedding;
        report.metadata.fallback_reason = Some("no model".to_string());

        let output = ConsoleFormatter::new(false, false).format_report(&report).unwrap();
        assert!(output.contains("Embedding comparison unavailable (no model)"));
    }

    #[test]
    fn test_save_into_directory_uses_suggested_name() {
        let temp_dir = TempDir::new().unwrap();
        let cv = Path::new("cvs/jane_cv.pdf");

        let path = resolve_save_path(temp_dir.path(), &OutputFormat::Json, cv);
        assert_eq!(path.parent(), Some(temp_dir.path()));
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("jane_cv_match_"));
        assert!(name.ends_with(".json"));

        let explicit = temp_dir.path().join("report.md");
        assert_eq!(resolve_save_path(&explicit, &OutputFormat::Markdown, cv), explicit);
    }

    #[test]
    fn test_save_and_suggest_filename() {
        let temp_dir = TempDir::new().unwrap();
        let name = suggest_filename(&OutputFormat::Markdown, "docs/jane_cv.pdf", false);
        assert_eq!(name, "jane_cv_match.md");

        let path = temp_dir.path().join("reports").join(&name);
        save_report_to_file("# report", &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# report");
    }
}
