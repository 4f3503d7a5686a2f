//! cv-matcher: score a CV against a job posting

use chrono::Utc;
use clap::Parser;
use cv_matcher::cli::{self, Cli, Commands, ConfigAction, ModelAction, SUPPORTED_EXTENSIONS};
use cv_matcher::config::Config;
use cv_matcher::error::{CvMatcherError, Result};
use cv_matcher::input::InputManager;
use cv_matcher::output::formatter::{resolve_save_path, save_report_to_file, ReportGenerator};
use cv_matcher::output::{ComparisonMethod, ComparisonOutcome, MatchReport, ReportMetadata};
use cv_matcher::processing::embedding_comparator::EmbeddingComparator;
use cv_matcher::processing::embedding_manager::EmbeddingModelManager;
use cv_matcher::processing::embeddings::{Model2VecLoader, ModelLoader};
use cv_matcher::processing::keyword_analyzer::{AnalysisResult, KeywordAnalyzer};
use cv_matcher::processing::model_handle::ModelHandle;
use cv_matcher::processing::skills::SkillVocabulary;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Match {
            job,
            cv,
            method,
            output,
            save,
            fallback,
            detailed,
        } => {
            run_match(&config, MatchOptions { job, cv, method, output, save, fallback, detailed }).await
        }
        Commands::Models { action } => run_models(&config, action).await,
        Commands::Config { action } => run_config(&config, config_path, action),
    }
}

struct MatchOptions {
    job: PathBuf,
    cv: PathBuf,
    method: String,
    output: Option<String>,
    save: Option<PathBuf>,
    fallback: bool,
    detailed: bool,
}

async fn run_match(config: &Config, options: MatchOptions) -> Result<()> {
    let start_time = Instant::now();

    cli::validate_file_extension(&options.job, SUPPORTED_EXTENSIONS)
        .map_err(|e| CvMatcherError::InvalidInput(format!("Job posting file: {}", e)))?;
    cli::validate_file_extension(&options.cv, SUPPORTED_EXTENSIONS)
        .map_err(|e| CvMatcherError::InvalidInput(format!("CV file: {}", e)))?;

    let method: ComparisonMethod = options.method.parse().map_err(CvMatcherError::InvalidInput)?;
    let output_format = match &options.output {
        Some(format) => cli::parse_output_format(format).map_err(CvMatcherError::InvalidInput)?,
        None => config.output.format,
    };

    info!("Matching {} against {} ({})", options.cv.display(), options.job.display(), method);

    let mut input_manager = InputManager::new().with_cache(config.processing.enable_caching);
    let job_text = input_manager.extract_text(&options.job).await?;
    let cv_text = input_manager.extract_text(&options.cv).await?;
    info!(
        "Extracted {} characters from job posting, {} from CV",
        job_text.len(),
        cv_text.len()
    );

    let mut embedding_model = None;
    let mut fallback_reason = None;

    let outcome = match method {
        ComparisonMethod::Keyword => ComparisonOutcome::Keyword(keyword_analysis(config, &job_text, &cv_text)?),
        ComparisonMethod::Embedding => {
            embedding_model = Some(config.models.default_embedding_model.clone());
            match embedding_comparison(config, &job_text, &cv_text).await {
                Ok(outcome) => outcome,
                Err(e) if options.fallback && e.is_embedding_unavailable() => {
                    warn!("Embedding comparison unavailable, falling back to keyword analysis: {}", e);
                    fallback_reason = Some(e.to_string());
                    ComparisonOutcome::Keyword(keyword_analysis(config, &job_text, &cv_text)?)
                }
                Err(e) => return Err(e),
            }
        }
    };

    let metadata = ReportMetadata {
        generated_at: Utc::now(),
        job_path: options.job.display().to_string(),
        cv_path: options.cv.display().to_string(),
        requested_method: method,
        embedding_model,
        processing_time_ms: start_time.elapsed().as_millis() as u64,
        fallback_reason,
    };
    let report = MatchReport::new(metadata, outcome);

    let use_colors = config.output.color_output && options.save.is_none();
    let generator = ReportGenerator::with_options(
        use_colors,
        options.detailed || config.output.detailed,
        config.output.pretty_json,
        true,
    );
    let rendered = generator.generate_report(&report, &output_format)?;

    match &options.save {
        Some(target) => {
            let path = resolve_save_path(target, &output_format, &options.cv);
            save_report_to_file(&rendered, &path)?;
            println!("✅ Report saved to {}", path.display());
            println!("🎯 Match score: {}%", report.headline_score());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn keyword_analysis(config: &Config, job_text: &str, cv_text: &str) -> Result<AnalysisResult> {
    let vocabulary = SkillVocabulary::with_extra_skills(&config.keywords.extra_skills);
    let analyzer = KeywordAnalyzer::with_vocabulary(vocabulary)?;
    Ok(analyzer.analyze(job_text, cv_text))
}

async fn embedding_comparison(config: &Config, job_text: &str, cv_text: &str) -> Result<ComparisonOutcome> {
    let loader = Model2VecLoader::from_config(config);
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Comparing with embedding model {}", loader.describe()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let handle = Arc::new(ModelHandle::new(loader));
    let comparator = EmbeddingComparator::new(handle, (&config.embedding).into());
    let result = comparator.compare_texts(job_text, cv_text).await;

    spinner.finish_and_clear();
    Ok(ComparisonOutcome::Embedding(result?))
}

async fn run_models(config: &Config, action: ModelAction) -> Result<()> {
    let mut manager = EmbeddingModelManager::new(config.models_dir().clone()).await?;

    match action {
        ModelAction::List => {
            println!("🧠 Embedding Models\n");
            for (id, model) in manager.list_available_models() {
                let status = if manager.is_model_downloaded(id) {
                    "✅ Downloaded"
                } else {
                    "⬇️  Available"
                };
                let default_marker = if *id == config.models.default_embedding_model {
                    " (default)"
                } else {
                    ""
                };
                println!("  • {}{} ({}) - {} MB [{}]", id, default_marker, model.repo_id, model.size_mb, status);
                println!("    {}", model.description);
            }

            let downloaded = manager.list_downloaded_models();
            if downloaded.is_empty() {
                println!("\n💡 No models downloaded yet. Get started with:");
                println!("   cv-matcher models download {}", config.models.default_embedding_model);
            } else {
                println!("\n📁 Models directory: {}", config.models_dir().display());
            }
        }

        ModelAction::Download { model, force } => {
            let model_id = manager
                .resolve_model_id(&model)
                .ok_or_else(|| CvMatcherError::ModelNotFound(model.clone()))?;

            if !force && manager.is_model_downloaded(&model_id) {
                println!("✅ Model '{}' is already downloaded!", model_id);
                println!("💡 Use --force to re-download");
                return Ok(());
            }

            println!("⬇️  Downloading model: {}", model_id);
            let model_path = manager.download_model(&model_id, force).await?;
            println!("✅ Model '{}' downloaded successfully!", model_id);
            println!("📁 Location: {}", model_path.display());
        }

        ModelAction::Remove { model } => {
            let model_id = manager.resolve_model_id(&model).unwrap_or(model);
            let model_path = manager.remove_model(&model_id).await?;
            println!("✅ Model '{}' removed successfully!", model_id);
            println!("📁 Removed directory: {}", model_path.display());
        }

        ModelAction::Info { model } => {
            let model_id = manager
                .resolve_model_id(&model)
                .ok_or_else(|| CvMatcherError::ModelNotFound(model.clone()))?;
            let model_info = manager
                .get_model_info(&model_id)
                .ok_or_else(|| CvMatcherError::ModelNotFound(model_id.clone()))?;

            println!("📋 Model Information for '{}'\n", model_id);
            println!("Name: {}", model_info.name);
            println!("Repository: {}", model_info.repo_id);
            println!("Type: {:?}", model_info.model_type);
            println!("Dimensions: {}", model_info.dimensions);
            println!("Size: {} MB", model_info.size_mb);
            println!("Description: {}", model_info.description);

            match manager.get_model_path(&model_id) {
                Some(path) => {
                    println!("Status: ✅ Downloaded");
                    println!("Location: {}", path.display());
                }
                None => {
                    println!("Status: ⬇️  Available for download");
                    println!("\n💡 To download this model, run:");
                    println!("   cv-matcher models download {}", model_id);
                }
            }
        }
    }

    Ok(())
}

fn run_config(config: &Config, config_path: &Path, action: Option<ConfigAction>) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            println!("⚙️  Current Configuration\n");
            println!("Models Directory: {}", config.models_dir().display());
            println!("Default Embedding Model: {}", config.models.default_embedding_model);
            println!("\nEmbedding Thresholds:");
            println!("  Phrase: {:.2}", config.embedding.phrase_threshold);
            println!("  Match: {:.2}", config.embedding.match_threshold);
            println!("\nCategory Prompts:");
            for prompt in &config.embedding.category_prompts {
                println!("  • {}", prompt);
            }
            if !config.keywords.extra_skills.is_empty() {
                println!("\nExtra Skills: {}", config.keywords.extra_skills.join(", "));
            }
            println!("\nOutput Format: {:?}", config.output.format);
        }

        Some(ConfigAction::Reset) => {
            println!("🔄 Resetting configuration to defaults...");
            Config::default().save_to(config_path)?;
            println!("✅ Configuration reset successfully!");
        }

        Some(ConfigAction::Path) => {
            println!("{}", config_path.display());
        }
    }

    Ok(())
}
