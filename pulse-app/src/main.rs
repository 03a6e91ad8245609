use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pulse_common::SocialPlatform;
use pulse_common::observability::{LogConfig, default_data_dir, init_logging};
use pulse_config::{
    FeaturedConfig, HistoryConfig, LoggingConfig, PulseConfig, PulseConfigLoader,
};
use pulse_history::{History, SqliteHistoryStore};
use pulse_llm::analyzer::{AnalysisOutcome, AnalyzerSettings, analyze_post};
use pulse_llm::ensure_llm_ready;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod render;

const APP_NAME: &str = "postpulse";
const DEFAULT_CONFIG_FILE: &str = "pulse.yaml";

/// PostPulse - social media post and business review analyzer
#[derive(Parser, Debug)]
#[command(name = "pulse", version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: ./pulse.yaml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a post, a profile URL or a business
    Analyze {
        /// x, instagram, facebook, google or tiktok
        #[arg(short, long)]
        platform: SocialPlatform,

        /// Post text or URL; Google and Instagram default to the featured business
        post: Option<String>,

        /// Print the normalized analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// List past analyses, newest first
    History {
        #[arg(long)]
        json: bool,
    },
    /// Score trend, top themes and feedback breakdown
    Dashboard,
    /// Delete all recorded analyses
    ClearHistory,
    /// Check that the model endpoint answers
    Health,
}

fn load_config(path: Option<&Path>) -> Result<PulseConfig> {
    let loader = match path {
        Some(p) => PulseConfigLoader::new().with_file(p),
        None => PulseConfigLoader::new().with_optional_file(DEFAULT_CONFIG_FILE),
    };
    loader.load().context("failed to load configuration")
}

fn log_config(logging: &LoggingConfig) -> LogConfig {
    LogConfig {
        app_name: APP_NAME,
        log_dir: logging.dir.clone(),
        emit_stderr: logging.emit_stderr,
        format: logging.format,
        default_filter: logging.filter.clone(),
    }
}

async fn open_history(cfg: &HistoryConfig) -> Result<History> {
    let url = match &cfg.database_url {
        Some(url) => url.clone(),
        None => {
            let dir = default_data_dir(APP_NAME);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create data directory: {}", dir.display()))?;
            format!("sqlite://{}?mode=rwc", dir.join("history.db").display())
        }
    };
    let store = SqliteHistoryStore::connect(&url)
        .await
        .with_context(|| format!("failed to open history database: {url}"))?;
    Ok(History::open(Box::new(store), cfg.max_entries).await)
}

/// The text to analyze; blank input falls back to the featured business where
/// one exists for the platform.
fn resolve_post(featured: &FeaturedConfig, platform: SocialPlatform, post: Option<&str>) -> String {
    let post = post.map(str::trim).unwrap_or_default();
    if !post.is_empty() {
        return post.to_string();
    }
    match platform {
        SocialPlatform::Google => featured.google_business.clone(),
        SocialPlatform::Instagram => featured.instagram_profile.clone(),
        _ => String::new(),
    }
}

async fn run_analyze(
    cfg: &PulseConfig,
    platform: SocialPlatform,
    post: Option<String>,
    json: bool,
) -> Result<ExitCode> {
    let post = resolve_post(&cfg.featured, platform, post.as_deref());
    let settings = AnalyzerSettings::from_config(&cfg.llm, &cfg.featured);

    let outcome = match ensure_llm_ready(&cfg.llm) {
        Ok(client) => analyze_post(client.as_ref(), &settings, platform, &post)
            .await
            .map_err(anyhow::Error::from),
        Err(err) => Err(err.into()),
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(error = %err, platform = %platform, "app.analyze.failed");
            eprintln!("Analysis failed: {err}");
            return Ok(ExitCode::FAILURE);
        }
    };

    save_to_history(&cfg.history, &outcome, platform, &post).await;
    print!("{}", render_outcome(&outcome, platform, json)?);
    Ok(ExitCode::SUCCESS)
}

/// Record a finished analysis. Failures only warn; the result is still shown.
async fn save_to_history(
    cfg: &HistoryConfig,
    outcome: &AnalysisOutcome,
    platform: SocialPlatform,
    post: &str,
) -> bool {
    let saved = match open_history(cfg).await {
        Ok(mut history) => history
            .record(outcome.analysis.clone(), platform, post)
            .await
            .map_err(anyhow::Error::from),
        Err(err) => Err(err),
    };
    match saved {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = %err, "app.history.save_failed");
            eprintln!("warning: could not save this analysis to history: {err:#}");
            false
        }
    }
}

fn render_outcome(outcome: &AnalysisOutcome, platform: SocialPlatform, json: bool) -> Result<String> {
    if json {
        let body = serde_json::json!({
            "analysis": outcome.analysis,
            "sources": outcome.sources,
        });
        return Ok(format!("{}\n", serde_json::to_string_pretty(&body)?));
    }
    Ok(format!(
        "{} analysis\n\n{}",
        platform.label(),
        render::analysis(&outcome.analysis, &outcome.sources)
    ))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let cfg = load_config(cli.config.as_deref())?;
    let log_path = init_logging(log_config(&cfg.logging))?;
    tracing::debug!(log = %log_path.display(), command = ?cli.command, "app.start");

    match cli.command {
        Command::Analyze {
            platform,
            post,
            json,
        } => run_analyze(&cfg, platform, post, json).await,
        Command::History { json } => {
            let history = open_history(&cfg.history).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(history.entries())?);
            } else {
                print!("{}", render::history(history.entries()));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Dashboard => {
            let history = open_history(&cfg.history).await?;
            print!("{}", render::dashboard(history.entries()));
            Ok(ExitCode::SUCCESS)
        }
        Command::ClearHistory => {
            let mut history = open_history(&cfg.history).await?;
            let removed = history.entries().len();
            history.clear().await?;
            println!("Cleared {removed} analyses.");
            Ok(ExitCode::SUCCESS)
        }
        Command::Health => {
            let client = ensure_llm_ready(&cfg.llm)?;
            if client.health_check().await? {
                println!("{}: OK", client.model_name());
                Ok(ExitCode::SUCCESS)
            } else {
                println!("{}: unavailable", client.model_name());
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
