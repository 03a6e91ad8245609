//! Gemini integration and analysis orchestration for PostPulse.
//!
//! The crate exposes the [`traits::LlmClient`] interface, the concrete
//! [`gemini::GeminiClient`], the prompt templates, and [`analyzer::analyze_post`]
//! which ties a client to the pure interpretation core in `pulse-analysis`.
//! Clients are built explicitly from configuration and passed to callers.
//!
//! # Examples
//! ```no_run
//! use pulse_common::{Result, SocialPlatform};
//! use pulse_config::PulseConfigLoader;
//! use pulse_llm::analyzer::{analyze_post, AnalyzerSettings};
//! use pulse_llm::ensure_llm_ready;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let cfg = PulseConfigLoader::new().with_optional_file("pulse.yaml").load()?;
//! let client = ensure_llm_ready(&cfg.llm)?;
//! let settings = AnalyzerSettings::from_config(&cfg.llm, &cfg.featured);
//! let outcome = analyze_post(client.as_ref(), &settings, SocialPlatform::X, "Hello!").await?;
//! println!("score: {}", outcome.analysis.overall_score);
//! # Ok(())
//! # }
//! ```
pub mod analyzer;
pub mod gemini;
pub mod prompts;
pub mod traits;

use gemini::GeminiClient;
use pulse_config::{LlmConfig, LlmProvider};
use std::sync::Arc;
use traits::LlmClient;

/// Build the configured LLM client, failing early when credentials are missing.
pub fn ensure_llm_ready(
    config: &LlmConfig,
) -> pulse_common::Result<Arc<dyn LlmClient + Send + Sync + 'static>> {
    match config.provider {
        LlmProvider::Gemini => {
            let api_key = config.require_api_key()?;
            let client = GeminiClient::new(api_key.to_string(), config.model.clone())?
                .with_base_url(config.endpoint.as_str());
            tracing::debug!(model = %config.model, endpoint = %config.endpoint, "llm.client.ready");
            Ok(Arc::new(client))
        }
    }
}
