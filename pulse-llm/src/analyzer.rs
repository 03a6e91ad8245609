//! One analysis request: pick the prompt, model and grounding, call the
//! model and interpret what comes back.
use crate::prompts;
use crate::traits::{GenerateOptions, GroundingChunk, GroundingTool, LlmClient};
use pulse_analysis::{interpret, AnalysisResult, ResponseError};
use pulse_common::{PulseError, SocialPlatform};
use pulse_config::{FeaturedConfig, LlmConfig};
use serde_json::Value as JsonValue;

/// Knobs the analyzer needs, lifted out of the loaded configuration.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    pub model: String,
    pub profile_model: String,
    /// Full URL of the featured Instagram profile.
    pub featured_profile_url: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl AnalyzerSettings {
    pub fn from_config(llm: &LlmConfig, featured: &FeaturedConfig) -> Self {
        Self {
            model: llm.model.clone(),
            profile_model: llm.profile_model.clone(),
            featured_profile_url: featured.instagram_profile.clone(),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
        }
    }

    /// Host and path of the featured profile, e.g. `instagram.com/dreamgreencsc`.
    pub fn profile_marker(&self) -> String {
        let url = self.featured_profile_url.trim().to_lowercase();
        let url = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .unwrap_or(&url);
        let url = url.strip_prefix("www.").unwrap_or(url);
        let end = url.find(['?', '#']).unwrap_or(url.len());
        url[..end].trim_end_matches('/').to_string()
    }
}

/// A successful analysis plus the sources the model cited.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub analysis: AnalysisResult,
    pub sources: Vec<GroundingChunk>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// The request never produced a model reply.
    #[error(transparent)]
    Transport(#[from] PulseError),

    /// The model answered in prose; the text is meant for the user.
    #[error("{0}")]
    Declined(String),

    #[error(transparent)]
    Malformed(ResponseError),
}

impl From<ResponseError> for AnalyzeError {
    fn from(err: ResponseError) -> Self {
        match err {
            ResponseError::NoStructuredOutput { message } => AnalyzeError::Declined(message),
            other => AnalyzeError::Malformed(other),
        }
    }
}

/// Which prompt family a request falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    FeaturedProfile,
    Reviews,
    Post { is_url: bool },
}

/// Everything decided before the network call.
#[derive(Debug, Clone)]
pub struct AnalysisPlan {
    pub kind: RequestKind,
    pub prompt: String,
    pub options: GenerateOptions,
}

impl AnalysisPlan {
    pub fn grounded(&self) -> bool {
        !self.options.tools.is_empty()
    }
}

fn classify(settings: &AnalyzerSettings, platform: SocialPlatform, post: &str) -> RequestKind {
    let marker = settings.profile_marker();
    if platform == SocialPlatform::Instagram
        && !marker.is_empty()
        && post.to_lowercase().contains(&marker)
    {
        return RequestKind::FeaturedProfile;
    }
    if platform == SocialPlatform::Google {
        return RequestKind::Reviews;
    }
    RequestKind::Post {
        is_url: post.starts_with("http"),
    }
}

/// Build the prompt and generation options for a request without calling out.
pub fn plan_analysis(
    settings: &AnalyzerSettings,
    platform: SocialPlatform,
    post: &str,
) -> AnalysisPlan {
    let post = post.trim();
    let kind = classify(settings, platform, post);

    let (prompt, model, tools) = match kind {
        RequestKind::FeaturedProfile => (
            prompts::profile_prompt(&settings.featured_profile_url),
            settings.profile_model.clone(),
            vec![GroundingTool::GoogleSearch],
        ),
        RequestKind::Reviews => (
            prompts::reviews_prompt(post),
            settings.model.clone(),
            vec![GroundingTool::GoogleMaps, GroundingTool::GoogleSearch],
        ),
        RequestKind::Post { is_url: true } => (
            prompts::post_prompt(platform, post, true),
            settings.model.clone(),
            vec![GroundingTool::GoogleSearch],
        ),
        RequestKind::Post { is_url: false } => (
            prompts::post_prompt(platform, post, false),
            settings.model.clone(),
            Vec::new(),
        ),
    };

    // the API rejects a response schema alongside grounding tools
    let response_schema: Option<JsonValue> = tools.is_empty().then(prompts::analysis_schema);

    AnalysisPlan {
        kind,
        prompt,
        options: GenerateOptions {
            model: Some(model),
            system_prompt: None,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            tools,
            response_schema,
        },
    }
}

/// Run one analysis end to end.
///
/// No retries: a failure is reported once and the caller decides what to do.
pub async fn analyze_post(
    client: &dyn LlmClient,
    settings: &AnalyzerSettings,
    platform: SocialPlatform,
    post: &str,
) -> Result<AnalysisOutcome, AnalyzeError> {
    let plan = plan_analysis(settings, platform, post);
    tracing::info!(
        platform = %platform,
        kind = ?plan.kind,
        grounded = plan.grounded(),
        "analysis.request"
    );

    let response = client.generate(&plan.prompt, &plan.options).await?;

    let analysis = interpret(response.text.trim()).map_err(|err| {
        tracing::warn!(error = %err, declined = err.is_declined(), "analysis.interpret.failed");
        AnalyzeError::from(err)
    })?;

    let sources = if plan.grounded() {
        response.grounding_chunks
    } else {
        Vec::new()
    };

    tracing::info!(
        score = analysis.overall_score,
        sources = sources.len(),
        "analysis.complete"
    );
    Ok(AnalysisOutcome { analysis, sources })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AnalyzerSettings {
        AnalyzerSettings::from_config(&LlmConfig::default(), &FeaturedConfig::default())
    }

    #[test]
    fn default_profile_marker() {
        assert_eq!(settings().profile_marker(), "instagram.com/dreamgreencsc");

        let mut s = settings();
        s.featured_profile_url = "http://Instagram.com/Some.Shop/#top".into();
        assert_eq!(s.profile_marker(), "instagram.com/some.shop");
    }

    #[test]
    fn featured_profile_uses_profile_model_and_search() {
        let plan = plan_analysis(
            &settings(),
            SocialPlatform::Instagram,
            "  https://www.Instagram.com/dreamgreencsc/  ",
        );
        assert_eq!(plan.kind, RequestKind::FeaturedProfile);
        assert_eq!(plan.options.model.as_deref(), Some("gemini-3-pro-preview"));
        assert_eq!(plan.options.tools, vec![GroundingTool::GoogleSearch]);
        assert!(plan.options.response_schema.is_none());
        assert!(plan.prompt.contains("historical analysis"));
    }

    #[test]
    fn marker_only_counts_on_instagram() {
        let plan = plan_analysis(
            &settings(),
            SocialPlatform::Facebook,
            "https://instagram.com/dreamgreencsc",
        );
        assert_eq!(plan.kind, RequestKind::Post { is_url: true });
        assert_eq!(plan.options.model.as_deref(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn google_reviews_ground_on_maps_and_search() {
        let plan = plan_analysis(&settings(), SocialPlatform::Google, "Cafe du Monde");
        assert_eq!(plan.kind, RequestKind::Reviews);
        assert_eq!(
            plan.options.tools,
            vec![GroundingTool::GoogleMaps, GroundingTool::GoogleSearch]
        );
        assert!(plan.options.response_schema.is_none());
    }

    #[test]
    fn plain_text_posts_enforce_the_schema() {
        let plan = plan_analysis(&settings(), SocialPlatform::X, "Loving the new menu!");
        assert_eq!(plan.kind, RequestKind::Post { is_url: false });
        assert!(!plan.grounded());
        assert!(plan.options.response_schema.is_some());
        assert!(plan.prompt.contains("\"Loving the new menu!\""));
    }

    #[test]
    fn no_structured_output_becomes_declined() {
        let err = AnalyzeError::from(ResponseError::NoStructuredOutput {
            message: "No data found".into(),
        });
        assert!(matches!(err, AnalyzeError::Declined(ref m) if m == "No data found"));
        assert_eq!(err.to_string(), "No data found");
    }
}
