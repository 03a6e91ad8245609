mod common;

use async_trait::async_trait;
use pulse_analysis::Suggestion;
use pulse_common::{PulseError, Result, SocialPlatform};
use pulse_config::{FeaturedConfig, LlmConfig};
use pulse_llm::analyzer::{analyze_post, AnalyzeError, AnalyzerSettings};
use pulse_llm::traits::{GenerateOptions, GroundingChunk, LlmClient, LlmResponse, WebSource};
use std::sync::Mutex;

/// Replays a canned reply and remembers what it was asked.
struct ScriptedClient {
    reply: std::result::Result<String, String>,
    sources: Vec<GroundingChunk>,
    seen: Mutex<Vec<(String, GenerateOptions)>>,
}

impl ScriptedClient {
    fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            sources: vec![GroundingChunk {
                web: Some(WebSource {
                    uri: "https://example.com".into(),
                    title: "Example".into(),
                }),
                maps: None,
            }],
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            sources: Vec::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn last_options(&self) -> GenerateOptions {
        self.seen.lock().unwrap().last().unwrap().1.clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<LlmResponse> {
        self.seen
            .lock()
            .unwrap()
            .push((prompt.to_string(), options.clone()));
        match &self.reply {
            Ok(text) => Ok(LlmResponse {
                text: text.clone(),
                model: options.model.clone(),
                tokens_used: None,
                grounding_chunks: self.sources.clone(),
            }),
            Err(message) => Err(PulseError::Llm(message.clone())),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.reply.is_ok())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn settings() -> AnalyzerSettings {
    AnalyzerSettings::from_config(&LlmConfig::default(), &FeaturedConfig::default())
}

#[tokio::test]
async fn text_post_is_schema_bound_and_has_no_sources() {
    common::init_test_tracing();
    let client = ScriptedClient::replying(
        r#"{"overall_score": 64.6, "positive_feedback": {"common_themes": ["Food"], "what_customers_love": "The tacos"}, "negative_feedback": {}, "suggested_improvements": [{"area": "Hashtags", "suggestion": "Use fewer"}]}"#,
    );

    let outcome = analyze_post(&client, &settings(), SocialPlatform::TikTok, " Taco night! ")
        .await
        .unwrap();

    assert_eq!(outcome.analysis.overall_score, 65);
    assert_eq!(outcome.analysis.positive_feedback.what_customers_love, vec!["The tacos"]);
    assert_eq!(
        outcome.analysis.suggested_improvements,
        vec![Suggestion::structured("Hashtags", "Use fewer")]
    );
    // grounding was off, so whatever the client attached is ignored
    assert!(outcome.sources.is_empty());

    let options = client.last_options();
    assert!(options.tools.is_empty());
    assert!(options.response_schema.is_some());
    let prompt = client.seen.lock().unwrap()[0].0.clone();
    assert!(prompt.contains("\"Taco night!\""));
}

#[tokio::test]
async fn featured_profile_keeps_history_and_sources() {
    let client = ScriptedClient::replying(
        "```json\n{\"overallScore\": 88, \"historical_analysis\": {\"content_evolution\": [\"More reels\"], \"engagement_trends\": [], \"key_milestones\": []}}\n```",
    );

    let outcome = analyze_post(
        &client,
        &settings(),
        SocialPlatform::Instagram,
        "https://www.instagram.com/dreamgreencsc/?hl=en",
    )
    .await
    .unwrap();

    assert_eq!(outcome.analysis.overall_score, 88);
    let history = outcome.analysis.historical_analysis.expect("historical analysis");
    assert_eq!(history.content_evolution, vec!["More reels"]);
    assert_eq!(outcome.sources.len(), 1);
    assert_eq!(
        client.last_options().model.as_deref(),
        Some("gemini-3-pro-preview")
    );
}

#[tokio::test]
async fn unparseable_json_is_malformed() {
    let client = ScriptedClient::replying("{ \"overall_score\": 5,");
    let err = analyze_post(&client, &settings(), SocialPlatform::X, "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzeError::Malformed(_)), "{err:?}");
}

#[tokio::test]
async fn non_object_json_is_malformed() {
    let client = ScriptedClient::replying("[1, 2, 3]");
    let err = analyze_post(&client, &settings(), SocialPlatform::Facebook, "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzeError::Malformed(_)), "{err:?}");
}

#[tokio::test]
async fn transport_failures_pass_through() {
    let client = ScriptedClient::failing("Invalid API key");
    let err = analyze_post(&client, &settings(), SocialPlatform::X, "hi")
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyzeError::Transport(PulseError::Llm(_))));
    assert_eq!(err.to_string(), "LLM error: Invalid API key");
}
