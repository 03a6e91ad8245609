mod common;

use anyhow::Result;
use pulse_common::{PulseError, SocialPlatform};
use pulse_config::{FeaturedConfig, LlmConfig};
use pulse_llm::analyzer::{analyze_post, AnalyzeError, AnalyzerSettings};
use pulse_llm::ensure_llm_ready;
use pulse_llm::gemini::GeminiClient;
use pulse_llm::traits::{GenerateOptions, GroundingTool, LlmClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FLASH_PATH: &str = "/models/gemini-2.5-flash:generateContent";

fn client_for(server: &MockServer) -> Result<GeminiClient> {
    Ok(GeminiClient::new("test-key".into(), "gemini-2.5-flash".into())?.with_base_url(server.uri()))
}

fn text_reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"totalTokenCount": 42}
    })
}

#[tokio::test]
async fn sends_key_header_and_schema() -> Result<()> {
    common::init_test_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(FLASH_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "generationConfig": {"responseMimeType": "application/json"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("{\"overall_score\": 80}")))
        .expect(1)
        .mount(&server)
        .await;

    let options = GenerateOptions {
        response_schema: Some(json!({"type": "OBJECT"})),
        ..GenerateOptions::default()
    };
    let response = client_for(&server)?.generate("analyze", &options).await?;

    assert_eq!(response.text, "{\"overall_score\": 80}");
    assert_eq!(response.model.as_deref(), Some("gemini-2.5-flash"));
    assert_eq!(response.tokens_used, Some(42));
    assert!(response.grounding_chunks.is_empty());
    Ok(())
}

#[tokio::test]
async fn model_override_changes_the_url() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-3-pro-preview:generateContent"))
        .and(body_partial_json(json!({"tools": [{"googleSearch": {}}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let options = GenerateOptions {
        model: Some("gemini-3-pro-preview".into()),
        tools: vec![GroundingTool::GoogleSearch],
        ..GenerateOptions::default()
    };
    let response = client_for(&server)?.generate("profile", &options).await?;
    assert_eq!(response.model.as_deref(), Some("gemini-3-pro-preview"));
    Ok(())
}

#[tokio::test]
async fn http_failures_map_to_llm_errors() -> Result<()> {
    let server = MockServer::start().await;
    let client = client_for(&server)?;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    let err = client
        .generate("x", &GenerateOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, PulseError::Llm(ref m) if m == "Rate limit exceeded"));

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    let err = client
        .generate("x", &GenerateOptions::default())
        .await
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("500") && msg.contains("boom"), "{msg}");
    Ok(())
}

#[tokio::test]
async fn health_check_reports_false_on_auth_failure() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    assert!(!client_for(&server)?.health_check().await?);
    Ok(())
}

#[tokio::test]
async fn google_reviews_flow_returns_sources() -> Result<()> {
    common::init_test_tracing();
    let server = MockServer::start().await;

    let reply = json!({
        "candidates": [{
            "content": {"parts": [{"text": "Here you go:\n```json\n{\"overallPerformance\": {\"score\": \"77\"}, \"suggested_improvements\": {\"Service\": \"Answer reviews\"}}\n```"}]},
            "finishReason": "STOP",
            "groundingMetadata": {"groundingChunks": [
                {"maps": {"uri": "https://maps.google.com/?cid=1", "title": "Dream Green CSC",
                          "placeAnswerSources": {"reviewSnippets": [{"uri": "https://maps.google.com/r/1", "text": "Lovely staff", "author": "Ana"}]}}},
                {"web": {"uri": "https://example.com/news", "title": "Local news"}}
            ]}
        }]
    });

    Mock::given(method("POST"))
        .and(path(FLASH_PATH))
        .and(body_partial_json(json!({"tools": [{"googleMaps": {}}, {"googleSearch": {}}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply))
        .expect(1)
        .mount(&server)
        .await;

    let config = LlmConfig {
        api_key: Some("test-key".into()),
        endpoint: server.uri(),
        ..LlmConfig::default()
    };
    let client = ensure_llm_ready(&config)?;
    let settings = AnalyzerSettings::from_config(&config, &FeaturedConfig::default());

    let outcome = analyze_post(
        client.as_ref(),
        &settings,
        SocialPlatform::Google,
        &FeaturedConfig::default().google_business,
    )
    .await?;

    assert_eq!(outcome.analysis.overall_score, 77);
    assert_eq!(outcome.analysis.suggested_improvements.len(), 1);
    assert_eq!(outcome.sources.len(), 2);
    let maps = outcome.sources[0].maps.as_ref().expect("maps source");
    let snippets = &maps.place_answer_sources.as_ref().expect("snippets").review_snippets;
    assert_eq!(snippets[0].author, "Ana");
    assert_eq!(outcome.sources[1].link(), Some(("https://example.com/news", "Local news")));
    Ok(())
}

#[tokio::test]
async fn prose_reply_is_declined() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_reply(
            "  I could not find enough information about this business.  ",
        )))
        .mount(&server)
        .await;

    let client = client_for(&server)?;
    let settings = AnalyzerSettings::from_config(&LlmConfig::default(), &FeaturedConfig::default());
    let err = analyze_post(&client, &settings, SocialPlatform::Google, "Nowhere Cafe")
        .await
        .unwrap_err();

    match err {
        AnalyzeError::Declined(message) => assert_eq!(
            message,
            "I could not find enough information about this business."
        ),
        other => panic!("expected a declined analysis, got {other:?}"),
    }
    Ok(())
}
