use crate::traits::{GenerateOptions, GroundingChunk, GroundingTool, LlmClient, LlmResponse};
use async_trait::async_trait;
use pulse_common::{PulseError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::time::Duration;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    safety_settings: Vec<GeminiSafetySetting>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<JsonValue>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<JsonValue>,
}

#[derive(Debug, Serialize)]
struct GeminiSafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsageMetadata>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
    grounding_metadata: Option<GeminiGroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    total_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

/// Google Gemini API client.
///
/// Requires a valid API key and internet access.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new client using the provided API key and model.
    pub fn new(api_key: String, model: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            // grounded requests run searches server-side and can take a while
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| PulseError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            model,
            base_url: GEMINI_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API root (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn create_safety_settings() -> Vec<GeminiSafetySetting> {
        [
            "HARM_CATEGORY_HARASSMENT",
            "HARM_CATEGORY_HATE_SPEECH",
            "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            "HARM_CATEGORY_DANGEROUS_CONTENT",
        ]
        .into_iter()
        .map(|category| GeminiSafetySetting {
            category,
            threshold: "BLOCK_MEDIUM_AND_ABOVE",
        })
        .collect()
    }

    fn build_request(prompt: &str, options: &GenerateOptions) -> GeminiRequest {
        let generation_config = GeminiGenerationConfig {
            temperature: options.temperature,
            max_output_tokens: options.max_tokens,
            response_mime_type: options
                .response_schema
                .as_ref()
                .map(|_| "application/json"),
            response_schema: options.response_schema.clone(),
        };
        let has_config = generation_config.temperature.is_some()
            || generation_config.max_output_tokens.is_some()
            || generation_config.response_schema.is_some();

        GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: has_config.then_some(generation_config),
            safety_settings: Self::create_safety_settings(),
            system_instruction: options.system_prompt.as_ref().map(|sys| GeminiContent {
                parts: vec![GeminiPart { text: sys.clone() }],
            }),
            tools: options.tools.iter().map(tool_declaration).collect(),
        }
    }
}

fn tool_declaration(tool: &GroundingTool) -> JsonValue {
    match tool {
        GroundingTool::GoogleSearch => serde_json::json!({ "googleSearch": {} }),
        GroundingTool::GoogleMaps => serde_json::json!({ "googleMaps": {} }),
    }
}

fn into_llm_response(resp: GeminiResponse, model: &str) -> Result<LlmResponse> {
    let tokens_used = resp.usage_metadata.and_then(|u| u.total_token_count);

    let Some(candidate) = resp.candidates.into_iter().next() else {
        if let Some(reason) = resp.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(PulseError::Llm(format!(
                "Prompt blocked by Gemini ({reason})"
            )));
        }
        return Err(PulseError::Llm(
            "No candidates returned from Gemini".to_string(),
        ));
    };

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Err(PulseError::Llm(
            "Content blocked by Gemini safety filters".to_string(),
        ));
    }

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(PulseError::Llm(
            "No content parts in Gemini response".to_string(),
        ));
    }

    Ok(LlmResponse {
        text,
        model: Some(model.to_string()),
        tokens_used,
        grounding_chunks: candidate
            .grounding_metadata
            .map(|g| g.grounding_chunks)
            .unwrap_or_default(),
    })
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<LlmResponse> {
        let model = options.model.as_deref().unwrap_or(&self.model);
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let request = Self::build_request(prompt, options);

        tracing::debug!(
            url = %url,
            tools = options.tools.len(),
            schema = options.response_schema.is_some(),
            "gemini.request"
        );

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PulseError::Timeout
                } else {
                    PulseError::Llm(format!("Gemini request failed: {}", e))
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "gemini.request.failed");

            return Err(match status.as_u16() {
                429 => PulseError::Llm("Rate limit exceeded".to_string()),
                401 => PulseError::Llm("Invalid API key".to_string()),
                403 => PulseError::Llm("API access forbidden".to_string()),
                _ => PulseError::Llm(format!("Gemini API error ({}): {}", status, error_text)),
            });
        }

        let gemini_response: GeminiResponse = resp
            .json()
            .await
            .map_err(|e| PulseError::Llm(format!("Failed to parse Gemini response: {}", e)))?;

        let response = into_llm_response(gemini_response, model)?;
        tracing::debug!(
            model = %model,
            tokens = ?response.tokens_used,
            sources = response.grounding_chunks.len(),
            "gemini.response"
        );
        Ok(response)
    }

    async fn health_check(&self) -> Result<bool> {
        let options = GenerateOptions {
            max_tokens: Some(5),
            temperature: Some(0.1),
            ..GenerateOptions::default()
        };

        match self.generate("Respond with just 'OK'", &options).await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("Gemini health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
