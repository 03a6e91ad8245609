use async_trait::async_trait;
use pulse_common::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Server-side tools the model may call to ground its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundingTool {
    GoogleSearch,
    GoogleMaps,
}

/// Per-call generation knobs.
///
/// Grounding tools and a `response_schema` are mutually exclusive on the
/// Gemini API; callers pick one or the other.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Overrides the client's default model for this call.
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub tools: Vec<GroundingTool>,
    /// JSON schema the response must follow (forces a JSON mime type).
    pub response_schema: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: Option<String>,
    pub tokens_used: Option<u32>,
    /// Citations attached by grounding tools, passed through untouched.
    pub grounding_chunks: Vec<GroundingChunk>,
}

/// A citation attached by a grounding tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundingChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<WebSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maps: Option<MapsSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebSource {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsSource {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_answer_sources: Option<PlaceAnswerSources>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAnswerSources {
    #[serde(default)]
    pub review_snippets: Vec<ReviewSnippet>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewSnippet {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author: String,
}

impl GroundingChunk {
    /// Link and title to show for this source, whichever tool produced it.
    pub fn link(&self) -> Option<(&str, &str)> {
        self.web
            .as_ref()
            .map(|w| (w.uri.as_str(), w.title.as_str()))
            .or_else(|| self.maps.as_ref().map(|m| (m.uri.as_str(), m.title.as_str())))
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a response to the given prompt.
    async fn generate(&self, prompt: &str, options: &GenerateOptions) -> Result<LlmResponse>;

    /// Check if the LLM service is available
    async fn health_check(&self) -> Result<bool>;

    /// Get the default model name being used
    fn model_name(&self) -> &str;
}
