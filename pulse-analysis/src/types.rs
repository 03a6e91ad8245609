//! Canonical analysis contract consumed by renderers and the history store.
use serde::{Deserialize, Serialize};

/// Normalized result of one content analysis.
///
/// Every list is guaranteed to hold plain strings and `overall_score` is
/// always within `0..=100`, whatever the model sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResult {
    pub overall_score: u8,
    pub positive_feedback: PositiveFeedback,
    pub negative_feedback: NegativeFeedback,
    pub suggested_improvements: Vec<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_comparison: Option<Vec<CompetitorInfo>>,
    /// `None` means the model returned no historical section at all, which is
    /// different from a section whose lists are empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical_analysis: Option<HistoricalAnalysis>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositiveFeedback {
    pub common_themes: Vec<String>,
    pub what_customers_love: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegativeFeedback {
    pub common_themes: Vec<String>,
    pub key_areas_of_dissatisfaction: Vec<String>,
}

/// One improvement idea: either free text or an `{area, suggestion}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Suggestion {
    Text(String),
    Structured(ImprovementSuggestion),
}

impl Suggestion {
    pub fn structured(area: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Suggestion::Structured(ImprovementSuggestion {
            area: area.into(),
            suggestion: suggestion.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovementSuggestion {
    pub area: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitorInfo {
    pub name: String,
    pub analysis: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoricalAnalysis {
    pub content_evolution: Vec<String>,
    pub engagement_trends: Vec<String>,
    pub key_milestones: Vec<String>,
}
