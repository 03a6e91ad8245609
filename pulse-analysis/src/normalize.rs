//! Reshape an untrusted JSON value into the canonical [`AnalysisResult`].
//!
//! Every canonical field is looked up through an ordered list of candidate
//! keys (snake_case first, then the camelCase or reworded spellings models
//! tend to produce). Nested irregularities degrade to defaults; only a
//! top-level value that is not an object is rejected.
use crate::coerce::{coerce_score, coerce_string_array, resolve, KeyPath};
use crate::error::ShapeError;
use crate::types::{
    AnalysisResult, CompetitorInfo, HistoricalAnalysis, NegativeFeedback, PositiveFeedback,
    Suggestion,
};
use serde_json::Value as JsonValue;

const OVERALL_SCORE: &[KeyPath] = &[
    &["overall_score"],
    &["overallScore"],
    &["overallPerformance", "score"],
    &["overall_performance", "score"],
    &["overall_performance_score"],
];
const POSITIVE_FEEDBACK: &[KeyPath] = &[&["positive_feedback"], &["positiveFeedback"]];
const NEGATIVE_FEEDBACK: &[KeyPath] = &[&["negative_feedback"], &["negativeFeedback"]];
const COMMON_THEMES: &[KeyPath] = &[&["common_themes"], &["commonThemes"]];
const WHAT_CUSTOMERS_LOVE: &[KeyPath] = &[&["what_customers_love"], &["whatCustomersLove"]];
const KEY_AREAS_OF_DISSATISFACTION: &[KeyPath] = &[
    &["key_areas_of_dissatisfaction"],
    &["keyAreasOfDissatisfaction"],
];
const SUGGESTED_IMPROVEMENTS: &[KeyPath] =
    &[&["suggested_improvements"], &["suggestedImprovements"]];
const COMPETITOR_COMPARISON: &[KeyPath] =
    &[&["competitor_comparison"], &["competitorComparison"]];
const HISTORICAL_ANALYSIS: &[KeyPath] = &[&["historical_analysis"], &["historicalAnalysis"]];
const CONTENT_EVOLUTION: &[KeyPath] = &[&["content_evolution"], &["contentEvolution"]];
const ENGAGEMENT_TRENDS: &[KeyPath] = &[&["engagement_trends"], &["engagementTrends"]];
const KEY_MILESTONES: &[KeyPath] = &[&["key_milestones"], &["keyMilestones"]];

/// Key spellings accepted for a structured `{area, suggestion}` element.
const SUGGESTION_KEY_PAIRS: &[(&str, &str)] = &[("area", "suggestion"), ("category", "advice")];

/// Area used when the model only sends a free-form summary.
pub const GENERAL_AREA: &str = "General";

/// Normalize a parsed model response.
pub fn normalize(value: &JsonValue) -> Result<AnalysisResult, ShapeError> {
    if !value.is_object() {
        tracing::warn!(
            kind = crate::error::json_kind(value),
            "analysis.normalize.not_an_object"
        );
        return Err(ShapeError {
            received: value.clone(),
        });
    }

    let positive = resolve(value, POSITIVE_FEEDBACK);
    let negative = resolve(value, NEGATIVE_FEEDBACK);

    let result = AnalysisResult {
        overall_score: coerce_score(resolve(value, OVERALL_SCORE)),
        positive_feedback: PositiveFeedback {
            common_themes: string_list(positive, COMMON_THEMES),
            what_customers_love: string_list(positive, WHAT_CUSTOMERS_LOVE),
        },
        negative_feedback: NegativeFeedback {
            common_themes: string_list(negative, COMMON_THEMES),
            key_areas_of_dissatisfaction: string_list(negative, KEY_AREAS_OF_DISSATISFACTION),
        },
        suggested_improvements: resolve(value, SUGGESTED_IMPROVEMENTS)
            .map(normalize_suggestions)
            .unwrap_or_default(),
        competitor_comparison: resolve(value, COMPETITOR_COMPARISON)
            .and_then(JsonValue::as_array)
            .map(|items| competitors(items)),
        historical_analysis: resolve(value, HISTORICAL_ANALYSIS)
            .filter(|hist| hist.is_object())
            .map(|hist| HistoricalAnalysis {
                content_evolution: coerce_string_array(resolve(hist, CONTENT_EVOLUTION)),
                engagement_trends: coerce_string_array(resolve(hist, ENGAGEMENT_TRENDS)),
                key_milestones: coerce_string_array(resolve(hist, KEY_MILESTONES)),
            }),
    };

    tracing::debug!(
        score = result.overall_score,
        suggestions = result.suggested_improvements.len(),
        historical = result.historical_analysis.is_some(),
        "analysis.normalize.done"
    );
    Ok(result)
}

fn string_list(section: Option<&JsonValue>, candidates: &[KeyPath]) -> Vec<String> {
    coerce_string_array(section.and_then(|s| resolve(s, candidates)))
}

fn competitors(items: &[JsonValue]) -> Vec<CompetitorInfo> {
    items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect()
}

/// A predicate plus the transform to apply when it matches.
pub struct ShapeMatcher {
    pub name: &'static str,
    pub matches: fn(&JsonValue) -> bool,
    pub apply: fn(&JsonValue) -> Vec<Suggestion>,
}

/// Accepted layouts for `suggested_improvements`, in priority order.
pub const SUGGESTION_SHAPES: &[ShapeMatcher] = &[
    ShapeMatcher {
        name: "list",
        matches: JsonValue::is_array,
        apply: suggestions_from_list,
    },
    ShapeMatcher {
        name: "recommendations",
        matches: has_recommendations,
        apply: suggestions_from_recommendations,
    },
    ShapeMatcher {
        name: "summary",
        matches: has_summary,
        apply: suggestions_from_summary,
    },
    ShapeMatcher {
        name: "area_map",
        matches: JsonValue::is_object,
        apply: suggestions_from_area_map,
    },
];

/// Run the first matching shape; unknown shapes yield no suggestions.
pub fn normalize_suggestions(value: &JsonValue) -> Vec<Suggestion> {
    match SUGGESTION_SHAPES.iter().find(|shape| (shape.matches)(value)) {
        Some(shape) => {
            tracing::trace!(shape = shape.name, "analysis.normalize.suggestion_shape");
            (shape.apply)(value)
        }
        None => Vec::new(),
    }
}

fn suggestions_from_list(value: &JsonValue) -> Vec<Suggestion> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(suggestion_from_element).collect())
        .unwrap_or_default()
}

fn suggestion_from_element(item: &JsonValue) -> Option<Suggestion> {
    if let Some(text) = item.as_str() {
        return Some(Suggestion::Text(text.to_string()));
    }
    let fields = item.as_object()?;
    SUGGESTION_KEY_PAIRS.iter().find_map(|(area_key, suggestion_key)| {
        let area = fields.get(*area_key)?.as_str()?;
        let suggestion = fields.get(*suggestion_key)?.as_str()?;
        Some(Suggestion::structured(area, suggestion))
    })
}

fn has_recommendations(value: &JsonValue) -> bool {
    value.get("recommendations").is_some_and(JsonValue::is_array)
}

fn suggestions_from_recommendations(value: &JsonValue) -> Vec<Suggestion> {
    value
        .get("recommendations")
        .and_then(JsonValue::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| serde_json::from_value::<Suggestion>(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn has_summary(value: &JsonValue) -> bool {
    value
        .get("summary")
        .and_then(JsonValue::as_str)
        .is_some_and(|s| !s.is_empty())
}

fn suggestions_from_summary(value: &JsonValue) -> Vec<Suggestion> {
    value
        .get("summary")
        .and_then(JsonValue::as_str)
        .map(|summary| vec![Suggestion::structured(GENERAL_AREA, summary)])
        .unwrap_or_default()
}

fn suggestions_from_area_map(value: &JsonValue) -> Vec<Suggestion> {
    value
        .as_object()
        .map(|entries| {
            entries
                .iter()
                .filter_map(|(area, suggestion)| {
                    suggestion
                        .as_str()
                        .map(|text| Suggestion::structured(area.as_str(), text))
                })
                .collect()
        })
        .unwrap_or_default()
}
