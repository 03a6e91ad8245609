//! Locate and parse the JSON payload inside free-form model output.
//!
//! Models wrap their JSON in ```` ```json ```` fences, surround it with prose,
//! or skip it entirely. [`extract_json`] tries the cheap well-formed case first
//! and then falls back to a bracket scan across the whole text.
use crate::error::ParseError;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::sync::OnceLock;

fn fenced_json_pattern() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"(?s)```json\s*(.*?)\s*```").ok())
        .as_ref()
}

/// Extract the JSON value embedded in `raw`.
///
/// - `Ok(Some(v))`: a fenced block or bracketed span parsed strictly.
/// - `Ok(None)`: there is no `{` or `[` at all, so the text is a plain message.
/// - `Err(ParseError)`: delimiters exist but the span between them is not JSON.
pub fn extract_json(raw: &str) -> Result<Option<JsonValue>, ParseError> {
    if let Some(value) = parse_fenced_block(raw) {
        return Ok(Some(value));
    }

    let start = [raw.find('{'), raw.find('[')].into_iter().flatten().min();
    let Some(start) = start else {
        tracing::debug!(len = raw.len(), "analysis.extract.no_json");
        return Ok(None);
    };
    let end = [raw.rfind('}'), raw.rfind(']')].into_iter().flatten().max();

    let parsed = match end {
        Some(end) if end > start => serde_json::from_str::<JsonValue>(&raw[start..=end]),
        _ => {
            tracing::warn!(start, end = ?end, "analysis.extract.unbalanced");
            return Err(ParseError {
                raw_text: raw.to_string(),
            });
        }
    };

    parsed.map(Some).map_err(|err| {
        tracing::warn!(error = %err, "analysis.extract.span_parse_failed");
        ParseError {
            raw_text: raw.to_string(),
        }
    })
}

/// First ```` ```json ```` block whose interior parses, if any.
fn parse_fenced_block(raw: &str) -> Option<JsonValue> {
    let pattern = fenced_json_pattern()?;
    pattern.captures_iter(raw).find_map(|caps| {
        let interior = caps.get(1)?.as_str();
        match serde_json::from_str::<JsonValue>(interior) {
            Ok(value) => {
                tracing::debug!("analysis.extract.fenced_block");
                Some(value)
            }
            Err(err) => {
                tracing::debug!(error = %err, "analysis.extract.fenced_block_invalid");
                None
            }
        }
    })
}
