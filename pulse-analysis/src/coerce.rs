//! Small, reusable coercions from untrusted JSON into canonical leaf types.
use serde_json::Value as JsonValue;

/// A key path into a JSON object, e.g. `&["overallPerformance", "score"]`.
pub type KeyPath = &'static [&'static str];

/// Return the first candidate path that is present (and not `null`).
///
/// The first hit wins even if its value is useless; later candidates are only
/// consulted when earlier ones are missing entirely.
pub fn resolve<'a>(source: &'a JsonValue, candidates: &[KeyPath]) -> Option<&'a JsonValue> {
    candidates
        .iter()
        .find_map(|path| lookup(source, path).filter(|v| !v.is_null()))
}

fn lookup<'a>(source: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    path.iter().try_fold(source, |node, key| node.get(*key))
}

/// Coerce anything into a list of strings.
///
/// Arrays keep only their string elements (in order), a non-blank string
/// becomes a single-element list and everything else is empty.
pub fn coerce_string_array(value: Option<&JsonValue>) -> Vec<String> {
    match value {
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect(),
        Some(JsonValue::String(s)) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Coerce a score into `0..=100`; unusable input scores 0.
pub fn coerce_score(value: Option<&JsonValue>) -> u8 {
    let raw = match value {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(score) if score.is_finite() => score.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_arrays_drop_non_strings_in_order() {
        let v = json!(["a", 1, null, {"x": "y"}, "b", ["c"]]);
        assert_eq!(coerce_string_array(Some(&v)), vec!["a", "b"]);
    }

    #[test]
    fn single_string_is_wrapped() {
        assert_eq!(coerce_string_array(Some(&json!("good"))), vec!["good"]);
    }

    #[test]
    fn blank_and_other_types_are_empty() {
        for v in [json!(""), json!("   "), json!(3), json!({"a": "b"}), json!(null), json!(true)] {
            assert!(coerce_string_array(Some(&v)).is_empty(), "{v}");
        }
        assert!(coerce_string_array(None).is_empty());
    }

    #[test]
    fn resolve_prefers_earlier_candidates_even_when_invalid() {
        let v = json!({"overall_score": "n/a", "overallPerformance": {"score": 42}});
        let hit = resolve(&v, &[&["overall_score"], &["overallPerformance", "score"]]);
        assert_eq!(hit, Some(&json!("n/a")));
    }

    #[test]
    fn resolve_skips_missing_and_null_candidates() {
        let v = json!({"overall_score": null, "overallPerformance": {"score": 42}});
        let hit = resolve(
            &v,
            &[&["overall_score"], &["overallScore"], &["overallPerformance", "score"]],
        );
        assert_eq!(hit, Some(&json!(42)));
        assert_eq!(resolve(&v, &[&["nope"], &["overallPerformance", "nope"]]), None);
    }

    #[test]
    fn scores_are_rounded_and_clamped() {
        assert_eq!(coerce_score(Some(&json!(42))), 42);
        assert_eq!(coerce_score(Some(&json!(87.6))), 88);
        assert_eq!(coerce_score(Some(&json!(" 73 "))), 73);
        assert_eq!(coerce_score(Some(&json!(140))), 100);
        assert_eq!(coerce_score(Some(&json!(-5))), 0);
    }

    #[test]
    fn unusable_scores_default_to_zero() {
        assert_eq!(coerce_score(Some(&json!("great"))), 0);
        assert_eq!(coerce_score(Some(&json!("NaN"))), 0);
        assert_eq!(coerce_score(Some(&json!({"score": 3}))), 0);
        assert_eq!(coerce_score(None), 0);
    }
}
