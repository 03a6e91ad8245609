//! Turning unpredictable model output into a strict analysis contract.
//!
//! The crate is a pure, synchronous core with no I/O:
//!
//! 1. [`extract::extract_json`] finds the JSON inside a raw model reply
//!    (fenced block first, then a bracket scan) or reports that there is none.
//! 2. [`normalize::normalize`] reshapes the untrusted value into
//!    [`AnalysisResult`], tolerating alternate key names and loose typing.
//!
//! [`interpret`] chains both and classifies failures with [`ResponseError`].
//!
//! # Examples
//! ```
//! use pulse_analysis::{interpret, ResponseError, Suggestion};
//!
//! let raw = "Sure! ```json\n{\"overallScore\": 71, \"suggested_improvements\": \"Post more\"}\n```";
//! let analysis = interpret(raw).unwrap();
//! assert_eq!(analysis.overall_score, 71);
//! assert!(analysis.suggested_improvements.is_empty());
//!
//! let err = interpret("I couldn't find any reviews for that business.").unwrap_err();
//! assert!(matches!(err, ResponseError::NoStructuredOutput { .. }));
//! ```
pub mod coerce;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod types;

pub use coerce::coerce_string_array;
pub use error::{ParseError, ResponseError, ShapeError};
pub use extract::extract_json;
pub use normalize::normalize;
pub use types::{
    AnalysisResult, CompetitorInfo, HistoricalAnalysis, ImprovementSuggestion, NegativeFeedback,
    PositiveFeedback, Suggestion,
};

/// Extract and normalize a raw model reply in one step.
///
/// A reply without any JSON becomes [`ResponseError::NoStructuredOutput`]
/// carrying the trimmed reply, so callers can show the model's own words.
pub fn interpret(raw: &str) -> Result<AnalysisResult, ResponseError> {
    let value = extract_json(raw)?.ok_or_else(|| ResponseError::NoStructuredOutput {
        message: raw.trim().to_string(),
    })?;
    Ok(normalize(&value)?)
}
