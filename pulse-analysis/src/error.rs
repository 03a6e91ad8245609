use serde_json::Value as JsonValue;

/// JSON-looking delimiters were found but the text between them did not parse.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Could not parse a valid JSON object from the model's response")]
pub struct ParseError {
    /// The complete, unmodified model output.
    pub raw_text: String,
}

/// The parsed value was not a JSON object.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("Received invalid data structure from the AI model (expected an object, got {})", json_kind(.received))]
pub struct ShapeError {
    pub received: JsonValue,
}

/// Why a model response could not become an analysis.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ResponseError {
    /// The model answered in prose; `message` is meant for the user as-is.
    #[error("{message}")]
    NoStructuredOutput { message: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Shape(#[from] ShapeError),
}

impl ResponseError {
    /// True when the model deliberately declined to produce structured output.
    pub fn is_declined(&self) -> bool {
        matches!(self, ResponseError::NoStructuredOutput { .. })
    }
}

pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
