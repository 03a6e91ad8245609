//! Common types and utilities shared across PostPulse crates.
//!
//! This crate defines the shared error type, the set of supported social
//! platforms, and the observability helpers used by every binary. It is kept
//! dependency‑minimal so the pure analysis core and the effectful shell can
//! both lean on it.
//!
//! # Overview
//!
//! - [`SocialPlatform`]: the platforms a post can be analysed for
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`PulseError`] and [`Result`]: Shared error handling for the shell
//!
//! # Examples
//!
//! ```rust
//! use pulse_common::SocialPlatform;
//!
//! let platform: SocialPlatform = "Instagram".parse().unwrap();
//! assert_eq!(platform, SocialPlatform::Instagram);
//! assert_eq!(platform.to_string(), "instagram");
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod observability;

/// Social network (or review site) a piece of content belongs to.
///
/// The serialized form is the lower-case wire name, which is also what the
/// history store persists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    X,
    Instagram,
    Facebook,
    Google,
    #[serde(rename = "tiktok")]
    TikTok,
}

impl SocialPlatform {
    pub const ALL: [SocialPlatform; 5] = [
        SocialPlatform::X,
        SocialPlatform::Instagram,
        SocialPlatform::Facebook,
        SocialPlatform::Google,
        SocialPlatform::TikTok,
    ];

    /// Stable lower-case identifier, also used in prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::X => "x",
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Google => "google",
            SocialPlatform::TikTok => "tiktok",
        }
    }

    /// Human readable name for terminal output.
    pub fn label(&self) -> &'static str {
        match self {
            SocialPlatform::X => "X",
            SocialPlatform::Instagram => "Instagram",
            SocialPlatform::Facebook => "Facebook",
            SocialPlatform::Google => "Google Reviews",
            SocialPlatform::TikTok => "TikTok",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SocialPlatform {
    type Err = PulseError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        SocialPlatform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .or_else(|| {
                // "twitter" is still what most people type
                wanted
                    .eq_ignore_ascii_case("twitter")
                    .then_some(SocialPlatform::X)
            })
            .ok_or_else(|| PulseError::InvalidInput(format!("unknown platform: {wanted}")))
    }
}

/// Error types used by the effectful shell (transport, configuration).
///
/// The analysis core has its own error taxonomy in `pulse-analysis`; this type
/// covers everything that can go wrong *before* a model response exists.
#[derive(thiserror::Error, Debug)]
pub enum PulseError {
    /// The LLM provider could not be reached or rejected the request.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// User supplied input could not be understood.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation exceeded the configured timeout.
    #[error("Timeout occurred")]
    Timeout,
}

/// Convenient alias for results that use [`PulseError`].
pub type Result<T> = std::result::Result<T, PulseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_platforms_case_insensitively() {
        assert_eq!("TikTok".parse::<SocialPlatform>().unwrap(), SocialPlatform::TikTok);
        assert_eq!(" google ".parse::<SocialPlatform>().unwrap(), SocialPlatform::Google);
        assert_eq!("twitter".parse::<SocialPlatform>().unwrap(), SocialPlatform::X);
    }

    #[test]
    fn rejects_unknown_platform() {
        let err = "myspace".parse::<SocialPlatform>().unwrap_err();
        assert!(matches!(err, PulseError::InvalidInput(_)));
        assert!(err.to_string().contains("myspace"));
    }

    #[test]
    fn serializes_to_wire_names() {
        let json = serde_json::to_string(&SocialPlatform::ALL).unwrap();
        assert_eq!(json, r#"["x","instagram","facebook","google","tiktok"]"#);
        let back: SocialPlatform = serde_json::from_str(r#""tiktok""#).unwrap();
        assert_eq!(back, SocialPlatform::TikTok);
    }
}
