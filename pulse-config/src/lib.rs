//! Loader for PostPulse configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are added, with `PULSE_`-prefixed
//! environment variables (nested keys joined by `__`, e.g.
//! `PULSE_LLM__API_KEY`) taking precedence. String values may reference other
//! environment variables as `${VAR}`; those are expanded after merging.
//! Every section has defaults, so an empty document is a valid configuration.
use config::{Config, ConfigError, Environment, File};
use pulse_common::observability::LogFormat;
use pulse_common::{PulseError, Result as PulseResult};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_PROFILE_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_INSTAGRAM_PROFILE: &str = "https://www.instagram.com/dreamgreencsc/?hl=en";
pub const DEFAULT_GOOGLE_BUSINESS: &str =
    "Dream Green CSC, C. Rociega, 2, 35510 Tías, Las Palmas, Spain";
pub const DEFAULT_MAX_HISTORY: usize = 20;

#[derive(Debug, Default, Deserialize)]
pub struct PulseConfig {
    pub version: Option<String>,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub featured: FeaturedConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    Gemini,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<String>,
    /// Model used for regular post and review analyses.
    pub model: String,
    /// Model used for the featured profile deep-dive.
    pub profile_model: String,
    pub endpoint: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Gemini,
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.into(),
            profile_model: DEFAULT_PROFILE_MODEL.into(),
            endpoint: DEFAULT_GEMINI_ENDPOINT.into(),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl LlmConfig {
    /// The API key, or a configuration error if it is missing, blank, or an
    /// unexpanded `${VAR}` placeholder.
    pub fn require_api_key(&self) -> PulseResult<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() && !key.contains("${") => Ok(key),
            _ => Err(PulseError::Config(
                "API key not set (configure llm.api_key or PULSE_LLM__API_KEY)".to_string(),
            )),
        }
    }
}

/// The business this deployment is built around; used as input defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeaturedConfig {
    pub instagram_profile: String,
    pub google_business: String,
}

impl Default for FeaturedConfig {
    fn default() -> Self {
        Self {
            instagram_profile: DEFAULT_INSTAGRAM_PROFILE.into(),
            google_business: DEFAULT_GOOGLE_BUSINESS.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// sqlx connection string; `None` means `~/.local/share/postpulse/history.db`.
    pub database_url: Option<String>,
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_entries: DEFAULT_MAX_HISTORY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub emit_stderr: bool,
    pub filter: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            emit_stderr: false,
            filter: "info".into(),
            dir: None,
        }
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder over the `config` crate wiring (files + env overrides).
pub struct PulseConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for PulseConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PulseConfigLoader {
    /// Start with `PULSE_` environment overrides only.
    ///
    /// ```
    /// use pulse_config::PulseConfigLoader;
    ///
    /// let config = PulseConfigLoader::new()
    ///     .with_yaml_str("version: '1'")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.version.as_deref(), Some("1"));
    /// assert_eq!(config.history.max_entries, 20);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is silently skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet (tests, embedded defaults).
    ///
    /// ```
    /// use pulse_config::PulseConfigLoader;
    ///
    /// let cfg = PulseConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// llm:
    ///   provider: gemini
    ///   api_key: "example"
    ///   model: "gemini-2.5-flash"
    /// history:
    ///   max_entries: 5
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.llm.require_api_key().unwrap(), "example");
    /// assert_eq!(cfg.history.max_entries, 5);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders and deserialize.
    pub fn load(self) -> Result<PulseConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("PULSE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        if v.is_null() {
            v = Value::Object(Default::default());
        }
        expand_env_in_value(&mut v);

        serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("PULSE_TEST_FOO", Some("bar"), || {
            let mut v = json!("prefix-${PULSE_TEST_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars(
            [("PULSE_TEST_CITY", Some("Tías")), ("PULSE_TEST_ISLAND", Some("Lanzarote"))],
            || {
                let mut v = json!([
                    "hello-$PULSE_TEST_CITY",
                    { "loc": "${PULSE_TEST_CITY}-${PULSE_TEST_ISLAND}" },
                    42,
                    true,
                    null
                ]);
                expand_env_in_value(&mut v);
                assert_eq!(
                    v,
                    json!(["hello-Tías", { "loc": "Tías-Lanzarote" }, 42, true, null])
                );
            },
        );
    }

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("PULSE_TEST_BAZ", Some("qux")),
                ("PULSE_TEST_BAR", Some("mid-${PULSE_TEST_BAZ}")),
                ("PULSE_TEST_TOP", Some("start-${PULSE_TEST_BAR}-end")),
            ],
            || {
                let mut v = json!("X=${PULSE_TEST_TOP}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("X=start-mid-qux-end"));
            },
        );
    }

    #[test]
    fn stops_on_cycles() {
        temp_env::with_vars(
            [("PULSE_TEST_A", Some("${PULSE_TEST_B}")), ("PULSE_TEST_B", Some("${PULSE_TEST_A}"))],
            || {
                let mut v = json!("x=${PULSE_TEST_A}-y");
                expand_env_in_value(&mut v);
                let s = v.as_str().unwrap();
                assert!(s.starts_with("x=") && s.ends_with("-y"));
                assert!(s.contains("${"));
            },
        );
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${PULSE_TEST_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${PULSE_TEST_DOES_NOT_EXIST}"));
    }

    #[test]
    fn api_key_must_be_real() {
        let mut llm = LlmConfig::default();
        assert!(llm.require_api_key().is_err());

        llm.api_key = Some("${GEMINI_API_KEY}".into());
        assert!(matches!(llm.require_api_key(), Err(PulseError::Config(_))));

        llm.api_key = Some("   ".into());
        assert!(llm.require_api_key().is_err());

        llm.api_key = Some(" abc123 ".into());
        assert_eq!(llm.require_api_key().unwrap(), "abc123");
    }
}
