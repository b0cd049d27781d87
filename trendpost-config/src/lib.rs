//! Loader for run configuration with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. built-in defaults ([`DEFAULTS_YAML`])
//! 2. an optional `trendpost.yaml` (or any file passed to the loader)
//! 3. `TRENDPOST__SECTION__KEY` environment variables
//!
//! String values may reference environment variables as `${VAR}`. The
//! defaults wire every secret this way (`${GEMINI_API_KEY}`, `${X_API_KEY}`,
//! ...), so a bare environment is enough for a cron deployment. A placeholder
//! that stays unresolved counts as a missing credential in
//! [`TrendpostConfig::validate`].
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use trendpost_common::TrendpostError;

/// Defaults for every setting. Secrets point at the conventional env vars.
pub const DEFAULTS_YAML: &str = r#"
trends:
  url: "https://trends24.in/united-states/"
  selector: "ol.trend-card__list li a"
  limit: 4
  user_agent: "Mozilla/5.0"
links:
  path: "links.txt"
generation:
  base_url: "https://generativelanguage.googleapis.com/v1beta/"
  model: "gemini-1.5-flash"
  language: "English"
  api_key: "${GEMINI_API_KEY}"
publish:
  base_url: "https://api.twitter.com/"
  bearer_token: "${X_BEARER_TOKEN}"
  api_key: "${X_API_KEY}"
  api_secret: "${X_API_SECRET}"
  access_token: "${X_ACCESS_TOKEN}"
  access_token_secret: "${X_ACCESS_TOKEN_SECRET}"
logging:
  format: "text"
  filter: "info"
"#;

#[derive(Debug, Clone, Deserialize)]
pub struct TrendpostConfig {
    pub trends: TrendsConfig,
    pub links: LinksConfig,
    pub generation: GenerationConfig,
    pub publish: PublishConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrendsConfig {
    pub url: String,
    pub selector: String,
    #[serde(deserialize_with = "number_or_string")]
    pub limit: usize,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinksConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    /// Language the post is written in.
    pub language: String,
    pub api_key: Secret,
}

/// X/Twitter credentials. The consumer and access pairs sign posts with
/// OAuth 1.0a; the bearer token covers app-only endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishConfig {
    pub base_url: String,
    pub bearer_token: Secret,
    pub api_key: Secret,
    pub api_secret: Secret,
    pub access_token: Secret,
    pub access_token_secret: Secret,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub dir: Option<String>,
    pub format: String,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            format: "text".into(),
            filter: "info".into(),
        }
    }
}

/// A credential value that never shows up in `Debug` output.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Empty, or exactly an unresolved `${NAME}` placeholder. Other values
    /// containing `$` are real secrets.
    pub fn is_missing(&self) -> bool {
        let v = self.0.trim();
        v.is_empty() || is_placeholder(v)
    }
}

fn is_placeholder(v: &str) -> bool {
    v.strip_prefix("${")
        .and_then(|rest| rest.strip_suffix('}'))
        .is_some_and(|name| {
            !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_missing() {
            f.write_str("Secret(<missing>)")
        } else {
            f.write_str("Secret(<redacted>)")
        }
    }
}

impl TrendpostConfig {
    /// Check every credential and bound in one pass.
    ///
    /// All missing credentials are reported together so an operator can fix
    /// the environment in one go.
    pub fn validate(&self) -> trendpost_common::Result<()> {
        let required: [(&str, &Secret); 6] = [
            ("GEMINI_API_KEY", &self.generation.api_key),
            ("X_BEARER_TOKEN", &self.publish.bearer_token),
            ("X_API_KEY", &self.publish.api_key),
            ("X_API_SECRET", &self.publish.api_secret),
            ("X_ACCESS_TOKEN", &self.publish.access_token),
            ("X_ACCESS_TOKEN_SECRET", &self.publish.access_token_secret),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, secret)| secret.is_missing())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(TrendpostError::MissingCredential(missing.join(", ")));
        }

        if self.trends.limit == 0 {
            return Err(TrendpostError::Config(
                "trends.limit must be at least 1".into(),
            ));
        }
        if self.generation.model.trim().is_empty() {
            return Err(TrendpostError::Config(
                "generation.model must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(usize),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            // One pass: substituted values are taken literally.
            if s.contains('$') {
                if let Ok(expanded) = shellexpand::env(s) {
                    *s = expanded.into_owned();
                }
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hides the `config` crate wiring (defaults + YAML + env overrides).
pub struct TrendpostConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for TrendpostConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl TrendpostConfigLoader {
    /// Start from the built-in defaults.
    ///
    /// ```
    /// use trendpost_config::TrendpostConfigLoader;
    ///
    /// let config = TrendpostConfigLoader::new().load().expect("defaults parse");
    /// assert_eq!(config.trends.limit, 4);
    /// assert_eq!(config.links.path, "links.txt");
    /// ```
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(File::from_str(DEFAULTS_YAML, FileFormat::Yaml));
        Self { builder }
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when absent, so headless deployments can
    /// rely purely on environment variables.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Allow tests/CLI to merge inline YAML snippets.
    ///
    /// ```
    /// use trendpost_config::TrendpostConfigLoader;
    ///
    /// let cfg = TrendpostConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// trends:
    ///   limit: 2
    /// generation:
    ///   model: "gemini-test"
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.trends.limit, 2);
    /// assert_eq!(cfg.generation.model, "gemini-test");
    /// assert_eq!(cfg.trends.user_agent, "Mozilla/5.0");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources into strongly typed config.
    ///
    /// `TRENDPOST__`-prefixed environment variables are layered on last, and
    /// `${VAR}` placeholders are expanded before materialising the structs.
    pub fn load(self) -> Result<TrendpostConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("TRENDPOST")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: TrendpostConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        Ok(typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TrendpostConfig {
        temp_env::with_vars(
            [
                ("GEMINI_API_KEY", Some("g-key")),
                ("X_BEARER_TOKEN", Some("bearer")),
                ("X_API_KEY", Some("ck")),
                ("X_API_SECRET", Some("cs")),
                ("X_ACCESS_TOKEN", Some("at")),
                ("X_ACCESS_TOKEN_SECRET", Some("ats")),
            ],
            || TrendpostConfigLoader::new().load().unwrap(),
        )
    }

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("FOO", Some("bar"), || {
            let mut v = json!("prefix-${FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_in_array_and_object() {
        temp_env::with_vars([("CITY", Some("Jakarta")), ("REGION", Some("ID"))], || {
            let mut v = json!(["hello-$CITY", { "loc": "${CITY}-${REGION}" }, 42, true, null]);
            expand_env_in_value(&mut v);
            assert_eq!(
                v,
                json!(["hello-Jakarta", { "loc": "Jakarta-ID" }, 42, true, null])
            );
        });
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        temp_env::with_vars(
            [
                ("TRENDPOST_TEST_SECRET", Some("pa$$word${TRENDPOST_TEST_OTHER}")),
                ("TRENDPOST_TEST_OTHER", Some("leaked")),
            ],
            || {
                let mut v = json!("${TRENDPOST_TEST_SECRET}");
                expand_env_in_value(&mut v);
                assert_eq!(v, json!("pa$$word${TRENDPOST_TEST_OTHER}"));
            },
        );
    }

    #[test]
    fn only_exact_placeholders_count_as_missing() {
        assert!(Secret::new("").is_missing());
        assert!(Secret::new("  ").is_missing());
        assert!(Secret::new("${X_API_KEY}").is_missing());
        assert!(!Secret::new("$ecret").is_missing());
        assert!(!Secret::new("${not a name}").is_missing());
        assert!(!Secret::new("abc${X_API_KEY}").is_missing());
        assert!(!Secret::new("${X_API_KEY}tail").is_missing());
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${TRENDPOST_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${TRENDPOST_DOES_NOT_EXIST}"));
    }

    #[test]
    fn complete_environment_validates() {
        let cfg = sample();
        assert_eq!(cfg.generation.api_key.expose(), "g-key");
        assert_eq!(cfg.publish.access_token_secret.expose(), "ats");
        cfg.validate().unwrap();
    }

    #[test]
    fn missing_generation_key_is_reported() {
        let mut cfg = sample();
        cfg.generation.api_key = Secret::new("${GEMINI_API_KEY}");
        match cfg.validate() {
            Err(TrendpostError::MissingCredential(names)) => {
                assert_eq!(names, "GEMINI_API_KEY")
            }
            other => panic!("expected missing credential, got {other:?}"),
        }
    }

    #[test]
    fn all_missing_credentials_are_listed() {
        let mut cfg = sample();
        cfg.publish.api_secret = Secret::new("");
        cfg.publish.access_token = Secret::new("   ");
        let err = cfg.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "missing credential: X_API_SECRET, X_ACCESS_TOKEN"
        );
    }

    #[test]
    fn zero_limit_is_rejected() {
        let mut cfg = sample();
        cfg.trends.limit = 0;
        assert!(matches!(cfg.validate(), Err(TrendpostError::Config(_))));
    }

    #[test]
    fn secrets_are_redacted_in_debug() {
        let cfg = sample();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("g-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn limit_accepts_strings() {
        let cfg = TrendpostConfigLoader::new()
            .with_yaml_str("trends:\n  limit: \"7\"\n")
            .load()
            .unwrap();
        assert_eq!(cfg.trends.limit, 7);
    }
}
