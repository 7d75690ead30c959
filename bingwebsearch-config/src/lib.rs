//! Loader for client configuration with YAML + environment overlays.
//!
//! Sources are merged in the order they are added; `BINGWEBSEARCH__`-prefixed
//! environment variables are always layered on top (`__` separates nested keys,
//! e.g. `BINGWEBSEARCH__DEFAULTS__MKT=en-GB`). String values may reference
//! other environment variables as `${VAR}`; expansion is recursive up to a
//! fixed depth and unknown variables are left untouched.
//!
//! ```yaml
//! endpoint: https://api.bing.microsoft.com/v7.0/search
//! subscription_key: "${BING_SEARCH_V7_SUBSCRIPTION_KEY}"
//! timeout_secs: 15
//! headers:
//!   accept_language: en-CA
//! defaults:
//!   count: 10
//!   mkt: en-CA
//!   response_filter: [Webpages]
//! save_json: response.json
//! ```
use bingwebsearch_common::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS,
};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub use config::ConfigError as Error;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "BINGWEBSEARCH";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Explicit subscription key. Empty or unexpanded (`${...}`) values are
    /// dropped at load time so the environment fallback still applies.
    #[serde(default, deserialize_with = "lenient::text")]
    pub subscription_key: Option<String>,
    #[serde(default = "default_timeout_secs", deserialize_with = "lenient::number")]
    pub timeout_secs: u64,
    #[serde(
        default = "default_connect_timeout_secs",
        deserialize_with = "lenient::number"
    )]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub headers: HeaderDefaults,
    #[serde(default)]
    pub defaults: ParamDefaults,
    /// Where to dump the raw response JSON, if anywhere.
    #[serde(default)]
    pub save_json: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            subscription_key: None,
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            headers: HeaderDefaults::default(),
            defaults: ParamDefaults::default(),
            save_json: None,
        }
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Optional request headers sent with every search.
///
/// Numeric-looking YAML values are accepted and read back as text. YAML drops
/// leading zeros from unquoted numbers, so quote IDs such as `client_id`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HeaderDefaults {
    #[serde(default, deserialize_with = "lenient::text")]
    pub accept_language: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub pragma: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub user_agent: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub client_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub client_ip: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub location: Option<String>,
}

/// Defaults applied to search parameters the caller leaves unset.
///
/// Enumerated values stay as strings here; the client validates them.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParamDefaults {
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub count: Option<u32>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub mkt: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub cc: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub freshness: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub safe_search: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub set_lang: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub text_format: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub text_decorations: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub answer_count: Option<u32>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub response_filter: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub promote: Option<Vec<String>>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

/// Env values always arrive as strings, YAML values as whatever YAML guessed.
/// These accept either form for the field's real type.
mod lenient {
    use serde::de::{DeserializeOwned, Deserializer, Error};
    use serde::Deserialize;
    use serde_json::Value;
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        match Option::<Value>::deserialize(d)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(other) => Err(D::Error::custom(format!(
                "invalid type: expected a string, got {other}"
            ))),
        }
    }

    pub fn number<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + DeserializeOwned,
        T::Err: Display,
    {
        parse_number(Value::deserialize(d)?)
    }

    pub fn opt_number<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr + DeserializeOwned,
        T::Err: Display,
    {
        match Option::<Value>::deserialize(d)? {
            None | Some(Value::Null) => Ok(None),
            Some(v) => parse_number(v).map(Some),
        }
    }

    fn parse_number<T, E>(v: Value) -> Result<T, E>
    where
        T: FromStr + DeserializeOwned,
        T::Err: Display,
        E: Error,
    {
        match v {
            Value::String(s) => s
                .trim()
                .parse()
                .map_err(|e| E::custom(format!("invalid number `{s}`: {e}"))),
            other => T::deserialize(other).map_err(E::custom),
        }
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        match Option::<Value>::deserialize(d)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(b)),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Some(true)),
                "false" | "0" | "no" => Ok(Some(false)),
                _ => Err(D::Error::custom(format!("invalid boolean `{s}`"))),
            },
            Some(other) => Err(D::Error::custom(format!(
                "invalid type: expected a boolean, got {other}"
            ))),
        }
    }

    /// A YAML sequence, or one comma-separated string.
    pub fn list<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
        match Option::<Value>::deserialize(d)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(
                s.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(D::Error::custom(format!(
                        "invalid type: expected a list of strings, got {other}"
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Some),
            Some(other) => Err(D::Error::custom(format!(
                "invalid type: expected a list, got {other}"
            ))),
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

fn usable_secret(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.contains("${"))
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct SearchConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SearchConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchConfigLoader {
    /// Start with no files; only defaults and `BINGWEBSEARCH__` env overrides.
    ///
    /// ```
    /// use bingwebsearch_config::SearchConfigLoader;
    ///
    /// let config = SearchConfigLoader::new()
    ///     .with_yaml_str("timeout_secs: 3")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.timeout_secs, 3);
    /// assert_eq!(config.endpoint, "https://api.bing.microsoft.com/v7.0/search");
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`Self::with_file`], but a missing file is skipped.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    ///
    /// ```
    /// use bingwebsearch_config::SearchConfigLoader;
    ///
    /// let cfg = SearchConfigLoader::new()
    ///     .with_yaml_str(
    ///         r#"
    /// headers:
    ///   accept_language: fr-CA
    /// defaults:
    ///   mkt: fr-CA
    ///   response_filter: [Webpages, News]
    /// "#,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.headers.accept_language.as_deref(), Some("fr-CA"));
    /// assert_eq!(
    ///     cfg.defaults.response_filter,
    ///     Some(vec!["Webpages".to_string(), "News".to_string()])
    /// );
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Merge all sources, expand `${VAR}` placeholders, and deserialize.
    pub fn load(self) -> Result<SearchConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX).separator("__"),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let mut typed: SearchConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;
        typed.subscription_key = usable_secret(typed.subscription_key.take());

        Ok(typed)
    }
}
