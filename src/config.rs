use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::NewsmoodError;

const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024; // 64 KiB

pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const MAX_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 10;
pub const MAX_OUTPUT_TOKENS_LIMIT: u32 = 32;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Which completion backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Gemini,
    OpenAi,
}

impl ProviderKind {
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-1.5-flash",
            ProviderKind::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            ProviderKind::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Environment variable holding this backend's credential.
    pub fn api_key_var(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = NewsmoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            other => Err(NewsmoodError::Config(format!("unknown provider '{other}'"))),
        }
    }
}

// --- TOML deserialization struct (private, maps 1:1 to the file schema) ---

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    provider: ProviderKind,
    model: Option<String>,
    base_url: Option<String>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
    timeout_secs: Option<u64>,
}

/// Runtime configuration. Built once at startup and handed to the
/// classifier; nothing reads the environment after construction.
///
/// The credential never comes from the file and is redacted in `Debug`.
#[derive(Debug)]
pub struct Config {
    pub provider: ProviderKind,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
    model: Option<String>,
    base_url: Option<String>,
    api_key: Option<SecretString>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            model: None,
            base_url: None,
            api_key: None,
        }
    }
}

impl FromStr for Config {
    type Err = NewsmoodError;

    /// Parse a TOML configuration file body. Environment is not consulted.
    fn from_str(content: &str) -> Result<Self, NewsmoodError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| NewsmoodError::Config(e.to_string()))?;

        let defaults = Config::default();
        let config = Self {
            provider: file.provider,
            temperature: file.temperature.unwrap_or(defaults.temperature),
            max_output_tokens: file.max_output_tokens.unwrap_or(defaults.max_output_tokens),
            timeout: file
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            model: file.model,
            base_url: file.base_url,
            api_key: None,
        };
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    /// Load from a TOML file. Checks file size before reading.
    pub fn load(path: &Path) -> Result<Self, NewsmoodError> {
        let metadata = std::fs::metadata(path)
            .map_err(|e| NewsmoodError::Config(format!("cannot read {}: {e}", path.display())))?;

        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(NewsmoodError::Config(format!(
                "config file exceeds {MAX_CONFIG_FILE_SIZE} byte limit"
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| NewsmoodError::Config(format!("cannot read {}: {e}", path.display())))?;

        content.parse()
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, NewsmoodError> {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Apply `NEWSMOOD_*` overrides and pick up the provider credential.
    /// `lookup` stands in for the environment so callers (and tests) decide
    /// where values come from.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, NewsmoodError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("NEWSMOOD_PROVIDER") {
            self.provider = v.parse()?;
        }
        if let Some(v) = get("NEWSMOOD_MODEL") {
            self.model = Some(v.trim().to_owned());
        }
        if let Some(v) = get("NEWSMOOD_BASE_URL") {
            self.base_url = Some(v.trim().to_owned());
        }
        if let Some(v) = get("NEWSMOOD_TEMPERATURE") {
            self.temperature = parse_var("NEWSMOOD_TEMPERATURE", &v)?;
        }
        if let Some(v) = get("NEWSMOOD_MAX_OUTPUT_TOKENS") {
            self.max_output_tokens = parse_var("NEWSMOOD_MAX_OUTPUT_TOKENS", &v)?;
        }
        if let Some(v) = get("NEWSMOOD_TIMEOUT_SECS") {
            self.timeout = Duration::from_secs(parse_var("NEWSMOOD_TIMEOUT_SECS", &v)?);
        }
        if let Some(key) = get(self.provider.api_key_var()) {
            self.api_key = Some(SecretString::from(key.trim().to_owned()));
        }

        self.validate()?;
        Ok(self)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref()
    }

    /// Configured model, or the backend's default.
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Configured endpoint base without trailing slash, or the backend's default.
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .unwrap_or_else(|| self.provider.default_base_url())
    }

    fn validate(&self) -> Result<(), NewsmoodError> {
        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(NewsmoodError::Config(format!(
                "temperature must be within 0.0..={MAX_TEMPERATURE}, got {}",
                self.temperature
            )));
        }
        if !(1..=MAX_OUTPUT_TOKENS_LIMIT).contains(&self.max_output_tokens) {
            return Err(NewsmoodError::Config(format!(
                "max_output_tokens must be within 1..={MAX_OUTPUT_TOKENS_LIMIT}, got {}",
                self.max_output_tokens
            )));
        }
        if self.timeout.is_zero() {
            return Err(NewsmoodError::Config("timeout_secs must be positive".to_owned()));
        }
        if self.model.as_deref().is_some_and(|m| m.trim().is_empty()) {
            return Err(NewsmoodError::Config("model must not be empty".to_owned()));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str, value: &str) -> Result<T, NewsmoodError> {
    value
        .trim()
        .parse()
        .map_err(|_| NewsmoodError::Config(format!("{key}: cannot parse '{value}'")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.model(), "gemini-1.5-flash");
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_output_tokens, 10);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.api_key().is_none());
    }

    #[test]
    fn parse_full_file() {
        let config: Config = r#"
provider = "openai"
model = "gpt-4o-mini"
base_url = "http://localhost:8080/v1/"
temperature = 0.1
max_output_tokens = 5
timeout_secs = 12
"#
        .parse()
        .expect("full config should parse");
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.model(), "gpt-4o-mini");
        assert_eq!(config.base_url(), "http://localhost:8080/v1");
        assert_eq!(config.max_output_tokens, 5);
        assert_eq!(config.timeout, Duration::from_secs(12));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = "".parse().expect("empty config should parse");
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(
            config.base_url(),
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn unknown_field_rejected() {
        let err = "api_key = \"inline\"".parse::<Config>().unwrap_err();
        assert!(matches!(err, NewsmoodError::Config(_)));
    }

    #[test]
    fn unknown_provider_rejected() {
        let err = "provider = \"llama\"".parse::<Config>().unwrap_err();
        assert!(matches!(err, NewsmoodError::Config(_)));
    }

    #[test]
    fn temperature_out_of_range() {
        let err = "temperature = 0.7".parse::<Config>().unwrap_err();
        assert!(matches!(err, NewsmoodError::Config(_)));
    }

    #[test]
    fn max_output_tokens_out_of_range() {
        assert!("max_output_tokens = 0".parse::<Config>().is_err());
        assert!("max_output_tokens = 500".parse::<Config>().is_err());
    }

    #[test]
    fn zero_timeout_rejected() {
        assert!("timeout_secs = 0".parse::<Config>().is_err());
    }

    #[test]
    fn env_overrides_and_key() {
        let config = Config::default()
            .with_env(env(&[
                ("NEWSMOOD_MODEL", "gemini-2.0-flash"),
                ("NEWSMOOD_MAX_OUTPUT_TOKENS", "8"),
                ("GEMINI_API_KEY", " secret "),
            ]))
            .unwrap();
        assert_eq!(config.model(), "gemini-2.0-flash");
        assert_eq!(config.max_output_tokens, 8);
        assert_eq!(config.api_key().unwrap().expose_secret(), "secret");
    }

    #[test]
    fn env_key_follows_provider() {
        let config = Config::default()
            .with_env(env(&[
                ("NEWSMOOD_PROVIDER", "OpenAI"),
                ("GEMINI_API_KEY", "wrong-backend"),
            ]))
            .unwrap();
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert!(config.api_key().is_none());
        assert_eq!(config.model(), "gpt-4o-mini");
    }

    #[test]
    fn blank_env_values_ignored() {
        let config = Config::default()
            .with_env(env(&[("GEMINI_API_KEY", "   "), ("NEWSMOOD_MODEL", "")]))
            .unwrap();
        assert!(config.api_key().is_none());
        assert_eq!(config.model(), "gemini-1.5-flash");
    }

    #[test]
    fn unparseable_env_value() {
        let err = Config::default()
            .with_env(env(&[("NEWSMOOD_TEMPERATURE", "cold")]))
            .unwrap_err();
        assert!(matches!(err, NewsmoodError::Config(_)));
    }

    #[test]
    fn debug_redacts_key() {
        let config = Config::default().with_api_key("super-secret-value");
        assert!(!format!("{config:?}").contains("super-secret-value"));
    }
}
