pub mod gemini;
pub mod openai;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::{Config, ProviderKind};
use crate::error::NewsmoodError;

/// Messages sent to LLM providers.
/// Enum — variants are known at compile time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    System { content: String },
    User { content: String },
}

impl Message {
    pub fn content(&self) -> &str {
        match self {
            Message::System { content } | Message::User { content } => content,
        }
    }
}

/// One completion call: everything a backend needs, nothing vendor-specific.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Why a backend withheld its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// The prompt itself was rejected (prompt-level safety feedback).
    Prompt(String),
    /// A candidate was stopped by the safety system; carries the finish reason.
    Candidate(String),
}

/// Backend reply. `text` is empty when nothing could be extracted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub block: Option<BlockReason>,
}

impl Completion {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            block: None,
        }
    }

    pub fn blocked(reason: BlockReason) -> Self {
        Self {
            text: String::new(),
            block: Some(reason),
        }
    }
}

/// Extension point for text-completion backends. The classifier depends on
/// this trait only; vendor wire types stay inside the adapters.
///
/// Implementations translate every transport or vendor failure into
/// `NewsmoodError` and make exactly one attempt per call.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<Completion, NewsmoodError>;
}

/// Build the backend selected by `config`. Fails when the credential is
/// missing or the HTTP client cannot be constructed.
pub fn build(config: &Config) -> Result<Arc<dyn Provider>, NewsmoodError> {
    let api_key = config
        .api_key()
        .map(|key| SecretString::from(key.expose_secret().to_owned()))
        .ok_or_else(|| {
            NewsmoodError::NotConfigured(format!(
                "{} environment variable not set",
                config.provider.api_key_var()
            ))
        })?;
    let base_url = config.base_url().to_owned();

    let provider: Arc<dyn Provider> = match config.provider {
        ProviderKind::Gemini => Arc::new(gemini::GeminiProvider::new(
            api_key,
            base_url,
            config.timeout,
        )?),
        ProviderKind::OpenAi => Arc::new(openai::OpenAiProvider::new(
            api_key,
            base_url,
            config.timeout,
        )?),
    };
    Ok(provider)
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, NewsmoodError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| NewsmoodError::Config(format!("cannot build HTTP client: {e}")))
}

/// Map a non-success HTTP status to a provider error carrying the body.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, NewsmoodError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(NewsmoodError::Provider(format!("{status}: {}", body.trim())))
}

pub(crate) fn transport_error(e: reqwest::Error) -> NewsmoodError {
    NewsmoodError::Transport(e.to_string())
}

pub(crate) fn decode_error(e: reqwest::Error) -> NewsmoodError {
    NewsmoodError::Provider(format!("malformed response: {e}"))
}
