use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::NewsmoodError;

use super::{
    BlockReason, Completion, CompletionRequest, Message, Provider, check_status, decode_error,
    http_client, transport_error,
};

/// OpenAI-compatible `chat/completions` backend. Role-segmented: the
/// instruction travels as a system message.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NewsmoodError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a Message> for ChatMessage<'a> {
    fn from(message: &'a Message) -> Self {
        let role = match message {
            Message::System { .. } => "system",
            Message::User { .. } => "user",
        };
        Self {
            role,
            content: message.content(),
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_completion(self) -> Completion {
        let Some(choice) = self.choices.into_iter().next() else {
            return Completion::default();
        };
        let text = choice
            .message
            .and_then(|m| m.content)
            .unwrap_or_default();
        let block = choice
            .finish_reason
            .filter(|r| r == "content_filter")
            .map(BlockReason::Candidate);
        Completion { text, block }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> Result<Completion, NewsmoodError> {
        let body = ChatRequest {
            model: request.model,
            messages: request.messages.iter().map(ChatMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
        };

        debug!(model = request.model, messages = body.messages.len(), "sending chat completion");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let data: ChatResponse = check_status(response)
            .await?
            .json()
            .await
            .map_err(decode_error)?;

        Ok(data.into_completion())
    }
}
