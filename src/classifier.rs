use std::sync::Arc;

use tracing::{Instrument, debug, error, info_span, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::news::NewsItem;
use crate::prompt::Prompt;
use crate::providers::{self, BlockReason, Completion, CompletionRequest, Provider};
use crate::sentiment::Sentiment;

/// Headline sentiment classifier.
///
/// Holds an immutable backend handle and sampling settings; every call is
/// independent. All failures collapse into `Sentiment::Error` at this
/// boundary, so `classify` never returns a `Result`.
pub struct SentimentClassifier {
    provider: Option<Arc<dyn Provider>>,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl std::fmt::Debug for SentimentClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentClassifier")
            .field("provider", &self.provider.as_ref().map(|p| p.name()))
            .field("model", &self.model)
            .finish()
    }
}

impl SentimentClassifier {
    /// Classifier over an already-built backend. Sampling settings come from
    /// `config`; its credential is ignored.
    pub fn new(provider: Arc<dyn Provider>, config: &Config) -> Self {
        Self {
            provider: Some(provider),
            ..Self::unconfigured(config)
        }
    }

    /// Classifier with no backend. Every classification returns `Error`.
    pub fn unconfigured(config: &Config) -> Self {
        Self {
            provider: None,
            model: config.model().to_owned(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }

    /// Build the configured backend. A backend that cannot be built (missing
    /// credential, client failure) leaves the classifier unconfigured rather
    /// than failing startup.
    pub fn from_config(config: &Config) -> Self {
        match providers::build(config) {
            Ok(provider) => Self::new(provider, config),
            Err(e) => {
                warn!(error = %e, "sentiment analysis will not function");
                Self::unconfigured(config)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Classify with the configured model.
    pub async fn classify(&self, item: &NewsItem) -> Sentiment {
        self.classify_with_model(item, &self.model).await
    }

    /// Classify with an explicit model for this call only.
    pub async fn classify_with_model(&self, item: &NewsItem, model: &str) -> Sentiment {
        let span = info_span!(
            "classify",
            request_id = %Uuid::now_v7(),
            provider = self.provider.as_ref().map(|p| p.name()).unwrap_or("none"),
            model,
            link = item.link.as_deref().unwrap_or(""),
        );
        let sentiment = self.run(item, model).instrument(span.clone()).await;
        span.in_scope(|| debug!(%sentiment, "classified"));
        sentiment
    }

    async fn run(&self, item: &NewsItem, model: &str) -> Sentiment {
        let Some(provider) = self.provider.as_ref() else {
            error!("provider not configured, cannot perform sentiment analysis");
            return Sentiment::Error;
        };

        if item.is_blank() {
            warn!("title and description are both empty, returning neutral");
            return Sentiment::Neutral;
        }

        let prompt = Prompt::for_item(item);
        let messages = prompt.messages();
        let request = CompletionRequest {
            model,
            messages: &messages,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        };

        match provider.complete(&request).await {
            Ok(completion) => interpret(&completion, &prompt),
            Err(e) => {
                error!(error = %e, "completion call failed");
                Sentiment::Error
            }
        }
    }
}

/// Map a backend reply onto the label set.
///
/// Exact label first; otherwise substring recovery (`positive` before
/// `negative`); anything else, including an empty or blocked reply, is
/// `Neutral`. Never returns `Error`.
pub fn interpret(completion: &Completion, prompt: &Prompt) -> Sentiment {
    let label = completion.text.trim().to_lowercase();

    if label.is_empty() {
        let input = prompt.excerpt();
        match &completion.block {
            Some(BlockReason::Prompt(reason)) => {
                warn!(%reason, %input, "content blocked by provider, defaulting to neutral")
            }
            Some(BlockReason::Candidate(reason)) => warn!(
                %reason,
                %input,
                "candidate stopped by provider safety settings, defaulting to neutral"
            ),
            None => warn!(%input, "provider returned an empty response, defaulting to neutral"),
        }
        return Sentiment::Neutral;
    }

    if let Some(sentiment) = Sentiment::from_label(&label) {
        return sentiment;
    }

    let recovered = if label.contains("positive") {
        Sentiment::Positive
    } else if label.contains("negative") {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };
    warn!(
        reply = %label,
        input = %prompt.excerpt(),
        %recovered,
        "unexpected sentiment label"
    );
    recovered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> Prompt {
        Prompt::for_item(&NewsItem::new("Headline", "Body"))
    }

    fn reply(text: &str) -> Sentiment {
        interpret(&Completion::from_text(text), &prompt())
    }

    #[test]
    fn exact_labels() {
        assert_eq!(reply("positive"), Sentiment::Positive);
        assert_eq!(reply("negative"), Sentiment::Negative);
        assert_eq!(reply("neutral"), Sentiment::Neutral);
    }

    #[test]
    fn case_and_whitespace_normalized() {
        assert_eq!(reply("Positive  "), Sentiment::Positive);
        assert_eq!(reply("\n NEGATIVE\n"), Sentiment::Negative);
    }

    #[test]
    fn substring_recovery() {
        assert_eq!(reply("I think this is negative overall"), Sentiment::Negative);
        assert_eq!(reply("Positive."), Sentiment::Positive);
        assert_eq!(reply("Sentiment: negative!"), Sentiment::Negative);
    }

    #[test]
    fn positive_wins_when_both_present() {
        assert_eq!(reply("not negative, positive"), Sentiment::Positive);
    }

    #[test]
    fn unrecognized_text_is_neutral() {
        assert_eq!(reply("mixed"), Sentiment::Neutral);
        assert_eq!(reply("error"), Sentiment::Neutral);
    }

    #[test]
    fn empty_and_blocked_are_neutral() {
        assert_eq!(reply(""), Sentiment::Neutral);
        assert_eq!(reply("   "), Sentiment::Neutral);
        let blocked = Completion::blocked(BlockReason::Prompt("SAFETY".into()));
        assert_eq!(interpret(&blocked, &prompt()), Sentiment::Neutral);
        let stopped = Completion::blocked(BlockReason::Candidate("SAFETY".into()));
        assert_eq!(interpret(&stopped, &prompt()), Sentiment::Neutral);
    }

    #[test]
    fn text_wins_over_block_metadata() {
        let completion = Completion {
            text: "negative".into(),
            block: Some(BlockReason::Candidate("SAFETY".into())),
        };
        assert_eq!(interpret(&completion, &prompt()), Sentiment::Negative);
    }

    #[test]
    fn unconfigured_reports_state() {
        let classifier = SentimentClassifier::unconfigured(&Config::default());
        assert!(!classifier.is_configured());
        assert_eq!(classifier.model(), "gemini-1.5-flash");
    }

    #[test]
    fn from_config_without_key_is_unconfigured() {
        let classifier = SentimentClassifier::from_config(&Config::default());
        assert!(!classifier.is_configured());
    }
}
