use crate::news::NewsItem;
use crate::providers::Message;

pub const INSTRUCTION: &str = "You are a sentiment analysis assistant. \
Analyze the sentiment of the provided news item (title and/or description). \
Classify it as 'positive', 'negative', or 'neutral'. \
Respond with ONLY one of these three words, without any additional explanation or punctuation.";

/// Classification prompt for one news item. Rebuilt on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    content: String,
}

impl Prompt {
    pub fn for_item(item: &NewsItem) -> Self {
        Self {
            content: compose_content(&item.title, &item.description),
        }
    }

    /// The `Description:` / `Title:` block, trimmed.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// News content followed by the completion cue.
    pub fn payload(&self) -> String {
        format!("News Content:\n{}\n\nSentiment:", self.content)
    }

    /// Instruction and payload as one string, for single-prompt backends.
    pub fn render(&self) -> String {
        format!("{INSTRUCTION}\n\n{}", self.payload())
    }

    /// Role-segmented form: instruction as system turn, payload as user turn.
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::System {
                content: INSTRUCTION.to_owned(),
            },
            Message::User {
                content: self.payload(),
            },
        ]
    }

    /// Leading slice of the content for log lines.
    pub fn excerpt(&self) -> String {
        self.content.chars().take(100).collect()
    }
}

fn compose_content(title: &str, description: &str) -> String {
    let mut content = String::new();
    if !description.is_empty() {
        content.push_str("Description: ");
        content.push_str(description);
        content.push('\n');
    }
    if !title.is_empty() {
        content.push_str("Title: ");
        content.push_str(title);
    }
    content.trim().to_owned()
}
