use serde::Deserialize;

use crate::error::NewsmoodError;

/// A news item as handed to the classifier.
///
/// Only `title` and `description` reach the prompt. `image_url` and `link`
/// ride along for the caller and for log context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
}

// Headline-feed record shape: `{"Headline": .., "Description": .., "URL": ..}`.
#[derive(Deserialize)]
struct HeadlineRecord {
    #[serde(rename = "Headline", default)]
    headline: Option<String>,
    #[serde(rename = "Description", default)]
    description: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
}

impl From<HeadlineRecord> for NewsItem {
    fn from(record: HeadlineRecord) -> Self {
        Self {
            title: record.headline.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
            image_url: None,
            link: record.url,
        }
    }
}

impl NewsItem {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            image_url: None,
            link: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Build from a generic mapping with `Headline` / `Description` / `URL`
    /// keys. Missing keys read as empty; unknown keys are ignored.
    pub fn from_record(record: &serde_json::Value) -> Result<Self, NewsmoodError> {
        if !record.is_object() {
            return Err(NewsmoodError::InvalidItem(
                "record must be a JSON object".to_owned(),
            ));
        }
        HeadlineRecord::deserialize(record)
            .map(Self::from)
            .map_err(|e| NewsmoodError::InvalidItem(e.to_string()))
    }

    /// True when neither field carries any non-whitespace text.
    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.description.trim().is_empty()
    }
}
