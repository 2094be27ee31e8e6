//! Headline sentiment classification over hosted LLM completion endpoints.
//!
//! A [`SentimentClassifier`] turns a [`NewsItem`] into a fixed prompt, makes a
//! single call through a [`Provider`](providers::Provider) and maps the reply
//! onto one of four [`Sentiment`] values.

pub mod classifier;
pub mod config;
pub mod error;
pub mod news;
pub mod prompt;
pub mod providers;
pub mod sentiment;

pub use classifier::SentimentClassifier;
pub use config::Config;
pub use error::NewsmoodError;
pub use news::NewsItem;
pub use sentiment::Sentiment;
