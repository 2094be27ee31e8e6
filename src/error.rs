use thiserror::Error;

#[derive(Debug, Error)]
pub enum NewsmoodError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid news item: {0}")]
    InvalidItem(String),
}
