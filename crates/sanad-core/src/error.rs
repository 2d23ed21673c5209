//! Error taxonomy shared by every Sanad crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SanadError {
    /// No credential configured for a remote model at call time.
    #[error("API key missing for {0}")]
    ApiKeyMissing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote model unavailable, erroring, timed out or returned garbage.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// No corpus text to index. Routed to the apology tier, never surfaced
    /// from `answer`.
    #[error("Corpus is empty")]
    EmptyCorpus,

    #[error("Index mismatch: {chunks} chunks but {vectors} vectors")]
    IndexMismatch { chunks: usize, vectors: usize },

    #[error("Channel error: {0}")]
    Channel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SanadError {
    /// Whether this error is a missing-credential / bad-config failure rather
    /// than a transient remote failure.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::ApiKeyMissing(_) | Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, SanadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        assert!(SanadError::ApiKeyMissing("openai".into()).is_configuration());
        assert!(SanadError::Config("bad".into()).is_configuration());
        assert!(!SanadError::Upstream("503".into()).is_configuration());
        assert!(!SanadError::EmptyCorpus.is_configuration());
    }

    #[test]
    fn test_mismatch_message() {
        let err = SanadError::IndexMismatch { chunks: 3, vectors: 2 };
        assert_eq!(err.to_string(), "Index mismatch: 3 chunks but 2 vectors");
    }
}
