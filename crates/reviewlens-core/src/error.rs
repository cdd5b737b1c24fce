//! Error types for reviewlens

/// Result type alias using reviewlens' Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for reviewlens operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lexicon or settings errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Classifier construction errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Review ingestion errors
    #[error("ingest error: {0}")]
    Ingest(String),

    /// LLM enrichment errors
    #[error("enrichment error: {0}")]
    Enrichment(String),

    /// Checkpoint load/store errors
    #[error("checkpoint error: {0}")]
    Checkpoint(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new ingest error
    pub fn ingest(msg: impl Into<String>) -> Self {
        Self::Ingest(msg.into())
    }

    /// Create a new enrichment error
    pub fn enrichment(msg: impl Into<String>) -> Self {
        Self::Enrichment(msg.into())
    }

    /// Create a new checkpoint error
    pub fn checkpoint(msg: impl Into<String>) -> Self {
        Self::Checkpoint(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
