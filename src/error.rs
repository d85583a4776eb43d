// Error taxonomy for the topic pipeline.
//
// Pure operations (vocabulary, encoding, training, inference, labeling) return
// `TopicError` so callers can tell a bad configuration from a stale model.
// Anything touching files or the network uses `anyhow::Result` with context;
// those boundary errors are propagated as-is and never retried here.

/// Errors raised by the topic pipeline itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TopicError {
    /// Seed words, label table, topic count or credentials are unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A document could not be encoded or an LDA-C line could not be read.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The model and the encoded corpus were built from different vocabularies.
    #[error("consistency error: {0}")]
    Consistency(String),
}

impl TopicError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }
}
