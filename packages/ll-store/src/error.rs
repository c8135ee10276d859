//! Error types for the LL layer.
//!
//! Errors at this level are engine-focused. Semantic errors like "empty key"
//! or "not a number" belong in higher layers.

/// Errors at the LL (low-level) layer.
#[derive(Debug, thiserror::Error)]
pub enum LLError {
    /// Generic I/O failure inside the engine.
    ///
    /// Use this for file I/O errors, mmap failures, lock failures, etc.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The operation is not supported by this engine.
    ///
    /// For example, writing to a read-only snapshot.
    #[error("operation not supported")]
    NotSupported,

    /// Resource limit exceeded.
    #[error("resource exhausted")]
    ResourceExhausted,

    /// The engine's persisted state is not in a shape it can read back.
    #[error("corrupt store: {message}")]
    Corrupt { message: String },
}

impl LLError {
    /// Wrap any error as a transport failure.
    pub fn transport(e: impl std::error::Error + Send + Sync + 'static) -> Self {
        LLError::Transport(Box::new(e))
    }

    /// Create a corruption error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        LLError::Corrupt {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for LLError {
    fn from(e: std::io::Error) -> Self {
        LLError::Transport(Box::new(e))
    }
}
