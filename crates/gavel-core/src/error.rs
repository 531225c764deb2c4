//! Error types for the grading engine.

/// Grading errors.
#[derive(Debug, thiserror::Error)]
pub enum GradeError {
    /// Invalid configuration: penalty bounds, malformed rubric, bad runtime settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Judge output failed schema/shape validation.
    #[error("invalid judge response: {0}")]
    Validation(String),

    /// The generation call itself failed (transport, provider, timeout).
    #[error("generation call failed: {0}")]
    Collaborator(String),

    /// Rubric file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl GradeError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::Collaborator(_) => 1,
            Self::Configuration(_) | Self::Io(_) => 2,
        }
    }

    /// Whether another judging attempt may resolve the error.
    ///
    /// Transport failures and malformed judge output are interchangeable
    /// here; configuration and I/O problems are fatal.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Collaborator(_))
    }
}

impl From<anyhow::Error> for GradeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Collaborator(format!("{err:#}"))
    }
}

/// Result type for grading operations.
pub type GradeResult<T> = Result<T, GradeError>;
