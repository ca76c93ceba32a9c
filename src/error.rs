pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid questionnaire definition: {0}")]
    Definition(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Attempt is not submittable: {} incomplete question(s)", .incomplete.len())]
    Validation { incomplete: Vec<String> },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid attempt state: {0}")]
    InvalidState(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error during {operation} for entry '{entry_id}': {source}")]
    Transport {
        entry_id: String,
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("Request validation error: {0}")]
    Request(#[from] validator::ValidationErrors),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    pub fn transport(
        entry_id: impl Into<String>,
        operation: &'static str,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Error::Transport {
            entry_id: entry_id.into(),
            operation,
            source: source.into(),
        }
    }

    /// Transport failures may be retried per entry; everything else is
    /// either a caller mistake or a fatal definition problem.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}
