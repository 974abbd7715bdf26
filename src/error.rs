use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected before the first cycle runs.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("sample generation failed: {0}")]
    GenerationFailure(String),
    #[error("sink '{sink}' failed: {reason}")]
    SinkFailure { sink: String, reason: String },
    #[error("malformed table: {0}")]
    MalformedTable(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration(message.into())
    }

    pub fn sink(sink: impl Into<String>, reason: impl ToString) -> Self {
        EngineError::SinkFailure {
            sink: sink.into(),
            reason: reason.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
