use thiserror::Error;

/// A scenario that cannot be simulated as given.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("scenario field `{0}` is missing or empty")]
    MissingField(String),
    #[error("scenario field `{field}` is not numeric")]
    NonNumeric { field: String },
    #[error("scenario field `{field}` is invalid: {reason}")]
    Invalid { field: String, reason: String },
}

impl ScenarioError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::MissingField(field) => field,
            Self::NonNumeric { field } | Self::Invalid { field, .. } => field,
        }
    }
}

/// Failures at the forecast-engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start forecast engine: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("forecast engine i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("forecast engine did not answer within {after_ms} ms")]
    Timeout { after_ms: u64 },
    #[error("forecast engine exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("forecast engine payload could not be encoded or decoded: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("forecast engine result is missing `{0}`")]
    MissingField(&'static str),
    #[error("forecast engine returned an empty predicted glucose series")]
    EmptyForecast,
    #[error("forecast engine returned a non-finite glucose value at index {index}")]
    NonFiniteForecast { index: usize },
    #[error("predicted series has {actual} points, baseline has {expected}")]
    InconsistentSeriesLength { expected: usize, actual: usize },
    #[error("forecast engine rejected the scenario: {0}")]
    Rejected(String),
}
