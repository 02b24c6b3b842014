//! Error types for the model adapter.

/// Errors produced while asking the language model for a judgment.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("api key variable {var} is not set")]
    MissingApiKey { var: String },

    #[error("http request failed: {0}")]
    Http(reqwest::Error),

    #[error("model endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model returned no candidate text")]
    EmptyResponse,

    #[error("model output is not a verdict ({reason}): {raw}")]
    MalformedVerdict { raw: String, reason: String },

    #[error("model unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ModelError {
    /// Drops the request URL so connection errors never echo credentials.
    fn from(err: reqwest::Error) -> Self {
        ModelError::Http(err.without_url())
    }
}

/// Result type for model calls.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
