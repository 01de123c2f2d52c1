use http::StatusCode;
use thiserror::Error;

/// Result type alias for feed operations
pub type Result<T, E = FeedError> = std::result::Result<T, E>;

/// Errors that can occur while serving the feed
#[derive(Error, Debug)]
pub enum FeedError {
    /// A required query parameter is missing. Reported to the caller, never logged as an error.
    #[error("{0}")]
    InvalidRequest(String),

    /// The Notion API answered with a non-success status. Carries the response text.
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FeedError {
    pub fn status(&self) -> StatusCode {
        match self {
            FeedError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            FeedError::Upstream(_)
            | FeedError::Http(_)
            | FeedError::Json(_)
            | FeedError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed in the `error` field of the response body.
    pub fn public_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            "Server error".to_string()
        } else {
            message
        }
    }
}
