//! Error types for JMAP operations.

/// Result type alias for JMAP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// JMAP client error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-success response from the server, or a JMAP method-level error.
    #[error("Server error ({status}): {detail}")]
    Server {
        /// HTTP status code or JMAP error type.
        status: String,
        /// Human-readable detail, if the server provided one.
        detail: String,
    },

    /// The response envelope did not contain the expected method response.
    #[error("Missing method response: {0}")]
    MissingResponse(String),

    /// A requested object was not returned by the server.
    #[error("Object not found: {0}")]
    NotFound(String),
}

impl Error {
    /// Builds a server error from a JMAP method-level error response.
    #[must_use]
    pub fn method_error(error_type: &str, description: Option<&str>) -> Self {
        Self::Server {
            status: error_type.to_string(),
            detail: description.unwrap_or("no description").to_string(),
        }
    }
}
