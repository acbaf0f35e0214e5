use thiserror::Error;

/// Errors returned by the parking backend client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connect error, timeout, TLS, or a body that could
    /// not be read.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered, but with a non-2xx status or an error-flagged
    /// body (`"error": ...` or `"success": false`).
    #[error("bad response from {endpoint}: {message}")]
    BadResponse {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ApiError {
    /// Stable machine-readable code for logs and error bodies.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Network(_) => "network_failure",
            ApiError::BadResponse { .. } | ApiError::Deserialize { .. } => "bad_response",
            ApiError::InvalidBaseUrl { .. } => "invalid_base_url",
        }
    }
}
