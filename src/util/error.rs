use std::io;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend returned {status} for {url}: {detail}")]
    Status {
        status: u16,
        url: String,
        detail: String,
    },

    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Malformed payload from {url}: {source}")]
    Payload {
        url: String,
        #[source]
        source: PayloadError,
    },
}

impl ApiError {
    /// Authentication failures, which usually mean the token is missing or stale.
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Status { status: 401 | 403, .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected {expected}, found {found}")]
    UnexpectedShape {
        expected: &'static str,
        found: &'static str,
    },
}

// A unified error type for the entire application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    #[error("{0}")]
    Generic(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
