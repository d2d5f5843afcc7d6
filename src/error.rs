use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("API error ({status}): {detail}")]
    Api { status: StatusCode, detail: String },

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Create a new API error from a response status and detail message
    pub fn api<T: Into<String>>(status: StatusCode, detail: T) -> Self {
        Self::Api {
            status,
            detail: detail.into(),
        }
    }

    /// Create a new authentication error
    pub fn authentication<T: Into<String>>(msg: T) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a new authorization error
    pub fn authorization<T: Into<String>>(msg: T) -> Self {
        Self::Authorization(msg.into())
    }

    /// Create a new storage error
    pub fn storage<T: Into<String>>(msg: T) -> Self {
        Self::Storage(msg.into())
    }

    /// HTTP status carried by the error, if it came from a server response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::HttpClient(err) => err.status(),
            ClientError::Authentication(_) => Some(StatusCode::UNAUTHORIZED),
            ClientError::Authorization(_) => Some(StatusCode::FORBIDDEN),
            _ => None,
        }
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
