use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a failure, used by screens to decide what to do
/// with it (force logout, show a banner, offer a retry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected client-side before any request was sent
    Validation,
    /// No session token available
    NotAuthenticated,
    /// The API refused the token (401/403)
    Unauthorized,
    NotFound,
    /// Any other non-2xx answer
    Request,
    /// Transport failure: connect, timeout, TLS, body read
    Network,
    /// Local failure: filesystem, config, decoding
    Local,
}

#[derive(Debug, Error)]
pub enum BazaarError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    NotAuthenticated { message: String },

    #[error("Unauthorized ({status}): {}", detail(.message))]
    Unauthorized { status: u16, message: Option<String> },

    #[error("Not found: {}", detail(.message))]
    NotFound { message: Option<String> },

    #[error("Request failed with status {status}: {}", detail(.message))]
    Request { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Unknown config key: {key}")]
    ConfigKeyNotFound { key: String },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidConfigValue { key: String, value: String },

    #[error("Home directory not found")]
    HomeNotFound,
}

fn detail(message: &Option<String>) -> &str {
    message.as_deref().unwrap_or("no details")
}

pub type Result<T> = std::result::Result<T, BazaarError>;

impl BazaarError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_authenticated(message: impl Into<String>) -> Self {
        Self::NotAuthenticated {
            message: message.into(),
        }
    }

    /// Build an error from a non-2xx status and the `message` field of the
    /// response body, if there was one.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status, message },
            404 => Self::NotFound { message },
            _ => Self::Request { status, message },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotAuthenticated { .. } => ErrorKind::NotAuthenticated,
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Request { .. } => ErrorKind::Request,
            Self::Network(_) => ErrorKind::Network,
            _ => ErrorKind::Local,
        }
    }

    /// Text to show the user: the API's own message when it sent one,
    /// otherwise the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation { message } | Self::NotAuthenticated { message } => message.clone(),
            Self::Unauthorized {
                message: Some(m), ..
            }
            | Self::NotFound { message: Some(m) }
            | Self::Request {
                message: Some(m), ..
            } => m.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            ErrorKind::Validation => 2,
            ErrorKind::NotAuthenticated => 3,
            ErrorKind::Unauthorized => 4,
            ErrorKind::NotFound => 5,
            ErrorKind::Network => 6,
            ErrorKind::Request => 7,
            ErrorKind::Local => 1,
        }
    }
}
