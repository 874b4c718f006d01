//! Error types for Ragdesk.

use thiserror::Error;

/// Library-level error type for Ragdesk operations.
#[derive(Error, Debug)]
pub enum RagdeskError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not reach server: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response from server: {0}")]
    MalformedResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl RagdeskError {
    /// Whether the request never produced a server response.
    pub fn is_transport(&self) -> bool {
        matches!(self, RagdeskError::Transport(_) | RagdeskError::Io(_))
    }
}

/// Result type alias for Ragdesk operations.
pub type Result<T> = std::result::Result<T, RagdeskError>;
