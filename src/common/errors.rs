use thiserror::Error;

/// Errors surfaced by the console library.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// Input rejected before any network call was made.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backend could not be reached, answered with a non-2xx status,
    /// or sent a body we could not decode.
    #[error("network error: {0}")]
    Network(String),

    #[error("not signed in")]
    NotAuthenticated,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl ConsoleError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ConsoleError::Validation(_))
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ConsoleError::Network(_))
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(e: reqwest::Error) -> Self {
        ConsoleError::Network(e.to_string())
    }
}

impl From<std::io::Error> for ConsoleError {
    fn from(e: std::io::Error) -> Self {
        ConsoleError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for ConsoleError {
    fn from(e: serde_json::Error) -> Self {
        ConsoleError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
