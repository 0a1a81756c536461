//! Error types for regionkit-core
//!
//! Only retrieval and configuration can fail. Region extraction and block
//! classification degrade to defaults instead of erroring.

use thiserror::Error;

/// Failure reported by a retrieval collaborator. Aborts the current load.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Non-success response; `message` is shown to the user verbatim
    #[error("{message}")]
    Status { status: u16, message: String },

    /// The request never produced a response
    #[error("request failed: {0}")]
    Transport(String),

    /// A success response whose body could not be decoded
    #[error("unreadable response: {0}")]
    Decode(String),

    #[error("no document at path: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RetrievalError {
    /// Text for the inline diagnostic shown next to the failure status.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unknown recognizer '{0}' in classifier config")]
    UnknownRecognizer(String),

    #[error("no managed page matches '{0}'")]
    UnknownPage(String),

    #[error("no managed pages configured")]
    NoPages,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_message_verbatim() {
        let err = RetrievalError::Status {
            status: 404,
            message: "not found".to_string(),
        };
        assert_eq!(err.user_message(), "not found");
    }
}
