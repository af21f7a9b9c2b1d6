//! Custom error types for menuboard.

use thiserror::Error;

/// Errors that can occur in menuboard.
///
/// Payloads are plain strings so errors can be cloned into UI events.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MenuboardError {
    /// The request could not be sent or the response could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a 4xx/5xx status.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Client-side validation failed before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// Invalid configuration value.
    #[error("config error: {0}")]
    Config(String),

    /// A URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),
}

impl MenuboardError {
    /// The message a user should see in a notification.
    ///
    /// Server errors show the backend's message when it sent one, otherwise
    /// `fallback` is used.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            MenuboardError::Server { message, .. } if !message.is_empty() => message.clone(),
            MenuboardError::Validation(message) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

impl From<std::io::Error> for MenuboardError {
    fn from(err: std::io::Error) -> Self {
        MenuboardError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for MenuboardError {
    fn from(err: reqwest::Error) -> Self {
        MenuboardError::Network(err.to_string())
    }
}

impl From<url::ParseError> for MenuboardError {
    fn from(err: url::ParseError) -> Self {
        MenuboardError::InvalidUrl(err.to_string())
    }
}
