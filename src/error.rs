//! Error handling for the storefront client

use std::fmt;
use thiserror::Error;

/// Unified error type for the storefront client
#[derive(Error, Debug)]
pub enum Error {
    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// CSV reading or writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Local file errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A record failed validation before being sent
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The API answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Image upload errors
    #[error("Upload error: {0}")]
    Upload(String),

    /// General errors
    #[error("{0}")]
    General(String),
}

impl Error {
    /// Create a new API error
    pub fn api<T: fmt::Display>(status: u16, msg: T) -> Self {
        Error::Api {
            status,
            message: msg.to_string(),
        }
    }

    /// Create a new authentication error
    pub fn auth<T: fmt::Display>(msg: T) -> Self {
        Error::Auth(msg.to_string())
    }

    /// Create a new upload error
    pub fn upload<T: fmt::Display>(msg: T) -> Self {
        Error::Upload(msg.to_string())
    }

    /// Create a new general error
    pub fn general<T: fmt::Display>(msg: T) -> Self {
        Error::General(msg.to_string())
    }

    /// HTTP status of the failed request, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the request never got an answer from the server
    pub fn is_unreachable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// The text shown to a user when an operation fails.
    ///
    /// This is the single presentation policy for every API call: callers
    /// never format errors themselves.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(errors) => {
                let map = errors.field_errors();
                let mut fields: Vec<&str> = map.keys().map(|k| k.as_ref()).collect();
                fields.sort_unstable();
                format!("Please check the following fields: {}", fields.join(", "))
            }
            Error::Api { status: 401, .. } | Error::Api { status: 403, .. } => {
                "You are not allowed to do this. Please sign in again.".to_string()
            }
            Error::Api { status: 404, .. } => "The requested item no longer exists.".to_string(),
            Error::Api { message, .. } if !message.is_empty() => message.clone(),
            Error::Api { status, .. } => format!("The server rejected the request ({}).", status),
            Error::Http(_) => "Could not reach the server. Please try again.".to_string(),
            Error::Json(_) => "The server sent an unexpected response.".to_string(),
            Error::Auth(msg) | Error::Upload(msg) | Error::General(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}
