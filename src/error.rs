// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for the mustekala watcher
//!
//! Observation callbacks never propagate errors to the host; everything
//! here surfaces only through library APIs the caller invokes directly
//! (fetching, storage, the message boundary).

use thiserror::Error;

/// Result type alias for mustekala operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the mustekala watcher
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Manifest fetch failed with context
    #[error("Fetch failed for {url}: {reason}")]
    Fetch {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    /// Bundle storage error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Malformed message at the host boundary
    #[error("Invalid message: {0}")]
    Message(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a fetch error without a status code
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Fetch {
            url: url.into(),
            status: None,
            reason: reason.into(),
        }
    }

    /// Create a fetch error for a non-success status
    pub fn fetch_status(url: impl Into<String>, status: u16) -> Self {
        Error::Fetch {
            url: url.into(),
            status: Some(status),
            reason: format!("unexpected status {}", status),
        }
    }

    /// Create a storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Error::Storage(msg.into())
    }

    /// Create a message-boundary error
    pub fn message<S: Into<String>>(msg: S) -> Self {
        Error::Message(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a network error
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Fetch { .. })
    }

    /// Get HTTP status code if available
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Fetch { status, .. } => *status,
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get URL if available
    pub fn url(&self) -> Option<&str> {
        match self {
            Error::Fetch { url, .. } => Some(url),
            _ => None,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error() {
        let err = Error::fetch_status("https://cdn.example.com/stream.mpd", 403);

        assert!(err.is_network());
        assert_eq!(err.status_code(), Some(403));
        assert_eq!(err.url(), Some("https://cdn.example.com/stream.mpd"));
    }

    #[test]
    fn test_message_error_display() {
        let err = Error::message("Unknown action");
        assert_eq!(err.to_string(), "Invalid message: Unknown action");
    }
}
