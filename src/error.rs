//! Error types for hotel-xml
//!
//! This module defines all error types used throughout the library.
//! The two string-returning operations fold every variant into its display
//! text, so the messages are written to be read by a person.

use std::fmt;
use thiserror::Error;

/// Result type alias using the crate Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for hotel-xml operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema document could not be turned into a usable schema
    #[error("schema error: {0}")]
    Schema(#[from] ParseError),

    /// Document does not have the structure the converter expects
    #[error("{0}")]
    Data(String),

    /// Value error (invalid value for a type or option)
    #[error("value error: {0}")]
    Value(String),

    /// Resource loading error
    #[error("resource error: {0}")]
    Resource(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML error: {0}")]
    Xml(String),

    /// JSON serialization or parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

/// XML Schema parsing error
#[derive(Debug, Clone)]
pub struct ParseError {
    /// Error message
    pub message: String,
    /// Location in the schema file
    pub location: Option<String>,
    /// Schema component that caused the error
    pub component: Option<String>,
}

impl ParseError {
    /// Create a new parse error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            location: None,
            component: None,
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the offending component
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref component) = self.component {
            write!(f, " [{}]", component)?;
        }

        if let Some(ref loc) = self.location {
            write!(f, " ({})", loc)?;
        }

        Ok(())
    }
}

impl std::error::Error for ParseError {}
