//! Validation events
//!
//! A schema violation found while walking a document is not a Rust error:
//! it is recorded as a [`ValidationEvent`] and the walk continues.

use std::fmt;

use crate::documents::TextPosition;

/// Severity of a validation event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// The document may still be usable, but could not be fully checked
    Warning,
    /// The document violates the schema
    Error,
}

impl Severity {
    /// Label used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reported schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationEvent {
    /// Severity of the violation
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Where in the instance document it happened
    pub position: Option<TextPosition>,
}

impl ValidationEvent {
    /// Create an error event
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            position: None,
        }
    }

    /// Create a warning event
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            position: None,
        }
    }

    /// Set the position
    pub fn at(mut self, position: Option<TextPosition>) -> Self {
        self.position = position;
        self
    }
}

/// `Error: <message> (Line <n>, Position <n>)`, without the suffix when
/// no position is known
impl fmt::Display for ValidationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(pos) = self.position {
            write!(f, " (Line {}, Position {})", pos.line, pos.column)?;
        }
        Ok(())
    }
}
