//! Validation context and report
//!
//! The context collects events while a document is walked; the report is
//! what remains once the walk is over.

use std::fmt;

use super::exceptions::{Severity, ValidationEvent};
use crate::documents::TextPosition;

/// Text of a report with nothing in it
pub const NO_ERRORS_MESSAGE: &str = "No errors are found";

/// Which severities end up in a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeverityPolicy {
    /// Report warnings and errors
    #[default]
    All,
    /// Report errors only
    ErrorsOnly,
}

impl SeverityPolicy {
    /// Check whether events of this severity are reported
    pub fn includes(&self, severity: Severity) -> bool {
        match self {
            SeverityPolicy::All => true,
            SeverityPolicy::ErrorsOnly => severity == Severity::Error,
        }
    }
}

/// Validation context for handling the validation process
#[derive(Debug, Default)]
pub struct ValidationContext {
    /// Which events are kept
    pub policy: SeverityPolicy,
    /// Collected events, in document order
    pub events: Vec<ValidationEvent>,
}

impl ValidationContext {
    /// Create a new validation context
    pub fn new(policy: SeverityPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Record an event if the policy keeps it
    pub fn report(&mut self, event: ValidationEvent) {
        if self.policy.includes(event.severity) {
            self.events.push(event);
        }
    }

    /// Record an error at a position
    pub fn error(&mut self, message: impl Into<String>, position: Option<TextPosition>) {
        self.report(ValidationEvent::error(message).at(position));
    }

    /// Record a warning at a position
    pub fn warning(&mut self, message: impl Into<String>, position: Option<TextPosition>) {
        self.report(ValidationEvent::warning(message).at(position));
    }

    /// Finish the walk
    pub fn into_report(self) -> ValidationReport {
        ValidationReport {
            events: self.events,
        }
    }
}

/// Outcome of validating one document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Reported events, in document order
    pub events: Vec<ValidationEvent>,
}

impl ValidationReport {
    /// True when nothing was reported
    pub fn is_clean(&self) -> bool {
        self.events.is_empty()
    }

    /// True when no event is an error
    pub fn is_valid(&self) -> bool {
        !self.events.iter().any(|e| e.severity == Severity::Error)
    }

    /// Number of error events
    pub fn error_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| e.severity == Severity::Error)
            .count()
    }
}

/// One line per event, or [`NO_ERRORS_MESSAGE`]
impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.events.is_empty() {
            return f.write_str(NO_ERRORS_MESSAGE);
        }
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", event)?;
        }
        Ok(())
    }
}
