//! XML Schema validators
//!
//! This module contains a compact XSD 1.0 validator: the schema component
//! model, the schema document parser and the instance document walker.

// Type system
pub mod builtins;
pub mod facets;
pub mod simple_types;

// Declarations and content models
pub mod attributes;
pub mod complex_types;
pub mod elements;
pub mod groups;
pub mod particles;

// Schema and validation
pub mod document_validation;
pub mod exceptions;
pub mod parsing;
pub mod schemas;
pub mod validation;

pub use exceptions::{Severity, ValidationEvent};
pub use schemas::{GlobalType, XsdSchema};
pub use validation::{SeverityPolicy, ValidationContext, ValidationReport, NO_ERRORS_MESSAGE};
