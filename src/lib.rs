//! # hotel-xml
//!
//! Validate hotel XML documents against an XSD schema and convert them to JSON.
//!
//! ## Features
//!
//! - XSD 1.0 validation (the subset record-shaped schemas use), reporting
//!   every violation with its line and position
//! - Mapping of `Hotels` documents onto a fixed JSON shape
//! - A JSON-to-XML round trip check of the converted output
//! - Documents and schemas from files, HTTP(S) URLs or inline text
//! - Protection against oversized or deeply nested documents
//!
//! ## Example
//!
//! ```rust,ignore
//! use hotel_xml::{verification, xml_to_json};
//!
//! // "No errors are found", or one line per violation
//! println!("{}", verification("Hotels.xml", "Hotels.xsd"));
//!
//! // The JSON text, or the message of whatever went wrong
//! println!("{}", xml_to_json("Hotels.xml"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Utilities
pub mod names;
pub mod namespaces;
pub mod locations;

// Resource loading
pub mod loaders;
pub mod documents;

// Validation and conversion
pub mod validators;
pub mod converters;

// Configuration and entry points
pub mod config;
pub mod operations;

// Re-exports for convenience
pub use config::{Sources, ValidationOptions};
pub use converters::{ConverterConfig, HotelConverter, Hotels};
pub use error::{Error, Result};
pub use locations::Location;
pub use operations::{
    run, try_verification, try_xml_to_json, verification, verification_with, xml_to_json,
    xml_to_json_with, Validator,
};
pub use validators::{SeverityPolicy, ValidationReport, XsdSchema, NO_ERRORS_MESSAGE};

/// Version of the hotel-xml library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
