//! Top-level operations
//!
//! [`verification`] and [`xml_to_json`] never fail: any error is turned into
//! its message and returned in place of the result. The `try_` variants and
//! [`Validator`] keep the error for callers that need to tell the two apart.

use tracing::{info, warn};

use crate::config::{Sources, ValidationOptions};
use crate::converters::{ConverterConfig, HotelConverter};
use crate::documents::Document;
use crate::error::Result;
use crate::locations::Location;
use crate::validators::{ValidationReport, XsdSchema};

/// Validates documents against a schema
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidationOptions,
}

impl Validator {
    /// Create a validator with the given options
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    /// Get the options
    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Load the schema and the document, then validate
    pub fn validate(&self, xml: &Location, xsd: &Location) -> Result<ValidationReport> {
        let loader = self.options.loader();
        let schema = XsdSchema::load(&loader, xsd)?;
        let text = loader.load(xml)?;
        let doc = Document::parse(&text, loader.limits())?;

        let report = schema.validate(&doc, self.options.severity);
        info!(
            source = %xml,
            events = report.events.len(),
            errors = report.error_count(),
            "document validated"
        );
        Ok(report)
    }
}

/// Validate a document against a schema with default options
pub fn verification(xml: &str, xsd: &str) -> String {
    verification_with(xml, xsd, &ValidationOptions::default())
}

/// Validate a document against a schema and render the report as text
pub fn verification_with(xml: &str, xsd: &str, options: &ValidationOptions) -> String {
    match try_verification(xml, xsd, options) {
        Ok(report) => report.to_string(),
        Err(e) => {
            warn!(error = %e, "verification failed");
            e.to_string()
        }
    }
}

/// Validate a document against a schema
pub fn try_verification(xml: &str, xsd: &str, options: &ValidationOptions) -> Result<ValidationReport> {
    let xml: Location = xml.parse()?;
    let xsd: Location = xsd.parse()?;
    Validator::new(options.clone()).validate(&xml, &xsd)
}

/// Convert a hotels document to JSON with default settings
pub fn xml_to_json(xml: &str) -> String {
    xml_to_json_with(xml, &ConverterConfig::default())
}

/// Convert a hotels document to JSON and return the text or the error message
pub fn xml_to_json_with(xml: &str, config: &ConverterConfig) -> String {
    match try_xml_to_json(xml, config) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "conversion failed");
            e.to_string()
        }
    }
}

/// Convert a hotels document to JSON
pub fn try_xml_to_json(xml: &str, config: &ConverterConfig) -> Result<String> {
    let location: Location = xml.parse()?;
    HotelConverter::with_config(config.clone()).convert(&location)
}

/// Validate both documents and convert the valid one.
/// Returns the three results in output order.
pub fn run(sources: &Sources, options: &ValidationOptions) -> Vec<String> {
    vec![
        verification_with(&sources.xml, &sources.xsd, options),
        verification_with(&sources.xml_errors, &sources.xsd, options),
        xml_to_json_with(&sources.xml, &options.converter_config()),
    ]
}
