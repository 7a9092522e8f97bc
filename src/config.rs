//! Run configuration
//!
//! Where the documents come from and how they are validated. Everything
//! here is passed explicitly to the operations; nothing is process-wide.

use crate::converters::ConverterConfig;
use crate::limits::Limits;
use crate::loaders::Loader;
use crate::validators::SeverityPolicy;

/// Default location of the schema-valid hotels document
pub const DEFAULT_XML_URL: &str = "https://YOUR_USER.github.io/path/Hotels.xml";

/// Default location of the hotels document that violates the schema
pub const DEFAULT_XML_ERRORS_URL: &str = "https://YOUR_USER.github.io/path/HotelsErrors.xml";

/// Default location of the hotels schema
pub const DEFAULT_XSD_URL: &str = "https://YOUR_USER.github.io/path/Hotels.xsd";

/// The three inputs of a run, each a URL, a file path or inline XML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    /// Document expected to be valid
    pub xml: String,
    /// Document expected to have errors
    pub xml_errors: String,
    /// Schema both documents are checked against
    pub xsd: String,
}

impl Default for Sources {
    fn default() -> Self {
        Self {
            xml: DEFAULT_XML_URL.to_string(),
            xml_errors: DEFAULT_XML_ERRORS_URL.to_string(),
            xsd: DEFAULT_XSD_URL.to_string(),
        }
    }
}

impl Sources {
    /// Create sources pointing at the default locations
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the valid document location
    pub fn with_xml(mut self, xml: impl Into<String>) -> Self {
        self.xml = xml.into();
        self
    }

    /// Set the invalid document location
    pub fn with_xml_errors(mut self, xml_errors: impl Into<String>) -> Self {
        self.xml_errors = xml_errors.into();
        self
    }

    /// Set the schema location
    pub fn with_xsd(mut self, xsd: impl Into<String>) -> Self {
        self.xsd = xsd.into();
        self
    }
}

/// Options shared by validation and conversion
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Which severities are reported
    pub severity: SeverityPolicy,
    /// Limits applied while loading and parsing
    pub limits: Limits,
    /// Whether documents may be fetched over the network
    pub allow_remote: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            severity: SeverityPolicy::default(),
            limits: Limits::default(),
            allow_remote: true,
        }
    }
}

impl ValidationOptions {
    /// Create options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the severity policy
    pub fn with_severity(mut self, severity: SeverityPolicy) -> Self {
        self.severity = severity;
        self
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set whether remote documents are allowed
    pub fn with_allow_remote(mut self, allow: bool) -> Self {
        self.allow_remote = allow;
        self
    }

    /// Loader honouring these options
    pub fn loader(&self) -> Loader {
        Loader::new()
            .with_limits(self.limits.clone())
            .with_allow_remote(self.allow_remote)
    }

    /// Converter configuration sharing these limits
    pub fn converter_config(&self) -> ConverterConfig {
        ConverterConfig::new()
            .with_limits(self.limits.clone())
            .with_allow_remote(self.allow_remote)
    }
}
