//! Converter configuration

use crate::limits::Limits;
use crate::loaders::Loader;

/// Configuration for converters
#[derive(Debug, Clone)]
pub struct ConverterConfig {
    /// Spaces per indentation level of the JSON output
    indent: usize,
    /// Whether a `Rating` attribute stands in for a missing `Rating` child (off by default)
    rating_attribute: bool,
    /// Limits applied while loading and parsing the document
    limits: Limits,
    /// Whether documents may be fetched over the network
    allow_remote: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            rating_attribute: false,
            limits: Limits::default(),
            allow_remote: true,
        }
    }
}

impl ConverterConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get indentation width
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Check if the Rating attribute is used as a fallback
    pub fn rating_attribute(&self) -> bool {
        self.rating_attribute
    }

    /// Get the limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Set indentation width
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set whether the Rating attribute is used as a fallback
    pub fn with_rating_attribute(mut self, enabled: bool) -> Self {
        self.rating_attribute = enabled;
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

    /// Loader honouring this configuration
    pub fn loader(&self) -> Loader {
        Loader::new()
            .with_limits(self.limits.clone())
            .with_allow_remote(self.allow_remote)
    }
}
