//! Limits and constraints for document processing
//!
//! This module defines limits that keep a hostile or broken document from
//! exhausting memory or the stack while it is parsed.

use crate::error::{Error, Result};

/// Resource limits applied while loading and parsing documents
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum element nesting depth
    pub max_xml_depth: usize,

    /// Maximum document size in bytes
    pub max_xml_size: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_xml_depth: 1000,
            max_xml_size: 100 * 1024 * 1024, // 100 MB
            max_attributes: 1000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_xml_depth: 100,
            max_xml_size: 10 * 1024 * 1024, // 10 MB
            max_attributes: 100,
        }
    }

    /// Check if XML depth is within limits
    pub fn check_xml_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_xml_depth {
            Err(Error::LimitExceeded(format!(
                "XML depth {} exceeds maximum {}",
                depth, self.max_xml_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if XML size is within limits
    pub fn check_xml_size(&self, size: usize) -> Result<()> {
        if size > self.max_xml_size {
            Err(Error::LimitExceeded(format!(
                "XML size {} bytes exceeds maximum {} bytes",
                size, self.max_xml_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the attribute count of one element is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            Err(Error::LimitExceeded(format!(
                "Attribute count {} exceeds maximum {}",
                count, self.max_attributes
            )))
        } else {
            Ok(())
        }
    }
}
