//! XSD Attribute Declarations
//!
//! Attribute uses attached to complex types.

use super::simple_types::TypeRef;
use crate::error::{Error, Result};
use crate::namespaces::QName;

/// Usage requirement of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributeUse {
    /// May be present
    #[default]
    Optional,
    /// Must be present
    Required,
    /// Must not be present
    Prohibited,
}

impl AttributeUse {
    /// Parse the `use` attribute value
    pub fn from_name(s: &str) -> Result<Self> {
        match s {
            "optional" => Ok(AttributeUse::Optional),
            "required" => Ok(AttributeUse::Required),
            "prohibited" => Ok(AttributeUse::Prohibited),
            _ => Err(Error::Value(format!(
                "Invalid attribute use: '{}'. Must be 'optional', 'required', or 'prohibited'",
                s
            ))),
        }
    }
}

/// An attribute declaration as used by a complex type
#[derive(Debug, Clone)]
pub struct XsdAttribute {
    /// Attribute name
    pub name: QName,
    /// Simple type of the value
    pub type_ref: TypeRef,
    /// Usage requirement
    pub use_mode: AttributeUse,
    /// Fixed value constraint
    pub fixed: Option<String>,
    /// Default value
    pub default: Option<String>,
}

impl XsdAttribute {
    /// Create an optional attribute declaration
    pub fn new(name: QName, type_ref: TypeRef) -> Self {
        Self {
            name,
            type_ref,
            use_mode: AttributeUse::Optional,
            fixed: None,
            default: None,
        }
    }

    /// Check if the attribute must be present
    pub fn is_required(&self) -> bool {
        self.use_mode == AttributeUse::Required
    }

    /// Check if the attribute must be absent
    pub fn is_prohibited(&self) -> bool {
        self.use_mode == AttributeUse::Prohibited
    }
}
