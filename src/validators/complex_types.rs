//! XSD Complex Types
//!
//! A complex type carries attributes and one of three content kinds: empty,
//! simple (text of a simple type), or element content described by a model
//! group. Types derived from a named complex base keep their own part only;
//! [`XsdSchema::effective_content`](super::schemas::XsdSchema::effective_content)
//! combines it with the base when a document is validated.

use std::sync::Arc;

use super::attributes::XsdAttribute;
use super::groups::XsdGroup;
use super::simple_types::TypeRef;
use crate::namespaces::QName;

/// Content of a complex type
#[derive(Debug, Clone)]
pub enum ComplexContent {
    /// No children, no text
    Empty,
    /// Text only, of the given simple type
    Simple(TypeRef),
    /// Child elements matching a model group
    Elements(Arc<XsdGroup>),
}

/// How a complex type relates to its named base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivationMethod {
    /// Base content followed by this type's content
    Extension,
    /// This type's content replaces the base content
    Restriction,
}

/// A complex type definition
#[derive(Debug, Clone)]
pub struct XsdComplexType {
    /// Type name, None for anonymous types
    pub name: Option<QName>,
    /// Content declared by this type
    pub content: ComplexContent,
    /// Whether text may appear between child elements
    pub mixed: bool,
    /// Attributes declared by this type
    pub attributes: Vec<XsdAttribute>,
    /// Whether undeclared attributes are accepted (`xs:anyAttribute`)
    pub any_attribute: bool,
    /// Named complex base type (`xs:complexContent` derivation)
    pub base: Option<(QName, DerivationMethod)>,
}

impl XsdComplexType {
    /// Create a type with the given content and no attributes
    pub fn new(name: Option<QName>, content: ComplexContent) -> Self {
        Self {
            name,
            content,
            mixed: false,
            attributes: Vec::new(),
            any_attribute: false,
            base: None,
        }
    }

    /// Find a declared attribute by name
    pub fn attribute(&self, name: &QName) -> Option<&XsdAttribute> {
        self.attributes.iter().find(|a| &a.name == name)
    }
}
