//! XSD Element Declarations

use super::simple_types::TypeRef;
use crate::namespaces::QName;

/// An element declaration, global or local
#[derive(Debug, Clone)]
pub struct XsdElement {
    /// Element name, qualified per the schema's form rules
    pub name: QName,
    /// Type of the element's content
    pub type_ref: TypeRef,
    /// Whether `xsi:nil="true"` is allowed
    pub nillable: bool,
    /// Fixed value constraint
    pub fixed: Option<String>,
    /// Default value used when the element is empty
    pub default: Option<String>,
}

impl XsdElement {
    /// Create a declaration of the given type
    pub fn new(name: QName, type_ref: TypeRef) -> Self {
        Self {
            name,
            type_ref,
            nillable: false,
            fixed: None,
            default: None,
        }
    }

    /// Local name, as used in messages
    pub fn local_name(&self) -> &str {
        &self.name.local_name
    }
}
