//! XML namespace handling
//!
//! This module provides qualified names (QNames) and the in-scope prefix
//! mappings used to resolve them.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fmt;

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace (`xsi:nil`, `xsi:schemaLocation`, ...)
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// XML namespace, bound to the `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Check whether this name lives in the given namespace
    pub fn is_in(&self, namespace: &str) -> bool {
        self.namespace.as_deref() == Some(namespace)
    }
}

/// Clark notation, `{uri}local`
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Namespace context for resolving prefixes
///
/// A child element's context is its parent's context plus its own
/// declarations, so each element carries everything in scope.
#[derive(Debug, Clone, Default)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: HashMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace. An empty URI undeclares it.
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.default_namespace = if namespace.is_empty() {
            None
        } else {
            Some(namespace)
        };
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Resolve a prefixed element or type name to a QName.
    /// Unprefixed names take the default namespace.
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        if let Some((prefix, local)) = prefixed_name.split_once(':') {
            let namespace = self
                .get_namespace(prefix)
                .ok_or_else(|| Error::Namespace(format!("Unknown prefix: {}", prefix)))?;
            Ok(QName::namespaced(namespace, local))
        } else {
            Ok(QName::new(self.default_namespace.clone(), prefixed_name))
        }
    }

    /// Resolve a prefixed attribute name to a QName.
    /// Unprefixed attributes are in no namespace.
    pub fn resolve_attribute(&self, prefixed_name: &str) -> Result<QName> {
        if prefixed_name.contains(':') {
            self.resolve(prefixed_name)
        } else {
            Ok(QName::local(prefixed_name))
        }
    }
}
