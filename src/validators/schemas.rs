//! XML Schema
//!
//! [`XsdSchema`] holds the global components of one schema document and is
//! the entry point for validating instance documents against it.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use super::attributes::XsdAttribute;
use super::complex_types::{ComplexContent, DerivationMethod, XsdComplexType};
use super::document_validation::validate_document;
use super::elements::XsdElement;
use super::groups::{GroupParticle, ModelType, XsdGroup};
use super::parsing::parse_schema;
use super::simple_types::XsdSimpleType;
use super::validation::{SeverityPolicy, ValidationReport};

use crate::documents::Document;
use crate::error::{ParseError, Result};
use crate::loaders::Loader;
use crate::locations::Location;
use crate::namespaces::QName;

/// Base type chains longer than this are treated as circular
const MAX_BASE_DEPTH: usize = 64;

/// Form default for elements and attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormDefault {
    /// Unqualified (default)
    #[default]
    Unqualified,
    /// Qualified
    Qualified,
}

impl FormDefault {
    /// Parse from string value
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "qualified" => Some(Self::Qualified),
            "unqualified" => Some(Self::Unqualified),
            _ => None,
        }
    }

    /// Check if qualified
    pub fn is_qualified(&self) -> bool {
        matches!(self, Self::Qualified)
    }
}

impl fmt::Display for FormDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Qualified => write!(f, "qualified"),
            Self::Unqualified => write!(f, "unqualified"),
        }
    }
}

/// A named global type
#[derive(Debug, Clone)]
pub enum GlobalType {
    /// Global simple type
    Simple(Arc<XsdSimpleType>),
    /// Global complex type
    Complex(Arc<XsdComplexType>),
}

/// A parsed XML Schema
#[derive(Debug, Clone, Default)]
pub struct XsdSchema {
    /// Target namespace
    pub target_namespace: Option<String>,
    /// Form of local element declarations
    pub element_form_default: FormDefault,
    /// Form of local attribute declarations
    pub attribute_form_default: FormDefault,
    elements: IndexMap<QName, Arc<XsdElement>>,
    types: IndexMap<QName, GlobalType>,
    groups: IndexMap<QName, Arc<XsdGroup>>,
    attributes: IndexMap<QName, Arc<XsdAttribute>>,
}

impl XsdSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a schema from its source text
    pub fn from_string(xsd: &str) -> Result<Self> {
        let doc = Document::from_string(xsd)?;
        Self::from_document(&doc)
    }

    /// Build a schema from an already parsed schema document
    pub fn from_document(doc: &Document) -> Result<Self> {
        parse_schema(doc)
    }

    /// Fetch and parse a schema
    pub fn load(loader: &Loader, location: &Location) -> Result<Self> {
        let text = loader.load(location)?;
        let doc = Document::parse(&text, loader.limits())?;
        let schema = Self::from_document(&doc)?;
        info!(
            source = %location,
            elements = schema.element_count(),
            types = schema.type_count(),
            "schema loaded"
        );
        Ok(schema)
    }

    pub(crate) fn add_element(&mut self, element: XsdElement) -> Result<()> {
        if self.elements.contains_key(&element.name) {
            return Err(duplicate("element", &element.name));
        }
        self.elements.insert(element.name.clone(), Arc::new(element));
        Ok(())
    }

    pub(crate) fn add_type(&mut self, name: QName, global: GlobalType) -> Result<()> {
        if self.types.contains_key(&name) {
            return Err(duplicate("type", &name));
        }
        self.types.insert(name, global);
        Ok(())
    }

    pub(crate) fn add_group(&mut self, name: QName, group: XsdGroup) -> Result<()> {
        if self.groups.contains_key(&name) {
            return Err(duplicate("group", &name));
        }
        self.groups.insert(name, Arc::new(group));
        Ok(())
    }

    pub(crate) fn add_attribute(&mut self, attribute: XsdAttribute) -> Result<()> {
        if self.attributes.contains_key(&attribute.name) {
            return Err(duplicate("attribute", &attribute.name));
        }
        self.attributes.insert(attribute.name.clone(), Arc::new(attribute));
        Ok(())
    }

    /// Look up a global element declaration
    pub fn lookup_element(&self, qname: &QName) -> Option<&Arc<XsdElement>> {
        self.elements.get(qname)
    }

    /// Look up a global type definition
    pub fn lookup_type(&self, qname: &QName) -> Option<&GlobalType> {
        self.types.get(qname)
    }

    /// Look up a named model group
    pub fn lookup_group(&self, qname: &QName) -> Option<&Arc<XsdGroup>> {
        self.groups.get(qname)
    }

    /// Look up a global attribute declaration
    pub fn lookup_attribute(&self, qname: &QName) -> Option<&Arc<XsdAttribute>> {
        self.attributes.get(qname)
    }

    /// Number of global elements
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of global types
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Global elements in declaration order
    pub fn elements(&self) -> impl Iterator<Item = (&QName, &Arc<XsdElement>)> {
        self.elements.iter()
    }

    /// Global types in declaration order
    pub fn types(&self) -> impl Iterator<Item = (&QName, &GlobalType)> {
        self.types.iter()
    }

    /// Named groups in declaration order
    pub fn groups(&self) -> impl Iterator<Item = (&QName, &Arc<XsdGroup>)> {
        self.groups.iter()
    }

    /// Check whether the schema describes elements of this namespace
    pub fn covers_namespace(&self, namespace: Option<&str>) -> bool {
        self.target_namespace.as_deref() == namespace
    }

    /// Content model of a complex type with its extension chain applied
    pub fn effective_content(&self, ct: &XsdComplexType) -> ComplexContent {
        self.effective_content_at(ct, 0)
    }

    fn effective_content_at(&self, ct: &XsdComplexType, depth: usize) -> ComplexContent {
        let base = match &ct.base {
            Some((name, DerivationMethod::Extension)) if depth < MAX_BASE_DEPTH => {
                match self.lookup_type(name) {
                    Some(GlobalType::Complex(base)) => base,
                    _ => return ct.content.clone(),
                }
            }
            _ => return ct.content.clone(),
        };

        match (self.effective_content_at(base, depth + 1), &ct.content) {
            (base_content, ComplexContent::Empty) => base_content,
            (ComplexContent::Elements(inherited), ComplexContent::Elements(own)) => {
                let mut group = XsdGroup::new(ModelType::Sequence);
                group.particles.push(GroupParticle::Group(inherited));
                group.particles.push(GroupParticle::Group(own.clone()));
                ComplexContent::Elements(Arc::new(group))
            }
            (_, own) => own.clone(),
        }
    }

    /// Attribute uses of a complex type, inherited ones first.
    /// A redeclared attribute replaces the inherited one.
    pub fn effective_attributes(&self, ct: &XsdComplexType) -> Vec<XsdAttribute> {
        self.effective_attributes_at(ct, 0)
    }

    fn effective_attributes_at(&self, ct: &XsdComplexType, depth: usize) -> Vec<XsdAttribute> {
        let mut attributes = match &ct.base {
            Some((name, _)) if depth < MAX_BASE_DEPTH => match self.lookup_type(name) {
                Some(GlobalType::Complex(base)) => self.effective_attributes_at(base, depth + 1),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };

        for attr in &ct.attributes {
            match attributes.iter_mut().find(|a| a.name == attr.name) {
                Some(existing) => *existing = attr.clone(),
                None => attributes.push(attr.clone()),
            }
        }
        attributes
    }

    /// Whether a complex type accepts undeclared attributes
    pub fn accepts_any_attribute(&self, ct: &XsdComplexType) -> bool {
        let mut current = ct;
        for _ in 0..MAX_BASE_DEPTH {
            if current.any_attribute {
                return true;
            }
            match &current.base {
                Some((name, DerivationMethod::Extension)) => match self.lookup_type(name) {
                    Some(GlobalType::Complex(base)) => current = base,
                    _ => return false,
                },
                _ => return false,
            }
        }
        false
    }

    /// Validate a document, collecting every violation the policy keeps
    pub fn validate(&self, doc: &Document, policy: SeverityPolicy) -> ValidationReport {
        let report = validate_document(self, doc, policy);
        debug!(events = report.events.len(), "document validated");
        report
    }

    /// Check whether a document has no errors
    pub fn is_valid(&self, doc: &Document) -> bool {
        self.validate(doc, SeverityPolicy::ErrorsOnly).is_valid()
    }
}

fn duplicate(kind: &str, name: &QName) -> crate::error::Error {
    ParseError::new(format!(
        "The global {} '{}' has already been declared.",
        kind, name.local_name
    ))
    .into()
}
