//! XSD Model Groups
//!
//! A model group (`xs:sequence`, `xs:choice`, `xs:all`) holds the particles
//! of an element-only content model.

use std::sync::Arc;

use super::elements::XsdElement;
use super::particles::Occurs;
use crate::namespaces::QName;

/// Compositor of a model group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Particles in order
    Sequence,
    /// Exactly one of the particles
    Choice,
    /// Particles in any order, each at most once
    All,
}

impl ModelType {
    /// Map the XSD element local name to a compositor
    pub fn from_local_name(name: &str) -> Option<Self> {
        match name {
            "sequence" => Some(ModelType::Sequence),
            "choice" => Some(ModelType::Choice),
            "all" => Some(ModelType::All),
            _ => None,
        }
    }
}

/// One particle of a model group
#[derive(Debug, Clone)]
pub enum GroupParticle {
    /// Local element declaration
    Element {
        /// The declaration
        decl: Arc<XsdElement>,
        /// Occurrence bounds
        occurs: Occurs,
    },
    /// Reference to a global element
    ElementRef {
        /// Referenced element name
        name: QName,
        /// Occurrence bounds
        occurs: Occurs,
    },
    /// Nested model group
    Group(Arc<XsdGroup>),
    /// Reference to a named `xs:group`
    GroupRef {
        /// Referenced group name
        name: QName,
        /// Occurrence bounds
        occurs: Occurs,
    },
    /// `xs:any` wildcard; matched elements are not validated further
    Any {
        /// Occurrence bounds
        occurs: Occurs,
    },
}

impl GroupParticle {
    /// Occurrence bounds of this particle
    pub fn occurs(&self) -> Occurs {
        match self {
            GroupParticle::Element { occurs, .. }
            | GroupParticle::ElementRef { occurs, .. }
            | GroupParticle::GroupRef { occurs, .. }
            | GroupParticle::Any { occurs } => *occurs,
            GroupParticle::Group(group) => group.occurs,
        }
    }
}

/// A model group
#[derive(Debug, Clone)]
pub struct XsdGroup {
    /// Compositor
    pub model: ModelType,
    /// Particles in schema order
    pub particles: Vec<GroupParticle>,
    /// Occurrence bounds of the group itself
    pub occurs: Occurs,
}

impl XsdGroup {
    /// Create an empty group occurring once
    pub fn new(model: ModelType) -> Self {
        Self {
            model,
            particles: Vec::new(),
            occurs: Occurs::once(),
        }
    }

    /// Check if the group has no particles
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
