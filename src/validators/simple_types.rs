//! XSD Simple Type Validators
//!
//! A simple type is a built-in type, or a restriction, list or union built
//! on top of other simple types. Named bases are resolved through the
//! schema at validation time, so declaration order in the schema does not
//! matter.

use std::fmt;
use std::sync::Arc;

use super::builtins::BuiltinType;
use super::complex_types::{ComplexContent, XsdComplexType};
use super::facets::{Facets, ValueKind, WhiteSpace};
use super::schemas::{GlobalType, XsdSchema};
use crate::namespaces::QName;

/// Derivation chains longer than this are treated as circular
const MAX_DERIVATION_DEPTH: usize = 64;

/// Reference from a declaration to its type
#[derive(Debug, Clone)]
pub enum TypeRef {
    /// A built-in type
    Builtin(BuiltinType),
    /// A global type, looked up by name
    Named(QName),
    /// An anonymous simple type
    Simple(Arc<XsdSimpleType>),
    /// An anonymous complex type
    Complex(Arc<XsdComplexType>),
}

impl TypeRef {
    /// The type every untyped element gets
    pub fn any_type() -> Self {
        TypeRef::Builtin(BuiltinType::AnySimpleType)
    }
}

/// Name used in messages
impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Builtin(b) => write!(f, "{}", b),
            TypeRef::Named(q) => write!(f, "{}", q.local_name),
            TypeRef::Simple(st) => match &st.name {
                Some(name) => write!(f, "{}", name.local_name),
                None => write!(f, "{}", st.base),
            },
            TypeRef::Complex(_) => write!(f, "anonymous complex type"),
        }
    }
}

/// Variety of a simple type
#[derive(Debug, Clone)]
pub enum SimpleVariety {
    /// Restriction of `base`
    Atomic,
    /// Whitespace-separated list of `item` values
    List(TypeRef),
    /// Value valid for at least one member type
    Union(Vec<TypeRef>),
}

/// A user-defined simple type
#[derive(Debug, Clone)]
pub struct XsdSimpleType {
    /// Type name, None for anonymous types
    pub name: Option<QName>,
    /// Base type of a restriction
    pub base: TypeRef,
    /// Variety
    pub variety: SimpleVariety,
    /// Facets added by this derivation step
    pub facets: Facets,
}

impl XsdSimpleType {
    /// Create a restriction of `base` without facets
    pub fn restriction(name: Option<QName>, base: TypeRef) -> Self {
        Self {
            name,
            base,
            variety: SimpleVariety::Atomic,
            facets: Facets::default(),
        }
    }

    fn validate(&self, schema: &XsdSchema, raw: &str, depth: usize) -> std::result::Result<(), String> {
        let kind = match &self.variety {
            SimpleVariety::Atomic => {
                validate_simple_value_at(schema, &self.base, raw, depth + 1)?;
                if primitive_of(schema, &self.base, depth + 1).is_some_and(|b| b.is_numeric()) {
                    ValueKind::Numeric
                } else {
                    ValueKind::Text
                }
            }
            SimpleVariety::List(item) => {
                for value in raw.split_whitespace() {
                    validate_simple_value_at(schema, item, value, depth + 1)?;
                }
                ValueKind::List
            }
            SimpleVariety::Union(members) => {
                let matched = members
                    .iter()
                    .any(|m| validate_simple_value_at(schema, m, raw, depth + 1).is_ok());
                if !matched {
                    return Err(format!(
                        "The value '{}' is not valid for any member type of the union.",
                        raw.trim()
                    ));
                }
                ValueKind::Text
            }
        };

        let normalized = simple_white_space(schema, self, depth).normalize(raw);
        self.facets.check(&normalized, kind)
    }
}

/// Validate a raw (unnormalized) value against a simple type, or against
/// the simple content of a complex type
pub fn validate_simple_value(
    schema: &XsdSchema,
    type_ref: &TypeRef,
    raw: &str,
) -> std::result::Result<(), String> {
    validate_simple_value_at(schema, type_ref, raw, 0)
}

fn validate_simple_value_at(
    schema: &XsdSchema,
    type_ref: &TypeRef,
    raw: &str,
    depth: usize,
) -> std::result::Result<(), String> {
    if depth > MAX_DERIVATION_DEPTH {
        return Err(format!("Type derivation of '{}' is circular.", type_ref));
    }

    match type_ref {
        TypeRef::Builtin(b) => b.validate(&b.white_space().normalize(raw)),
        TypeRef::Simple(st) => st.validate(schema, raw, depth),
        TypeRef::Named(qname) => match schema.lookup_type(qname) {
            Some(GlobalType::Simple(st)) => st.validate(schema, raw, depth),
            Some(GlobalType::Complex(ct)) => validate_complex_simple_content(schema, ct, raw, depth),
            None => Err(format!("Type '{}' is not declared.", qname.local_name)),
        },
        TypeRef::Complex(ct) => validate_complex_simple_content(schema, ct, raw, depth),
    }
}

fn validate_complex_simple_content(
    schema: &XsdSchema,
    ct: &XsdComplexType,
    raw: &str,
    depth: usize,
) -> std::result::Result<(), String> {
    match &ct.content {
        ComplexContent::Simple(base) => validate_simple_value_at(schema, base, raw, depth + 1),
        _ => Err("A complex type with element content cannot hold a simple value.".to_string()),
    }
}

/// The whiteSpace rule that applies to values of a type
pub fn white_space_of(schema: &XsdSchema, type_ref: &TypeRef, depth: usize) -> WhiteSpace {
    if depth > MAX_DERIVATION_DEPTH {
        return WhiteSpace::Preserve;
    }
    match type_ref {
        TypeRef::Builtin(b) => b.white_space(),
        TypeRef::Simple(st) => simple_white_space(schema, st, depth),
        TypeRef::Named(qname) => match schema.lookup_type(qname) {
            Some(GlobalType::Simple(st)) => simple_white_space(schema, st, depth),
            Some(GlobalType::Complex(ct)) => match &ct.content {
                ComplexContent::Simple(base) => white_space_of(schema, base, depth + 1),
                _ => WhiteSpace::Preserve,
            },
            None => WhiteSpace::Preserve,
        },
        TypeRef::Complex(ct) => match &ct.content {
            ComplexContent::Simple(base) => white_space_of(schema, base, depth + 1),
            _ => WhiteSpace::Preserve,
        },
    }
}

fn simple_white_space(schema: &XsdSchema, st: &XsdSimpleType, depth: usize) -> WhiteSpace {
    if let Some(ws) = st.facets.white_space {
        return ws;
    }
    match &st.variety {
        SimpleVariety::Atomic => white_space_of(schema, &st.base, depth + 1),
        SimpleVariety::List(_) => WhiteSpace::Collapse,
        SimpleVariety::Union(_) => WhiteSpace::Preserve,
    }
}

/// The built-in type at the bottom of a restriction chain
pub fn primitive_of(schema: &XsdSchema, type_ref: &TypeRef, depth: usize) -> Option<BuiltinType> {
    if depth > MAX_DERIVATION_DEPTH {
        return None;
    }
    match type_ref {
        TypeRef::Builtin(b) => Some(*b),
        TypeRef::Simple(st) => match st.variety {
            SimpleVariety::Atomic => primitive_of(schema, &st.base, depth + 1),
            _ => None,
        },
        TypeRef::Named(qname) => match schema.lookup_type(qname)? {
            GlobalType::Simple(st) => match st.variety {
                SimpleVariety::Atomic => primitive_of(schema, &st.base, depth + 1),
                _ => None,
            },
            GlobalType::Complex(_) => None,
        },
        TypeRef::Complex(_) => None,
    }
}

/// Normalize a value the way its type would before comparing it
pub fn normalize_value(schema: &XsdSchema, type_ref: &TypeRef, raw: &str) -> String {
    white_space_of(schema, type_ref, 0).normalize(raw)
}
