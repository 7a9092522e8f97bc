//! XSD Document Parsing
//!
//! This module turns a parsed schema document into an [`XsdSchema`].
//! Global attributes are read first so that `ref` attributes can copy them;
//! everything else refers to other components by name and is checked once
//! the whole document has been read.

use std::sync::Arc;

use tracing::debug;

use super::attributes::{AttributeUse, XsdAttribute};
use super::builtins::BuiltinType;
use super::complex_types::{ComplexContent, DerivationMethod, XsdComplexType};
use super::elements::XsdElement;
use super::groups::{GroupParticle, ModelType, XsdGroup};
use super::particles::Occurs;
use super::schemas::{FormDefault, GlobalType, XsdSchema};
use super::simple_types::{SimpleVariety, TypeRef, XsdSimpleType};

use crate::documents::{Document, Element};
use crate::error::{ParseError, Result};
use crate::namespaces::{QName, XSD_NAMESPACE};

/// XSD element local names
mod xsd_elements {
    pub const SCHEMA: &str = "schema";
    pub const ELEMENT: &str = "element";
    pub const COMPLEX_TYPE: &str = "complexType";
    pub const SIMPLE_TYPE: &str = "simpleType";
    pub const ATTRIBUTE: &str = "attribute";
    pub const GROUP: &str = "group";
    pub const SEQUENCE: &str = "sequence";
    pub const CHOICE: &str = "choice";
    pub const ALL: &str = "all";
    pub const ANNOTATION: &str = "annotation";
    pub const RESTRICTION: &str = "restriction";
    pub const EXTENSION: &str = "extension";
    pub const LIST: &str = "list";
    pub const UNION: &str = "union";
    pub const COMPLEX_CONTENT: &str = "complexContent";
    pub const SIMPLE_CONTENT: &str = "simpleContent";
    pub const ANY: &str = "any";
    pub const ANY_ATTRIBUTE: &str = "anyAttribute";
}

/// XSD attribute names
mod xsd_attrs {
    pub const NAME: &str = "name";
    pub const TYPE: &str = "type";
    pub const REF: &str = "ref";
    pub const TARGET_NAMESPACE: &str = "targetNamespace";
    pub const ELEMENT_FORM_DEFAULT: &str = "elementFormDefault";
    pub const ATTRIBUTE_FORM_DEFAULT: &str = "attributeFormDefault";
    pub const FORM: &str = "form";
    pub const NILLABLE: &str = "nillable";
    pub const DEFAULT: &str = "default";
    pub const FIXED: &str = "fixed";
    pub const BASE: &str = "base";
    pub const VALUE: &str = "value";
    pub const MIXED: &str = "mixed";
    pub const ITEM_TYPE: &str = "itemType";
    pub const MEMBER_TYPES: &str = "memberTypes";
    pub const MIN_OCCURS: &str = "minOccurs";
    pub const MAX_OCCURS: &str = "maxOccurs";
    pub const USE: &str = "use";
}

use xsd_attrs as attrs;
use xsd_elements as tags;

/// Parse a schema document
pub fn parse_schema(doc: &Document) -> Result<XsdSchema> {
    let root = doc
        .root
        .as_ref()
        .ok_or_else(|| ParseError::new("Schema document has no root element"))?;

    if !(root.qname.is_in(XSD_NAMESPACE) && root.local_name() == tags::SCHEMA) {
        return Err(ParseError::new(format!(
            "The root element of a W3C XML Schema should be <schema> and its namespace should be '{}'.",
            XSD_NAMESPACE
        ))
        .with_component(root.prefixed_name.clone())
        .into());
    }

    let mut parser = SchemaParser::new(root)?;
    parser.parse_globals(root)?;
    let schema = parser.schema;
    check_references(&schema)?;

    debug!(
        target_namespace = schema.target_namespace.as_deref().unwrap_or(""),
        elements = schema.element_count(),
        types = schema.type_count(),
        "schema parsed"
    );
    Ok(schema)
}

struct SchemaParser {
    schema: XsdSchema,
}

impl SchemaParser {
    fn new(root: &Element) -> Result<Self> {
        let mut schema = XsdSchema::new();
        schema.target_namespace = root
            .get_attribute(attrs::TARGET_NAMESPACE)
            .filter(|ns| !ns.is_empty())
            .map(str::to_string);
        schema.element_form_default = form_attribute(root, attrs::ELEMENT_FORM_DEFAULT)?;
        schema.attribute_form_default = form_attribute(root, attrs::ATTRIBUTE_FORM_DEFAULT)?;
        Ok(Self { schema })
    }

    fn parse_globals(&mut self, root: &Element) -> Result<()> {
        // Attributes first: local `ref` attributes copy their declaration
        for child in xsd_children(root) {
            if child.local_name() == tags::ATTRIBUTE {
                let attribute = self.parse_attribute(child, true)?;
                self.schema.add_attribute(attribute)?;
            }
        }

        for child in xsd_children(root) {
            match child.local_name() {
                tags::ATTRIBUTE | tags::ANNOTATION => {}
                tags::ELEMENT => {
                    let element = self.parse_element(child, true)?;
                    self.schema.add_element(element)?;
                }
                tags::COMPLEX_TYPE => {
                    let name = self.global_name(child)?;
                    let ct = self.parse_complex_type(child, Some(name.clone()))?;
                    self.schema
                        .add_type(name, GlobalType::Complex(Arc::new(ct)))?;
                }
                tags::SIMPLE_TYPE => {
                    let name = self.global_name(child)?;
                    let st = self.parse_simple_type(child, Some(name.clone()))?;
                    self.schema.add_type(name, GlobalType::Simple(Arc::new(st)))?;
                }
                tags::GROUP => {
                    let name = self.global_name(child)?;
                    let model = xsd_children(child)
                        .find(|c| ModelType::from_local_name(c.local_name()).is_some())
                        .ok_or_else(|| {
                            unexpected(child, "a named group needs a sequence, choice or all")
                        })?;
                    let group = self.parse_group(model)?;
                    self.schema.add_group(name, group)?;
                }
                other => {
                    return Err(unexpected(
                        child,
                        &format!("'{}' is not supported at the top level of a schema", other),
                    ));
                }
            }
        }
        Ok(())
    }

    fn global_name(&self, elem: &Element) -> Result<QName> {
        let name = required_attribute(elem, attrs::NAME)?;
        Ok(QName::new(self.schema.target_namespace.clone(), name))
    }

    /// Name of a local declaration, qualified when its form says so
    fn local_name(&self, elem: &Element, name: &str, form_default: FormDefault) -> Result<QName> {
        let form = match elem.get_attribute(attrs::FORM) {
            Some(value) => FormDefault::from_name(value.trim())
                .ok_or_else(|| unexpected(elem, &format!("invalid form '{}'", value)))?,
            None => form_default,
        };
        if form.is_qualified() {
            Ok(QName::new(self.schema.target_namespace.clone(), name))
        } else {
            Ok(QName::local(name))
        }
    }

    fn parse_element(&self, elem: &Element, global: bool) -> Result<XsdElement> {
        let name = required_attribute(elem, attrs::NAME)?;
        let qname = if global {
            QName::new(self.schema.target_namespace.clone(), name)
        } else {
            self.local_name(elem, name, self.schema.element_form_default)?
        };

        let type_ref = match elem.get_attribute(attrs::TYPE) {
            Some(type_name) => resolve_type(elem, type_name)?,
            None => self.inline_type(elem)?.unwrap_or_else(TypeRef::any_type),
        };

        let mut decl = XsdElement::new(qname, type_ref);
        decl.nillable = boolean_attribute(elem, attrs::NILLABLE)?;
        decl.fixed = elem.get_attribute(attrs::FIXED).map(str::to_string);
        decl.default = elem.get_attribute(attrs::DEFAULT).map(str::to_string);
        Ok(decl)
    }

    /// Anonymous type defined inside a declaration
    fn inline_type(&self, elem: &Element) -> Result<Option<TypeRef>> {
        for child in xsd_children(elem) {
            match child.local_name() {
                tags::COMPLEX_TYPE => {
                    let ct = self.parse_complex_type(child, None)?;
                    return Ok(Some(TypeRef::Complex(Arc::new(ct))));
                }
                tags::SIMPLE_TYPE => {
                    let st = self.parse_simple_type(child, None)?;
                    return Ok(Some(TypeRef::Simple(Arc::new(st))));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn parse_group(&self, elem: &Element) -> Result<XsdGroup> {
        let model = ModelType::from_local_name(elem.local_name())
            .ok_or_else(|| unexpected(elem, "expected a sequence, choice or all"))?;
        let mut group = XsdGroup::new(model);
        group.occurs = occurs_of(elem)?;

        for child in xsd_children(elem) {
            let particle = match child.local_name() {
                tags::ANNOTATION => continue,
                tags::ELEMENT => match child.get_attribute(attrs::REF) {
                    Some(reference) => GroupParticle::ElementRef {
                        name: child.namespaces.resolve(reference.trim())?,
                        occurs: occurs_of(child)?,
                    },
                    None => GroupParticle::Element {
                        decl: Arc::new(self.parse_element(child, false)?),
                        occurs: occurs_of(child)?,
                    },
                },
                tags::SEQUENCE | tags::CHOICE | tags::ALL => {
                    if model == ModelType::All {
                        return Err(unexpected(child, "an 'all' group may only contain elements"));
                    }
                    GroupParticle::Group(Arc::new(self.parse_group(child)?))
                }
                tags::GROUP => GroupParticle::GroupRef {
                    name: child
                        .namespaces
                        .resolve(required_attribute(child, attrs::REF)?.trim())?,
                    occurs: occurs_of(child)?,
                },
                tags::ANY => GroupParticle::Any {
                    occurs: occurs_of(child)?,
                },
                other => {
                    return Err(unexpected(
                        child,
                        &format!("'{}' is not allowed in a model group", other),
                    ))
                }
            };

            if model == ModelType::All && particle.occurs().max.map_or(true, |max| max > 1) {
                return Err(unexpected(child, "maxOccurs of an 'all' particle must be 0 or 1"));
            }
            group.particles.push(particle);
        }
        Ok(group)
    }

    fn parse_complex_type(&self, elem: &Element, name: Option<QName>) -> Result<XsdComplexType> {
        let mut ct = XsdComplexType::new(name, ComplexContent::Empty);
        ct.mixed = boolean_attribute(elem, attrs::MIXED)?;

        for child in xsd_children(elem) {
            match child.local_name() {
                tags::ANNOTATION => {}
                tags::SEQUENCE | tags::CHOICE | tags::ALL => {
                    ct.content = ComplexContent::Elements(Arc::new(self.parse_group(child)?));
                }
                tags::GROUP => {
                    ct.content = ComplexContent::Elements(Arc::new(group_ref_wrapper(child)?));
                }
                tags::SIMPLE_CONTENT => self.parse_simple_content(child, &mut ct)?,
                tags::COMPLEX_CONTENT => self.parse_complex_content(child, &mut ct)?,
                tags::ATTRIBUTE | tags::ANY_ATTRIBUTE => self.parse_attribute_use(child, &mut ct)?,
                other => {
                    return Err(unexpected(
                        child,
                        &format!("'{}' is not allowed in a complex type", other),
                    ))
                }
            }
        }

        // Mixed content without a model accepts text only
        if ct.mixed && matches!(ct.content, ComplexContent::Empty) {
            ct.content = ComplexContent::Elements(Arc::new(XsdGroup::new(ModelType::Sequence)));
        }
        Ok(ct)
    }

    fn parse_attribute_use(&self, elem: &Element, ct: &mut XsdComplexType) -> Result<()> {
        if elem.local_name() == tags::ANY_ATTRIBUTE {
            ct.any_attribute = true;
        } else {
            let attribute = self.parse_attribute(elem, false)?;
            if ct.attribute(&attribute.name).is_some() {
                return Err(unexpected(
                    elem,
                    &format!("duplicate attribute '{}'", attribute.name.local_name),
                ));
            }
            ct.attributes.push(attribute);
        }
        Ok(())
    }

    fn parse_simple_content(&self, elem: &Element, ct: &mut XsdComplexType) -> Result<()> {
        let derivation = derivation_child(elem)?;
        let base = resolve_type(derivation, required_attribute(derivation, attrs::BASE)?)?;

        let method = if derivation.local_name() == tags::EXTENSION {
            ct.content = ComplexContent::Simple(base.clone());
            DerivationMethod::Extension
        } else {
            let mut st = XsdSimpleType::restriction(None, base.clone());
            self.parse_facets(derivation, &mut st)?;
            ct.content = ComplexContent::Simple(TypeRef::Simple(Arc::new(st)));
            DerivationMethod::Restriction
        };

        for child in xsd_children(derivation) {
            if matches!(child.local_name(), tags::ATTRIBUTE | tags::ANY_ATTRIBUTE) {
                self.parse_attribute_use(child, ct)?;
            }
        }

        if let TypeRef::Named(name) = base {
            ct.base = Some((name, method));
        }
        Ok(())
    }

    fn parse_complex_content(&self, elem: &Element, ct: &mut XsdComplexType) -> Result<()> {
        if boolean_attribute(elem, attrs::MIXED)? {
            ct.mixed = true;
        }

        let derivation = derivation_child(elem)?;
        let base = resolve_type(derivation, required_attribute(derivation, attrs::BASE)?)?;
        let method = if derivation.local_name() == tags::EXTENSION {
            DerivationMethod::Extension
        } else {
            DerivationMethod::Restriction
        };

        for child in xsd_children(derivation) {
            match child.local_name() {
                tags::ANNOTATION => {}
                tags::SEQUENCE | tags::CHOICE | tags::ALL => {
                    ct.content = ComplexContent::Elements(Arc::new(self.parse_group(child)?));
                }
                tags::GROUP => {
                    ct.content = ComplexContent::Elements(Arc::new(group_ref_wrapper(child)?));
                }
                tags::ATTRIBUTE | tags::ANY_ATTRIBUTE => self.parse_attribute_use(child, ct)?,
                other => {
                    return Err(unexpected(
                        child,
                        &format!("'{}' is not allowed in complex content", other),
                    ))
                }
            }
        }

        match base {
            TypeRef::Named(name) => ct.base = Some((name, method)),
            TypeRef::Builtin(BuiltinType::AnySimpleType) => {}
            other => {
                return Err(unexpected(
                    derivation,
                    &format!("'{}' cannot be the base of complex content", other),
                ))
            }
        }
        Ok(())
    }

    fn parse_attribute(&self, elem: &Element, global: bool) -> Result<XsdAttribute> {
        let mut attribute = match elem.get_attribute(attrs::REF) {
            Some(reference) if !global => {
                let name = elem.namespaces.resolve(reference.trim())?;
                let decl = self.schema.lookup_attribute(&name).ok_or_else(|| {
                    ParseError::new(format!(
                        "The '{}' attribute is not declared.",
                        name.local_name
                    ))
                })?;
                decl.as_ref().clone()
            }
            _ => {
                let name = required_attribute(elem, attrs::NAME)?;
                let qname = if global {
                    QName::new(self.schema.target_namespace.clone(), name)
                } else {
                    self.local_name(elem, name, self.schema.attribute_form_default)?
                };
                let type_ref = match elem.get_attribute(attrs::TYPE) {
                    Some(type_name) => resolve_type(elem, type_name)?,
                    None => match xsd_children(elem).find(|c| c.local_name() == tags::SIMPLE_TYPE) {
                        Some(st) => TypeRef::Simple(Arc::new(self.parse_simple_type(st, None)?)),
                        None => TypeRef::any_type(),
                    },
                };
                XsdAttribute::new(qname, type_ref)
            }
        };

        if let Some(use_mode) = elem.get_attribute(attrs::USE) {
            attribute.use_mode = AttributeUse::from_name(use_mode.trim())?;
        }
        if let Some(fixed) = elem.get_attribute(attrs::FIXED) {
            attribute.fixed = Some(fixed.to_string());
        }
        if let Some(default) = elem.get_attribute(attrs::DEFAULT) {
            attribute.default = Some(default.to_string());
        }
        Ok(attribute)
    }

    fn parse_simple_type(&self, elem: &Element, name: Option<QName>) -> Result<XsdSimpleType> {
        let variety = xsd_children(elem)
            .find(|c| c.local_name() != tags::ANNOTATION)
            .ok_or_else(|| unexpected(elem, "a simple type needs a restriction, list or union"))?;

        match variety.local_name() {
            tags::RESTRICTION => {
                let base = match variety.get_attribute(attrs::BASE) {
                    Some(base) => resolve_type(variety, base)?,
                    None => match xsd_children(variety).find(|c| c.local_name() == tags::SIMPLE_TYPE) {
                        Some(st) => TypeRef::Simple(Arc::new(self.parse_simple_type(st, None)?)),
                        None => return Err(unexpected(variety, "a restriction needs a base type")),
                    },
                };
                let mut st = XsdSimpleType::restriction(name, base);
                self.parse_facets(variety, &mut st)?;
                Ok(st)
            }
            tags::LIST => {
                let item = match variety.get_attribute(attrs::ITEM_TYPE) {
                    Some(item) => resolve_type(variety, item)?,
                    None => match xsd_children(variety).find(|c| c.local_name() == tags::SIMPLE_TYPE) {
                        Some(st) => TypeRef::Simple(Arc::new(self.parse_simple_type(st, None)?)),
                        None => return Err(unexpected(variety, "a list needs an item type")),
                    },
                };
                let mut st = XsdSimpleType::restriction(name, TypeRef::any_type());
                st.variety = SimpleVariety::List(item);
                Ok(st)
            }
            tags::UNION => {
                let mut members = Vec::new();
                if let Some(member_types) = variety.get_attribute(attrs::MEMBER_TYPES) {
                    for member in member_types.split_whitespace() {
                        members.push(resolve_type(variety, member)?);
                    }
                }
                for child in xsd_children(variety) {
                    if child.local_name() == tags::SIMPLE_TYPE {
                        members.push(TypeRef::Simple(Arc::new(self.parse_simple_type(child, None)?)));
                    }
                }
                if members.is_empty() {
                    return Err(unexpected(variety, "a union needs at least one member type"));
                }
                let mut st = XsdSimpleType::restriction(name, TypeRef::any_type());
                st.variety = SimpleVariety::Union(members);
                Ok(st)
            }
            other => Err(unexpected(
                variety,
                &format!("'{}' is not allowed in a simple type", other),
            )),
        }
    }

    fn parse_facets(&self, restriction: &Element, st: &mut XsdSimpleType) -> Result<()> {
        for child in xsd_children(restriction) {
            match child.local_name() {
                tags::ANNOTATION | tags::SIMPLE_TYPE | tags::ATTRIBUTE | tags::ANY_ATTRIBUTE => {}
                facet => {
                    let value = required_attribute(child, attrs::VALUE)?;
                    if !st.facets.set(facet, value)? {
                        return Err(unexpected(child, &format!("unknown facet '{}'", facet)));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Children in the XSD namespace; foreign elements are ignored
fn xsd_children(elem: &Element) -> impl Iterator<Item = &Element> {
    elem.children.iter().filter(|c| c.qname.is_in(XSD_NAMESPACE))
}

fn derivation_child(elem: &Element) -> Result<&Element> {
    xsd_children(elem)
        .find(|c| matches!(c.local_name(), tags::EXTENSION | tags::RESTRICTION))
        .ok_or_else(|| unexpected(elem, "expected an extension or restriction"))
}

/// Content model consisting of a single `xs:group ref`
fn group_ref_wrapper(elem: &Element) -> Result<XsdGroup> {
    let mut group = XsdGroup::new(ModelType::Sequence);
    group.particles.push(GroupParticle::GroupRef {
        name: elem
            .namespaces
            .resolve(required_attribute(elem, attrs::REF)?.trim())?,
        occurs: occurs_of(elem)?,
    });
    Ok(group)
}

/// Resolve a type name as written in the schema
fn resolve_type(elem: &Element, type_name: &str) -> Result<TypeRef> {
    let qname = elem.namespaces.resolve(type_name.trim())?;
    if qname.is_in(XSD_NAMESPACE) {
        return BuiltinType::from_local_name(&qname.local_name)
            .map(TypeRef::Builtin)
            .ok_or_else(|| {
                ParseError::new(format!("Type '{}' is not declared.", type_name.trim())).into()
            });
    }
    Ok(TypeRef::Named(qname))
}

fn required_attribute<'a>(elem: &'a Element, name: &str) -> Result<&'a str> {
    elem.get_attribute(name).ok_or_else(|| {
        unexpected(elem, &format!("the required attribute '{}' is missing", name))
    })
}

fn boolean_attribute(elem: &Element, name: &str) -> Result<bool> {
    match elem.get_attribute(name).map(str::trim) {
        None | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => Err(unexpected(
            elem,
            &format!("'{}' is not a valid value for '{}'", other, name),
        )),
    }
}

fn form_attribute(elem: &Element, name: &str) -> Result<FormDefault> {
    match elem.get_attribute(name) {
        Some(value) => FormDefault::from_name(value.trim()).ok_or_else(|| {
            unexpected(elem, &format!("'{}' is not a valid value for '{}'", value, name))
        }),
        None => Ok(FormDefault::Unqualified),
    }
}

fn occurs_of(elem: &Element) -> Result<Occurs> {
    Occurs::parse(
        elem.get_attribute(attrs::MIN_OCCURS),
        elem.get_attribute(attrs::MAX_OCCURS),
    )
    .map_err(|e| match e {
        crate::error::Error::Schema(pe) => with_position(pe, elem).into(),
        other => other,
    })
}

fn with_position(error: ParseError, elem: &Element) -> ParseError {
    match elem.position {
        Some(pos) => error.with_location(format!("Line {}, Position {}", pos.line, pos.column)),
        None => error,
    }
}

fn unexpected(elem: &Element, message: &str) -> crate::error::Error {
    with_position(
        ParseError::new(message.to_string()).with_component(elem.prefixed_name.clone()),
        elem,
    )
    .into()
}

/// Every name used by a component must resolve to a declared global
fn check_references(schema: &XsdSchema) -> Result<()> {
    for (_, decl) in schema.elements() {
        check_type_ref(schema, &decl.type_ref, 0)?;
    }
    for (_, global) in schema.types() {
        match global {
            GlobalType::Simple(st) => check_simple_type(schema, st, 0)?,
            GlobalType::Complex(ct) => check_complex_type(schema, ct, 0)?,
        }
    }
    for (_, group) in schema.groups() {
        check_group(schema, group, 0)?;
    }
    Ok(())
}

const MAX_CHECK_DEPTH: usize = 256;

fn check_type_ref(schema: &XsdSchema, type_ref: &TypeRef, depth: usize) -> Result<()> {
    if depth > MAX_CHECK_DEPTH {
        return Ok(());
    }
    match type_ref {
        TypeRef::Builtin(_) => Ok(()),
        TypeRef::Named(name) => match schema.lookup_type(name) {
            Some(_) => Ok(()),
            None => Err(ParseError::new(format!("Type '{}' is not declared.", name.local_name)).into()),
        },
        TypeRef::Simple(st) => check_simple_type(schema, st, depth + 1),
        TypeRef::Complex(ct) => check_complex_type(schema, ct, depth + 1),
    }
}

fn check_simple_type(schema: &XsdSchema, st: &XsdSimpleType, depth: usize) -> Result<()> {
    check_type_ref(schema, &st.base, depth + 1)?;
    match &st.variety {
        SimpleVariety::Atomic => {
            if let TypeRef::Named(name) = &st.base {
                if let Some(GlobalType::Complex(_)) = schema.lookup_type(name) {
                    return Err(ParseError::new(format!(
                        "Type '{}' is a complex type and cannot be the base of a simple type.",
                        name.local_name
                    ))
                    .into());
                }
            }
            Ok(())
        }
        SimpleVariety::List(item) => check_type_ref(schema, item, depth + 1),
        SimpleVariety::Union(members) => members
            .iter()
            .try_for_each(|m| check_type_ref(schema, m, depth + 1)),
    }
}

fn check_complex_type(schema: &XsdSchema, ct: &XsdComplexType, depth: usize) -> Result<()> {
    if let Some((base, method)) = &ct.base {
        match (schema.lookup_type(base), &ct.content) {
            (None, _) => {
                return Err(ParseError::new(format!("Type '{}' is not declared.", base.local_name)).into())
            }
            (Some(GlobalType::Simple(_)), ComplexContent::Elements(_) | ComplexContent::Empty) => {
                return Err(ParseError::new(format!(
                    "Undefined complexType '{}' is used as a base for complex type {}.",
                    base.local_name,
                    match method {
                        DerivationMethod::Extension => "extension",
                        DerivationMethod::Restriction => "restriction",
                    }
                ))
                .into())
            }
            _ => {}
        }
    }

    for attribute in &ct.attributes {
        check_type_ref(schema, &attribute.type_ref, depth + 1)?;
    }

    match &ct.content {
        ComplexContent::Empty => Ok(()),
        ComplexContent::Simple(type_ref) => check_type_ref(schema, type_ref, depth + 1),
        ComplexContent::Elements(group) => check_group(schema, group, depth + 1),
    }
}

fn check_group(schema: &XsdSchema, group: &XsdGroup, depth: usize) -> Result<()> {
    if depth > MAX_CHECK_DEPTH {
        return Ok(());
    }
    for particle in &group.particles {
        match particle {
            GroupParticle::Element { decl, .. } => check_type_ref(schema, &decl.type_ref, depth + 1)?,
            GroupParticle::ElementRef { name, .. } => {
                if schema.lookup_element(name).is_none() {
                    return Err(ParseError::new(format!(
                        "The '{}' element is not declared.",
                        name.local_name
                    ))
                    .into());
                }
            }
            GroupParticle::Group(inner) => check_group(schema, inner, depth + 1)?,
            GroupParticle::GroupRef { name, .. } => {
                if schema.lookup_group(name).is_none() {
                    return Err(ParseError::new(format!(
                        "Reference to undeclared model group '{}'.",
                        name.local_name
                    ))
                    .into());
                }
            }
            GroupParticle::Any { .. } => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xsd: &str) -> Result<XsdSchema> {
        XsdSchema::from_string(xsd)
    }

    fn schema(body: &str) -> String {
        format!(
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{}</xs:schema>"#,
            body
        )
    }

    #[test]
    fn test_parse_hotel_schema() {
        let xsd = schema(
            r#"
            <xs:element name="Hotels">
              <xs:complexType>
                <xs:sequence>
                  <xs:element name="Hotel" maxOccurs="unbounded">
                    <xs:complexType>
                      <xs:sequence>
                        <xs:element name="Name" type="xs:string"/>
                        <xs:element name="Phone" type="xs:string" maxOccurs="unbounded"/>
                      </xs:sequence>
                      <xs:attribute name="Rating" type="xs:decimal" use="optional"/>
                    </xs:complexType>
                  </xs:element>
                </xs:sequence>
              </xs:complexType>
            </xs:element>"#,
        );
        let schema = parse(&xsd).unwrap();
        let hotels = schema.lookup_element(&QName::local("Hotels")).unwrap();

        let TypeRef::Complex(ct) = &hotels.type_ref else {
            panic!("expected an anonymous complex type");
        };
        let ComplexContent::Elements(group) = &ct.content else {
            panic!("expected element content");
        };
        assert_eq!(group.model, ModelType::Sequence);
        match &group.particles[0] {
            GroupParticle::Element { decl, occurs } => {
                assert_eq!(decl.local_name(), "Hotel");
                assert_eq!(*occurs, Occurs::new(1, None));
            }
            other => panic!("unexpected particle {:?}", other),
        }
    }

    #[test]
    fn test_non_schema_root_rejected() {
        let err = parse("<Hotels/>").unwrap_err();
        assert!(err.to_string().contains("should be <schema>"));
    }

    #[test]
    fn test_undeclared_type_rejected() {
        let xsd = schema(r#"<xs:element name="Zip" type="zipType"/>"#);
        let err = parse(&xsd).unwrap_err();
        assert!(err.to_string().contains("Type 'zipType' is not declared."));

        let xsd = schema(r#"<xs:element name="Zip" type="xs:zipCode"/>"#);
        assert!(parse(&xsd).is_err());
    }

    #[test]
    fn test_undeclared_element_ref_rejected() {
        let xsd = schema(
            r#"<xs:element name="Hotels"><xs:complexType><xs:sequence>
                 <xs:element ref="Hotel"/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );
        let err = parse(&xsd).unwrap_err();
        assert!(err.to_string().contains("The 'Hotel' element is not declared."));
    }

    #[test]
    fn test_declaration_order_does_not_matter() {
        let xsd = schema(
            r#"<xs:element name="Rating" type="ratingType"/>
               <xs:simpleType name="ratingType">
                 <xs:restriction base="xs:decimal">
                   <xs:minInclusive value="0"/>
                   <xs:maxInclusive value="5"/>
                 </xs:restriction>
               </xs:simpleType>"#,
        );
        let schema = parse(&xsd).unwrap();
        assert!(matches!(
            schema.lookup_type(&QName::local("ratingType")),
            Some(GlobalType::Simple(_))
        ));
    }

    #[test]
    fn test_target_namespace_and_forms() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
                        xmlns:h="urn:hotels" targetNamespace="urn:hotels"
                        elementFormDefault="qualified">
              <xs:element name="Hotels" type="h:hotelsType"/>
              <xs:complexType name="hotelsType">
                <xs:sequence><xs:element name="Hotel" type="xs:string"/></xs:sequence>
                <xs:attribute name="Region" type="xs:string"/>
              </xs:complexType>
            </xs:schema>"#;
        let schema = parse(xsd).unwrap();
        assert_eq!(schema.target_namespace.as_deref(), Some("urn:hotels"));
        assert!(schema.element_form_default.is_qualified());

        let Some(GlobalType::Complex(ct)) = schema.lookup_type(&QName::namespaced("urn:hotels", "hotelsType")) else {
            panic!("hotelsType missing");
        };
        let ComplexContent::Elements(group) = &ct.content else {
            panic!("expected element content");
        };
        let GroupParticle::Element { decl, .. } = &group.particles[0] else {
            panic!("expected a local element");
        };
        assert_eq!(decl.name, QName::namespaced("urn:hotels", "Hotel"));
        assert_eq!(ct.attributes[0].name, QName::local("Region"));
    }

    #[test]
    fn test_attribute_ref_and_simple_content() {
        let xsd = schema(
            r#"<xs:attribute name="currency" type="xs:string"/>
               <xs:element name="Price">
                 <xs:complexType>
                   <xs:simpleContent>
                     <xs:extension base="xs:decimal">
                       <xs:attribute ref="currency" use="required"/>
                     </xs:extension>
                   </xs:simpleContent>
                 </xs:complexType>
               </xs:element>"#,
        );
        let schema = parse(&xsd).unwrap();
        let price = schema.lookup_element(&QName::local("Price")).unwrap();
        let TypeRef::Complex(ct) = &price.type_ref else {
            panic!("expected an anonymous complex type");
        };
        assert!(matches!(ct.content, ComplexContent::Simple(TypeRef::Builtin(BuiltinType::Decimal))));
        assert!(ct.attributes[0].is_required());
        assert!(ct.base.is_none());
    }

    #[test]
    fn test_unknown_facet_rejected() {
        let xsd = schema(
            r#"<xs:simpleType name="zipType">
                 <xs:restriction base="xs:string"><xs:maxSize value="5"/></xs:restriction>
               </xs:simpleType>"#,
        );
        let err = parse(&xsd).unwrap_err();
        assert!(err.to_string().contains("unknown facet 'maxSize'"));
    }

    #[test]
    fn test_invalid_occurs_reports_position() {
        let xsd = schema(
            r#"<xs:element name="Hotels"><xs:complexType><xs:sequence>
                 <xs:element name="Hotel" minOccurs="2" maxOccurs="1"/>
               </xs:sequence></xs:complexType></xs:element>"#,
        );
        let err = parse(&xsd).unwrap_err();
        assert!(err.to_string().contains("maxOccurs"));
        assert!(err.to_string().contains("Line 2"));
    }
}
