//! Document Validation
//!
//! Walks an instance document against a schema and records one event per
//! violation. The walk never stops early: every element that can be tied to
//! a declaration is checked, so a single run reports all problems.

use std::sync::Arc;

use crate::documents::{Document, Element};
use crate::namespaces::{QName, XML_NAMESPACE, XSI_NAMESPACE};

use super::attributes::XsdAttribute;
use super::builtins::BuiltinType;
use super::complex_types::{ComplexContent, XsdComplexType};
use super::elements::XsdElement;
use super::groups::{GroupParticle, ModelType, XsdGroup};
use super::schemas::{GlobalType, XsdSchema};
use super::simple_types::{normalize_value, validate_simple_value, TypeRef};
use super::validation::{SeverityPolicy, ValidationContext, ValidationReport};

/// Model group nesting deeper than this is treated as circular
const MAX_GROUP_DEPTH: usize = 128;

/// Validate an XML document against the schema
pub fn validate_document(
    schema: &XsdSchema,
    doc: &Document,
    policy: SeverityPolicy,
) -> ValidationReport {
    let mut context = ValidationContext::new(policy);

    let Some(root) = doc.root() else {
        context.error("Root element is missing.", None);
        return context.into_report();
    };

    match schema.lookup_element(&root.qname) {
        Some(decl) => validate_element(schema, root, decl, &mut context),
        None if schema.covers_namespace(root.namespace()) => {
            context.error(
                format!("The '{}' element is not declared.", qualified_label(&root.qname)),
                root.position,
            );
        }
        None => {
            context.warning(
                format!(
                    "Could not find schema information for the element '{}'.",
                    qualified_label(&root.qname)
                ),
                root.position,
            );
        }
    }

    context.into_report()
}

/// How an element's content is checked
enum ResolvedType {
    /// Anything goes
    Any,
    /// Text of a simple type
    Simple(TypeRef),
    /// Attributes and content of a complex type
    Complex(Arc<XsdComplexType>),
}

fn resolve_type(schema: &XsdSchema, type_ref: &TypeRef) -> ResolvedType {
    match type_ref {
        // Untyped declarations get xs:anyType
        TypeRef::Builtin(BuiltinType::AnySimpleType) => ResolvedType::Any,
        TypeRef::Builtin(_) | TypeRef::Simple(_) => ResolvedType::Simple(type_ref.clone()),
        TypeRef::Complex(ct) => ResolvedType::Complex(Arc::clone(ct)),
        TypeRef::Named(name) => match schema.lookup_type(name) {
            Some(GlobalType::Simple(_)) => ResolvedType::Simple(type_ref.clone()),
            Some(GlobalType::Complex(ct)) => ResolvedType::Complex(Arc::clone(ct)),
            None => ResolvedType::Any,
        },
    }
}

/// Validate an XML element against its declaration
fn validate_element(
    schema: &XsdSchema,
    elem: &Element,
    decl: &XsdElement,
    context: &mut ValidationContext,
) {
    let resolved = resolve_type(schema, &decl.type_ref);

    if is_nilled(elem) {
        if !decl.nillable {
            context.error(
                "If the 'nillable' attribute is false in the schema, the 'xsi:nil' attribute must not be present in the instance.",
                elem.position,
            );
        } else {
            if !elem.children.is_empty() || elem.has_text() {
                context.error(
                    format!(
                        "Element {} must have no character or element information item children, because 'xsi:nil' was specified.",
                        describe(&elem.qname)
                    ),
                    elem.position,
                );
            }
            if let ResolvedType::Complex(ct) = &resolved {
                validate_attributes(schema, elem, ct, context);
            }
            return;
        }
    }

    match resolved {
        ResolvedType::Any => {}
        ResolvedType::Simple(type_ref) => {
            reject_attributes(elem, context);
            validate_text_only(schema, elem, decl, &type_ref, context);
        }
        ResolvedType::Complex(ct) => {
            validate_attributes(schema, elem, &ct, context);
            match schema.effective_content(&ct) {
                ComplexContent::Empty => validate_empty(elem, context),
                ComplexContent::Simple(type_ref) => {
                    validate_text_only(schema, elem, decl, &type_ref, context)
                }
                ComplexContent::Elements(group) => {
                    if !ct.mixed && elem.has_text() {
                        context.error(
                            format!(
                                "The element {} cannot contain text because its content model is element only.",
                                describe(&elem.qname)
                            ),
                            elem.position,
                        );
                    }
                    validate_children(schema, elem, &group, context);
                }
            }
        }
    }
}

fn is_nilled(elem: &Element) -> bool {
    elem.get_attribute_qname(&QName::namespaced(XSI_NAMESPACE, "nil"))
        .map(str::trim)
        .is_some_and(|v| v == "true" || v == "1")
}

fn is_infrastructure(qname: &QName) -> bool {
    qname.is_in(XSI_NAMESPACE) || qname.is_in(XML_NAMESPACE)
}

/// Elements of a simple type carry no attributes of their own
fn reject_attributes(elem: &Element, context: &mut ValidationContext) {
    for qname in elem.attributes.keys().filter(|q| !is_infrastructure(q)) {
        context.error(
            format!("The '{}' attribute is not declared.", qname.local_name),
            elem.position,
        );
    }
}

fn validate_attributes(
    schema: &XsdSchema,
    elem: &Element,
    ct: &XsdComplexType,
    context: &mut ValidationContext,
) {
    let declared = schema.effective_attributes(ct);
    let any_attribute = schema.accepts_any_attribute(ct);

    for (qname, value) in elem.attributes.iter().filter(|(q, _)| !is_infrastructure(q)) {
        match declared.iter().find(|a| &a.name == qname && !a.is_prohibited()) {
            Some(attribute) => validate_attribute_value(schema, elem, attribute, value, context),
            None if any_attribute => {}
            None => context.error(
                format!("The '{}' attribute is not declared.", qname.local_name),
                elem.position,
            ),
        }
    }

    for attribute in declared.iter().filter(|a| a.is_required()) {
        if elem.get_attribute_qname(&attribute.name).is_none() {
            context.error(
                format!("The required attribute '{}' is missing.", attribute.name.local_name),
                elem.position,
            );
        }
    }
}

fn validate_attribute_value(
    schema: &XsdSchema,
    elem: &Element,
    attribute: &XsdAttribute,
    value: &str,
    context: &mut ValidationContext,
) {
    if let Err(reason) = validate_simple_value(schema, &attribute.type_ref, value) {
        context.error(
            format!(
                "The '{}' attribute is invalid - The value '{}' is invalid according to its datatype '{}' - {}",
                attribute.name.local_name, value, attribute.type_ref, reason
            ),
            elem.position,
        );
        return;
    }

    if let Some(fixed) = &attribute.fixed {
        if normalize_value(schema, &attribute.type_ref, value)
            != normalize_value(schema, &attribute.type_ref, fixed)
        {
            context.error(
                format!(
                    "The value of the '{}' attribute does not equal its fixed value.",
                    attribute.name.local_name
                ),
                elem.position,
            );
        }
    }
}

fn validate_empty(elem: &Element, context: &mut ValidationContext) {
    if let Some(child) = elem.children.first() {
        context.error(
            format!(
                "The element {} cannot contain child element {} because the parent element's content model is empty.",
                describe(&elem.qname),
                describe(&child.qname)
            ),
            child.position,
        );
    } else if elem.has_text() {
        context.error(
            format!(
                "The element {} cannot contain text. Content model is empty.",
                describe(&elem.qname)
            ),
            elem.position,
        );
    }
}

fn validate_text_only(
    schema: &XsdSchema,
    elem: &Element,
    decl: &XsdElement,
    type_ref: &TypeRef,
    context: &mut ValidationContext,
) {
    if let Some(child) = elem.children.first() {
        context.error(
            format!(
                "The element {} cannot contain child element {} because the parent element's content model is text only.",
                describe(&elem.qname),
                describe(&child.qname)
            ),
            child.position,
        );
        return;
    }

    let raw = elem.text.as_deref().unwrap_or("");
    let value = match (&decl.default, raw.is_empty()) {
        (Some(default), true) => default.as_str(),
        _ => raw,
    };

    if let Err(reason) = validate_simple_value(schema, type_ref, value) {
        context.error(
            format!(
                "The '{}' element is invalid - The value '{}' is invalid according to its datatype '{}' - {}",
                elem.local_name(),
                value,
                type_ref,
                reason
            ),
            elem.position,
        );
        return;
    }

    if let Some(fixed) = &decl.fixed {
        if normalize_value(schema, type_ref, value) != normalize_value(schema, type_ref, fixed) {
            context.error(
                format!(
                    "The value of the '{}' element does not equal its fixed value.",
                    elem.local_name()
                ),
                elem.position,
            );
        }
    }
}

/// Match the children against the content model, then descend into them
fn validate_children(
    schema: &XsdSchema,
    elem: &Element,
    group: &Arc<XsdGroup>,
    context: &mut ValidationContext,
) {
    let mut matcher = ContentMatcher::new(schema, &elem.children);
    let outcome = matcher.run(group);
    let ContentMatcher {
        assignments,
        expected,
        ..
    } = matcher;

    let failed_at = match outcome {
        MatchOutcome::InvalidChild(index) => Some(index),
        _ => None,
    };

    // Errors are emitted in document order
    for (index, child) in elem.children.iter().enumerate() {
        if failed_at == Some(index) {
            context.error(
                format!(
                    "The element {} has invalid child element {}.{}",
                    describe(&elem.qname),
                    describe(&child.qname),
                    expected_suffix(&expected)
                ),
                child.position,
            );
            continue;
        }
        let decl = match &assignments[index] {
            Some(Assignment::Element(decl)) => Some(Arc::clone(decl)),
            Some(Assignment::Skip) => None,
            // Past a content error: still check children whose declaration is unambiguous
            None => find_declaration(schema, group, &child.qname, 0),
        };
        if let Some(decl) = decl {
            validate_element(schema, child, &decl, context);
        }
    }

    if outcome == MatchOutcome::Incomplete {
        context.error(
            format!(
                "The element {} has incomplete content.{}",
                describe(&elem.qname),
                expected_suffix(&expected)
            ),
            elem.end_position.or(elem.position),
        );
    }
}

fn find_declaration(
    schema: &XsdSchema,
    group: &XsdGroup,
    qname: &QName,
    depth: usize,
) -> Option<Arc<XsdElement>> {
    if depth > MAX_GROUP_DEPTH {
        return None;
    }
    group.particles.iter().find_map(|particle| match particle {
        GroupParticle::Element { decl, .. } if &decl.name == qname => Some(Arc::clone(decl)),
        GroupParticle::ElementRef { name, .. } if name == qname => {
            schema.lookup_element(name).cloned()
        }
        GroupParticle::Group(inner) => find_declaration(schema, inner, qname, depth + 1),
        GroupParticle::GroupRef { name, .. } => schema
            .lookup_group(name)
            .and_then(|inner| find_declaration(schema, inner, qname, depth + 1)),
        _ => None,
    })
}

/// What a child element was matched to
#[derive(Debug, Clone)]
enum Assignment {
    Element(Arc<XsdElement>),
    /// Matched a wildcard; not validated further
    Skip,
}

#[derive(Debug, PartialEq, Eq)]
enum MatchOutcome {
    Complete,
    InvalidChild(usize),
    Incomplete,
}

/// Result of trying a particle at a position.
/// `Ok(Some(end))` matched up to `end`, `Ok(None)` matched nothing and
/// consumed nothing, `Err(at)` consumed children and then got stuck at `at`.
type Step = std::result::Result<Option<usize>, usize>;

/// Greedy content model matcher over the children of one element
struct ContentMatcher<'a> {
    schema: &'a XsdSchema,
    children: &'a [Element],
    assignments: Vec<Option<Assignment>>,
    /// Furthest position at which a child was expected
    furthest: usize,
    /// Names expected at `furthest`, in schema order
    expected: Vec<QName>,
    depth: usize,
}

impl<'a> ContentMatcher<'a> {
    fn new(schema: &'a XsdSchema, children: &'a [Element]) -> Self {
        Self {
            schema,
            children,
            assignments: vec![None; children.len()],
            furthest: 0,
            expected: Vec::new(),
            depth: 0,
        }
    }

    fn run(&mut self, group: &Arc<XsdGroup>) -> MatchOutcome {
        let stopped_at = match self.match_particle(&GroupParticle::Group(Arc::clone(group)), 0) {
            Ok(Some(end)) if end == self.children.len() => return MatchOutcome::Complete,
            Ok(Some(end)) => end,
            Ok(None) => self.furthest,
            Err(at) => at.max(self.furthest),
        };

        if stopped_at != self.furthest {
            self.expected.clear();
        }
        if stopped_at < self.children.len() {
            MatchOutcome::InvalidChild(stopped_at)
        } else {
            MatchOutcome::Incomplete
        }
    }

    fn expect(&mut self, position: usize, name: &QName) {
        if position > self.furthest {
            self.furthest = position;
            self.expected.clear();
        }
        if position == self.furthest && !self.expected.contains(name) {
            self.expected.push(name.clone());
        }
    }

    /// Record the names a particle can start with, without matching anything
    fn expect_first(&mut self, particle: &GroupParticle, position: usize, depth: usize) {
        if depth > MAX_GROUP_DEPTH {
            return;
        }
        match particle {
            GroupParticle::Element { decl, .. } => self.expect(position, &decl.name),
            GroupParticle::ElementRef { name, .. } => self.expect(position, name),
            GroupParticle::Any { .. } => {}
            GroupParticle::Group(group) => self.expect_group_first(group, position, depth + 1),
            GroupParticle::GroupRef { name, .. } => {
                if let Some(group) = self.schema.lookup_group(name) {
                    let group = Arc::clone(group);
                    self.expect_group_first(&group, position, depth + 1);
                }
            }
        }
    }

    fn expect_group_first(&mut self, group: &XsdGroup, position: usize, depth: usize) {
        for particle in &group.particles {
            self.expect_first(particle, position, depth);
            // Later sequence members only start the group when earlier ones may be absent
            if group.model == ModelType::Sequence && !particle.occurs().is_emptiable() {
                break;
            }
        }
    }

    fn match_element(&mut self, decl: &Arc<XsdElement>, position: usize) -> Step {
        match self.children.get(position) {
            Some(child) if child.qname == decl.name => {
                self.assignments[position] = Some(Assignment::Element(Arc::clone(decl)));
                Ok(Some(position + 1))
            }
            _ => {
                self.expect(position, &decl.name);
                Ok(None)
            }
        }
    }

    /// One occurrence of a particle's term
    fn match_term(&mut self, particle: &GroupParticle, position: usize) -> Step {
        match particle {
            GroupParticle::Element { decl, .. } => self.match_element(decl, position),
            GroupParticle::ElementRef { name, .. } => match self.schema.lookup_element(name) {
                Some(decl) => {
                    let decl = Arc::clone(decl);
                    self.match_element(&decl, position)
                }
                None => Ok(None),
            },
            GroupParticle::Any { .. } => {
                if position < self.children.len() {
                    self.assignments[position] = Some(Assignment::Skip);
                    Ok(Some(position + 1))
                } else {
                    Ok(None)
                }
            }
            GroupParticle::Group(group) => self.match_group(group, position),
            GroupParticle::GroupRef { name, .. } => match self.schema.lookup_group(name) {
                Some(group) => {
                    let group = Arc::clone(group);
                    self.match_group(&group, position)
                }
                None => Ok(None),
            },
        }
    }

    /// A particle with its occurrence bounds
    fn match_particle(&mut self, particle: &GroupParticle, position: usize) -> Step {
        let occurs = particle.occurs();
        let mut count = 0u32;
        let mut current = position;
        let mut matches_empty = false;

        while occurs.allows(count + 1) {
            match self.match_term(particle, current)? {
                Some(end) if end > current => {
                    count += 1;
                    current = end;
                }
                Some(_) => {
                    matches_empty = true;
                    break;
                }
                None => break,
            }
        }

        if occurs.is_satisfied(count) || matches_empty {
            Ok(Some(current))
        } else if current == position {
            Ok(None)
        } else {
            Err(current)
        }
    }

    fn match_group(&mut self, group: &XsdGroup, position: usize) -> Step {
        if self.depth > MAX_GROUP_DEPTH {
            return Ok(None);
        }
        self.depth += 1;
        let step = match group.model {
            ModelType::Sequence => self.match_sequence(group, position),
            ModelType::Choice => self.match_choice(group, position),
            ModelType::All => self.match_all(group, position),
        };
        self.depth -= 1;
        step
    }

    fn match_sequence(&mut self, group: &XsdGroup, position: usize) -> Step {
        let mut current = position;
        for particle in &group.particles {
            match self.match_particle(particle, current)? {
                Some(end) => current = end,
                None if current == position => return Ok(None),
                None => return Err(current),
            }
        }
        Ok(Some(current))
    }

    fn match_choice(&mut self, group: &XsdGroup, position: usize) -> Step {
        let mut matches_empty = group.particles.is_empty();
        for particle in &group.particles {
            match self.match_particle(particle, position)? {
                Some(end) if end > position => return Ok(Some(end)),
                Some(_) => matches_empty = true,
                None => {}
            }
        }
        Ok(matches_empty.then_some(position))
    }

    fn match_all(&mut self, group: &XsdGroup, position: usize) -> Step {
        let mut used = vec![false; group.particles.len()];
        let mut current = position;

        'children: while current < self.children.len() {
            for (index, particle) in group.particles.iter().enumerate() {
                if used[index] {
                    continue;
                }
                if let Some(end) = self.match_particle(particle, current)? {
                    if end > current {
                        used[index] = true;
                        current = end;
                        continue 'children;
                    }
                }
            }
            break;
        }

        let mut complete = true;
        for (index, particle) in group.particles.iter().enumerate() {
            if !used[index] && !particle.occurs().is_emptiable() {
                complete = false;
                self.expect_first(particle, current, 0);
            }
        }

        if complete {
            Ok(Some(current))
        } else if current == position {
            Ok(None)
        } else {
            Err(current)
        }
    }
}

/// Element name with its namespace, the way messages show it
fn describe(qname: &QName) -> String {
    match &qname.namespace {
        Some(ns) => format!("'{}' in namespace '{}'", qname.local_name, ns),
        None => format!("'{}'", qname.local_name),
    }
}

fn qualified_label(qname: &QName) -> String {
    match &qname.namespace {
        Some(ns) => format!("{}:{}", ns, qname.local_name),
        None => qname.local_name.clone(),
    }
}

fn expected_suffix(expected: &[QName]) -> String {
    if expected.is_empty() {
        return String::new();
    }
    let names = expected
        .iter()
        .map(|q| q.local_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let shared_namespace = expected[0].namespace.as_deref().filter(|ns| {
        expected.iter().all(|q| q.namespace.as_deref() == Some(*ns))
    });
    match shared_namespace {
        Some(ns) => format!(
            " List of possible elements expected: '{}' in namespace '{}'.",
            names, ns
        ),
        None => format!(" List of possible elements expected: '{}'.", names),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::TextPosition;
    use crate::validators::exceptions::Severity;

    const HOTELS_XSD: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Hotels">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="Hotel" type="hotelType" maxOccurs="unbounded"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
  <xs:complexType name="hotelType">
    <xs:sequence>
      <xs:element name="Name" type="xs:string"/>
      <xs:element name="Phone" type="xs:string" maxOccurs="unbounded"/>
      <xs:element name="Address" type="addressType"/>
    </xs:sequence>
    <xs:attribute name="Rating" type="ratingType" use="optional"/>
  </xs:complexType>
  <xs:complexType name="addressType">
    <xs:sequence>
      <xs:element name="Number" type="xs:string"/>
      <xs:element name="Street" type="xs:string"/>
      <xs:element name="City" type="xs:string"/>
      <xs:element name="State" type="xs:string"/>
      <xs:element name="Zip" type="xs:string"/>
    </xs:sequence>
    <xs:attribute name="NearestAirport" type="xs:string" use="required"/>
  </xs:complexType>
  <xs:simpleType name="ratingType">
    <xs:restriction base="xs:decimal">
      <xs:minInclusive value="0"/>
      <xs:maxInclusive value="5"/>
    </xs:restriction>
  </xs:simpleType>
</xs:schema>"#;

    const ADDRESS: &str = r#"<Address NearestAirport="PHX"><Number>1</Number><Street>Main</Street><City>Tempe</City><State>AZ</State><Zip>85281</Zip></Address>"#;

    fn validate(xml: &str) -> ValidationReport {
        let schema = XsdSchema::from_string(HOTELS_XSD).unwrap();
        let doc = Document::from_string(xml).unwrap();
        validate_document(&schema, &doc, SeverityPolicy::All)
    }

    fn messages(report: &ValidationReport) -> Vec<String> {
        report.events.iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn test_valid_document() {
        let xml = format!(
            r#"<Hotels><Hotel Rating="4.2"><Name>Inn</Name><Phone>1</Phone><Phone>2</Phone>{}</Hotel></Hotels>"#,
            ADDRESS
        );
        let report = validate(&xml);
        assert!(report.is_clean(), "{:?}", report.events);
    }

    #[test]
    fn test_missing_required_child() {
        let xml = format!("<Hotels><Hotel><Name>Inn</Name>{}</Hotel></Hotels>", ADDRESS);
        let report = validate(&xml);
        assert_eq!(
            messages(&report),
            vec!["The element 'Hotel' has invalid child element 'Address'. List of possible elements expected: 'Phone'."]
        );
    }

    #[test]
    fn test_incomplete_content() {
        let report = validate("<Hotels><Hotel><Name>Inn</Name><Phone>1</Phone></Hotel></Hotels>");
        assert_eq!(
            messages(&report),
            vec!["The element 'Hotel' has incomplete content. List of possible elements expected: 'Phone, Address'."]
        );
        // Reported at the end tag
        assert_eq!(report.events[0].position, Some(TextPosition::new(1, 50)));
    }

    #[test]
    fn test_invalid_attribute_value() {
        let xml = format!(
            r#"<Hotels><Hotel Rating="9"><Name>Inn</Name><Phone>1</Phone>{}</Hotel></Hotels>"#,
            ADDRESS
        );
        let report = validate(&xml);
        assert_eq!(report.events.len(), 1);
        let message = &report.events[0].message;
        assert!(message.starts_with("The 'Rating' attribute is invalid - The value '9'"));
        assert!(message.contains("ratingType"));
        assert_eq!(report.events[0].position, Some(TextPosition::new(1, 10)));
    }

    #[test]
    fn test_missing_and_undeclared_attributes() {
        let xml = r#"<Hotels><Hotel Stars="3"><Name>Inn</Name><Phone>1</Phone><Address><Number>1</Number><Street>Main</Street><City>Tempe</City><State>AZ</State><Zip>85281</Zip></Address></Hotel></Hotels>"#;
        let report = validate(xml);
        assert_eq!(
            messages(&report),
            vec![
                "The 'Stars' attribute is not declared.",
                "The required attribute 'NearestAirport' is missing.",
            ]
        );
    }

    #[test]
    fn test_errors_in_later_records_are_reported() {
        let xml = format!(
            r#"<Hotels>
<Hotel><Name>A</Name>{}</Hotel>
<Hotel Rating="x"><Name>B</Name><Phone>1</Phone>{}</Hotel>
</Hotels>"#,
            ADDRESS, ADDRESS
        );
        let report = validate(&xml);
        assert_eq!(report.error_count(), 2);
        assert_eq!(report.events[0].position.map(|p| p.line), Some(2));
        assert_eq!(report.events[1].position.map(|p| p.line), Some(3));
    }

    #[test]
    fn test_text_in_element_only_content() {
        let xml = format!(
            "<Hotels><Hotel>stray<Name>Inn</Name><Phone>1</Phone>{}</Hotel></Hotels>",
            ADDRESS
        );
        let report = validate(&xml);
        assert_eq!(report.error_count(), 1);
        assert!(report.events[0].message.contains("cannot contain text"));
    }

    #[test]
    fn test_child_in_simple_content() {
        let xml = format!(
            "<Hotels><Hotel><Name><First>Inn</First></Name><Phone>1</Phone>{}</Hotel></Hotels>",
            ADDRESS
        );
        let report = validate(&xml);
        assert_eq!(
            messages(&report),
            vec!["The element 'Name' cannot contain child element 'First' because the parent element's content model is text only."]
        );
    }

    #[test]
    fn test_unknown_root_is_a_warning() {
        let report = validate("<Motels><Motel/></Motels>");
        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].severity, Severity::Error);
        assert_eq!(report.events[0].message, "The 'Motels' element is not declared.");

        let report = validate(r#"<m:Motels xmlns:m="urn:motels"/>"#);
        assert_eq!(report.events[0].severity, Severity::Warning);
        assert_eq!(
            report.events[0].message,
            "Could not find schema information for the element 'urn:motels:Motels'."
        );
    }

    #[test]
    fn test_errors_only_policy_drops_warnings() {
        let schema = XsdSchema::from_string(HOTELS_XSD).unwrap();
        let doc = Document::from_string(r#"<m:Motels xmlns:m="urn:motels"/>"#).unwrap();
        let report = validate_document(&schema, &doc, SeverityPolicy::ErrorsOnly);
        assert!(report.is_clean());
    }

    #[test]
    fn test_choice_and_all_groups() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="Contact">
            <xs:complexType>
              <xs:choice>
                <xs:element name="Phone" type="xs:string"/>
                <xs:element name="Email" type="xs:string"/>
              </xs:choice>
            </xs:complexType>
          </xs:element>
          <xs:element name="Address">
            <xs:complexType>
              <xs:all>
                <xs:element name="City" type="xs:string"/>
                <xs:element name="State" type="xs:string" minOccurs="0"/>
              </xs:all>
            </xs:complexType>
          </xs:element>
        </xs:schema>"#;
        let schema = XsdSchema::from_string(xsd).unwrap();
        let check = |xml: &str| {
            let doc = Document::from_string(xml).unwrap();
            validate_document(&schema, &doc, SeverityPolicy::All)
        };

        assert!(check("<Contact><Email>a@b</Email></Contact>").is_clean());
        assert!(!check("<Contact><Email>a@b</Email><Phone>1</Phone></Contact>").is_clean());
        assert!(check("<Address><State>AZ</State><City>Tempe</City></Address>").is_clean());
        assert!(check("<Address><City>Tempe</City></Address>").is_clean());

        let report = check("<Address><State>AZ</State></Address>");
        assert_eq!(
            report.events[0].message,
            "The element 'Address' has incomplete content. List of possible elements expected: 'City'."
        );
    }

    #[test]
    fn test_all_group_lists_missing_members() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="Address">
            <xs:complexType>
              <xs:all>
                <xs:element name="City" type="xs:string"/>
                <xs:element name="State" type="xs:string"/>
                <xs:element name="Zip" type="xs:string" minOccurs="0"/>
              </xs:all>
            </xs:complexType>
          </xs:element>
        </xs:schema>"#;
        let schema = XsdSchema::from_string(xsd).unwrap();
        let doc = Document::from_string("<Address><City>A</City><City>B</City></Address>").unwrap();
        let report = validate_document(&schema, &doc, SeverityPolicy::All);
        assert_eq!(
            messages(&report),
            vec!["The element 'Address' has invalid child element 'City'. List of possible elements expected: 'State, Zip'."]
        );

        let doc = Document::from_string("<Address><Zip>1</Zip></Address>").unwrap();
        let report = validate_document(&schema, &doc, SeverityPolicy::All);
        assert_eq!(
            messages(&report),
            vec!["The element 'Address' has incomplete content. List of possible elements expected: 'City, State'."]
        );
    }

    #[test]
    fn test_nillable_and_fixed() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
          <xs:element name="Hotel">
            <xs:complexType>
              <xs:sequence>
                <xs:element name="Rating" type="xs:decimal" nillable="true"/>
                <xs:element name="Country" type="xs:string" fixed="US"/>
              </xs:sequence>
            </xs:complexType>
          </xs:element>
        </xs:schema>"#;
        let schema = XsdSchema::from_string(xsd).unwrap();
        let check = |xml: &str| {
            let doc = Document::from_string(xml).unwrap();
            validate_document(&schema, &doc, SeverityPolicy::All)
        };

        let ok = r#"<Hotel xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><Rating xsi:nil="true"/><Country>US</Country></Hotel>"#;
        assert!(check(ok).is_clean());

        let report = check("<Hotel><Rating>4</Rating><Country>CA</Country></Hotel>");
        assert_eq!(
            messages(&report),
            vec!["The value of the 'Country' element does not equal its fixed value."]
        );
    }

    #[test]
    fn test_extension_and_namespaces() {
        let xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"
              xmlns="urn:hotels" targetNamespace="urn:hotels" elementFormDefault="qualified">
          <xs:complexType name="placeType">
            <xs:sequence><xs:element name="Name" type="xs:string"/></xs:sequence>
          </xs:complexType>
          <xs:complexType name="hotelType">
            <xs:complexContent>
              <xs:extension base="placeType">
                <xs:sequence><xs:element name="Phone" type="xs:string"/></xs:sequence>
              </xs:extension>
            </xs:complexContent>
          </xs:complexType>
          <xs:element name="Hotel" type="hotelType"/>
        </xs:schema>"#;
        let schema = XsdSchema::from_string(xsd).unwrap();
        let check = |xml: &str| {
            let doc = Document::from_string(xml).unwrap();
            validate_document(&schema, &doc, SeverityPolicy::All)
        };

        assert!(check(r#"<Hotel xmlns="urn:hotels"><Name>Inn</Name><Phone>1</Phone></Hotel>"#).is_clean());

        let report = check(r#"<Hotel xmlns="urn:hotels"><Phone>1</Phone></Hotel>"#);
        assert_eq!(
            messages(&report),
            vec!["The element 'Hotel' in namespace 'urn:hotels' has invalid child element 'Phone' in namespace 'urn:hotels'. List of possible elements expected: 'Name' in namespace 'urn:hotels'."]
        );
    }
}
