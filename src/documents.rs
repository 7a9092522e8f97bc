//! XML document handling
//!
//! Instance documents and schema documents are both read into this tree.
//! Each element remembers where its start tag sits in the source so that
//! validation messages can point at it.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use std::collections::HashMap;

/// `<!ENTITY name "value">` in an internal DTD subset; parameter entities are skipped
static ENTITY_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<!ENTITY\s+([^\s%"'>]+)\s+(?:"([^"]*)"|'([^']*)')\s*>"#).unwrap()
});

const UNSUPPORTED_ENTITIES: &str =
    "only predefined, character and internal DTD entities are supported";

/// Internal general entities declared in the document type declaration
type Entities = HashMap<String, String>;

/// Line and column of a point in the source text, both 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    /// Line number
    pub line: usize,
    /// Column number, counted in characters
    pub column: usize,
}

impl TextPosition {
    /// Create a new position
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Maps byte offsets of a source text to line/column positions
#[derive(Debug)]
struct LineIndex<'a> {
    source: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(source: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { source, line_starts }
    }

    fn position(&self, offset: usize) -> TextPosition {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = self.line_starts[line];
        let column = self
            .source
            .get(start..offset)
            .map(|s| s.chars().count())
            .unwrap_or(offset - start);
        TextPosition::new(line + 1, column + 1)
    }
}

/// XML Element in the document tree
#[derive(Debug, Clone)]
pub struct Element {
    /// Element qualified name
    pub qname: QName,
    /// Element name as written, including any prefix
    pub prefixed_name: String,
    /// Element attributes in document order, namespace declarations excluded
    pub attributes: IndexMap<QName, String>,
    /// Concatenated character data of this element (not of descendants)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<Element>,
    /// Namespaces in scope for this element
    pub namespaces: NamespaceContext,
    /// Position of the element name in the start tag
    pub position: Option<TextPosition>,
    /// Position of the element name in the end tag; the start tag's for empty elements
    pub end_position: Option<TextPosition>,
    /// Text runs and children interleaved as in the source
    content: Vec<Content>,
}

/// One piece of mixed content; children are indexes into `Element::children`
#[derive(Debug, Clone)]
enum Content {
    Text(String),
    Child(usize),
}

impl Element {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            prefixed_name: qname.local_name.clone(),
            qname,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
            namespaces: NamespaceContext::new(),
            position: None,
            end_position: None,
            content: Vec::new(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an attribute value by local name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| qname.local_name == name && qname.namespace.is_none())
            .map(|(_, value)| value.as_str())
    }

    /// Get an attribute value by qualified name
    pub fn get_attribute_qname(&self, qname: &QName) -> Option<&str> {
        self.attributes.get(qname).map(|s| s.as_str())
    }

    /// Add a child element
    pub fn add_child(&mut self, child: Element) {
        self.content.push(Content::Child(self.children.len()));
        self.children.push(child);
    }

    /// Append character data
    pub fn push_text(&mut self, text: &str) {
        match self.content.last_mut() {
            Some(Content::Text(run)) => run.push_str(text),
            _ => self.content.push(Content::Text(text.to_string())),
        }
        match self.text {
            Some(ref mut existing) => existing.push_str(text),
            None => self.text = Some(text.to_string()),
        }
    }

    /// Text content with surrounding whitespace removed; None when blank
    pub fn trimmed_text(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    /// Check whether the element carries any non-whitespace text
    pub fn has_text(&self) -> bool {
        self.trimmed_text().is_some()
    }

    /// Text of this element and all its descendants, in document order
    pub fn inner_text(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for segment in &self.content {
            match segment {
                Content::Text(text) => out.push_str(text),
                Content::Child(index) => {
                    if let Some(child) = self.children.get(*index) {
                        child.collect_text(out);
                    }
                }
            }
        }
    }

    /// Inner text with surrounding whitespace removed; None when blank
    pub fn trimmed_inner_text(&self) -> Option<String> {
        let text = self.inner_text();
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Find child elements by local name
    pub fn find_children<'a>(&'a self, local_name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children
            .iter()
            .filter(move |e| e.local_name() == local_name)
    }

    /// Find the first child element with the given local name
    pub fn find_child(&self, local_name: &str) -> Option<&Element> {
        self.children.iter().find(|e| e.local_name() == local_name)
    }
}

/// XML Document representation
#[derive(Debug)]
pub struct Document {
    /// Root element of the document
    pub root: Option<Element>,
}

impl Document {
    /// Parse an XML document from a string with default limits
    pub fn from_string(xml: &str) -> Result<Self> {
        Self::parse(xml, &Limits::default())
    }

    /// Parse an XML document from a string
    pub fn parse(xml: &str, limits: &Limits) -> Result<Self> {
        let index = LineIndex::new(xml);
        let mut reader = Reader::from_str(xml);

        let mut root: Option<Element> = None;
        let mut element_stack: Vec<Element> = Vec::new();
        let mut entities = Entities::new();

        loop {
            let offset = reader.buffer_position();
            let event = reader.read_event().map_err(|e| {
                let pos = index.position(reader.buffer_position());
                Error::Xml(format!("{} (Line {}, Position {})", e, pos.line, pos.column))
            })?;

            match event {
                Event::Start(e) => {
                    let element = Self::open_element(&e, &element_stack, &entities, &index, offset, limits)?;
                    element_stack.push(element);
                }
                Event::Empty(e) => {
                    let mut element = Self::open_element(&e, &element_stack, &entities, &index, offset, limits)?;
                    element.end_position = element.position;
                    Self::close_element(element, &mut element_stack, &mut root, &index, offset)?;
                }
                Event::End(_) => {
                    if let Some(mut current) = element_stack.pop() {
                        // Skip "</" to land on the name
                        current.end_position = Some(index.position(tag_start(index.source, offset) + 2));
                        Self::close_element(current, &mut element_stack, &mut root, &index, offset)?;
                    }
                }
                Event::Text(e) => {
                    let text = e
                        .unescape_with(|name| entities.get(name).map(String::as_str))
                        .map_err(|e| {
                            let pos = index.position(offset);
                            Error::Xml(format!(
                                "Failed to unescape text: {}; {} (Line {}, Position {})",
                                e, UNSUPPORTED_ENTITIES, pos.line, pos.column
                            ))
                        })?;
                    match element_stack.last_mut() {
                        Some(current) => current.push_text(&text),
                        None if !text.trim().is_empty() => {
                            let pos = index.position(offset);
                            return Err(Error::Xml(format!(
                                "Data at the root level is invalid (Line {}, Position {})",
                                pos.line, pos.column
                            )));
                        }
                        None => {}
                    }
                }
                Event::CData(e) => {
                    if let Some(current) = element_stack.last_mut() {
                        let text = std::str::from_utf8(&e)
                            .map_err(|e| Error::Xml(format!("Invalid CDATA section: {}", e)))?;
                        current.push_text(text);
                    }
                }
                Event::DocType(e) => {
                    let declaration = std::str::from_utf8(&e)
                        .map_err(|e| Error::Xml(format!("Invalid document type declaration: {}", e)))?;
                    entities.extend(parse_entities(declaration));
                }
                Event::Eof => break,
                _ => {} // Comments, processing instructions, declarations
            }
        }

        if let Some(open) = element_stack.last() {
            return Err(Error::Xml(format!(
                "Unexpected end of file: element '{}' is not closed",
                open.prefixed_name
            )));
        }

        if root.is_none() {
            return Err(Error::Xml("Root element is missing".to_string()));
        }

        Ok(Document { root })
    }

    /// Build an element from a start tag, resolving its namespaces
    fn open_element(
        start: &BytesStart,
        stack: &[Element],
        entities: &Entities,
        index: &LineIndex,
        offset: usize,
        limits: &Limits,
    ) -> Result<Element> {
        limits.check_xml_depth(stack.len() + 1)?;

        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| Error::Xml(format!("Invalid element name: {}", e)))?
            .to_string();

        let mut namespaces = stack
            .last()
            .map(|parent| parent.namespaces.clone())
            .unwrap_or_default();

        let mut raw_attributes = Vec::new();
        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| Error::Xml(format!("Failed to parse attribute: {}", e)))?;

            let attr_name = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| Error::Xml(format!("Invalid attribute name: {}", e)))?
                .to_string();

            let attr_value = attr
                .unescape_value_with(|name| entities.get(name).map(String::as_str))
                .map_err(|e| {
                    Error::Xml(format!(
                        "Failed to unescape attribute value: {}; {}",
                        e, UNSUPPORTED_ENTITIES
                    ))
                })?
                .to_string();

            // Namespace declarations apply to the element itself, so collect first
            if attr_name == "xmlns" {
                namespaces.set_default_namespace(attr_value);
            } else if let Some(prefix) = attr_name.strip_prefix("xmlns:") {
                namespaces.add_prefix(prefix, attr_value);
            } else {
                raw_attributes.push((attr_name, attr_value));
            }
        }
        limits.check_attributes(raw_attributes.len())?;

        let mut element = Element::new(namespaces.resolve(&name)?);
        element.prefixed_name = name;
        for (attr_name, attr_value) in raw_attributes {
            let qname = namespaces.resolve_attribute(&attr_name)?;
            element.attributes.insert(qname, attr_value);
        }
        element.namespaces = namespaces;

        // The offset is at '<'; point at the name like other XML tools do
        element.position = Some(index.position(tag_start(index.source, offset) + 1));

        Ok(element)
    }

    fn close_element(
        element: Element,
        stack: &mut [Element],
        root: &mut Option<Element>,
        index: &LineIndex,
        offset: usize,
    ) -> Result<()> {
        if let Some(parent) = stack.last_mut() {
            parent.add_child(element);
        } else if root.is_some() {
            let pos = index.position(offset);
            return Err(Error::Xml(format!(
                "There are multiple root elements (Line {}, Position {})",
                pos.line, pos.column
            )));
        } else {
            *root = Some(element);
        }
        Ok(())
    }

    /// Get the root element
    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }
}

/// Internal general entities of a document type declaration.
/// Replacement text is taken literally.
fn parse_entities(declaration: &str) -> Entities {
    ENTITY_DECL
        .captures_iter(declaration)
        .filter_map(|caps| {
            let value = caps.get(2).or_else(|| caps.get(3))?;
            Some((caps[1].to_string(), value.as_str().to_string()))
        })
        .collect()
}

/// Skip whitespace the reader may have left before a tag
fn tag_start(source: &str, offset: usize) -> usize {
    source
        .get(offset..)
        .and_then(|rest| rest.find('<'))
        .map(|i| offset + i)
        .unwrap_or(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::XSI_NAMESPACE;

    #[test]
    fn test_parse_simple_xml() {
        let xml = r#"<Hotels><Hotel><Name>Westin</Name></Hotel></Hotels>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert_eq!(root.local_name(), "Hotels");
        assert_eq!(root.children.len(), 1);
        let name = root.children[0].find_child("Name").unwrap();
        assert_eq!(name.text.as_deref(), Some("Westin"));
    }

    #[test]
    fn test_text_is_kept_raw_and_trimmed_on_request() {
        let xml = "<Name>\n   Hilton  \n</Name>";
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert_eq!(root.text.as_deref(), Some("\n   Hilton  \n"));
        assert_eq!(root.trimmed_text(), Some("Hilton"));
    }

    #[test]
    fn test_entities_and_cdata_are_text() {
        let xml = "<Street>Main &amp; 1st<![CDATA[ <north>]]></Street>";
        let doc = Document::from_string(xml).unwrap();

        assert_eq!(doc.root().unwrap().text.as_deref(), Some("Main & 1st <north>"));
    }

    #[test]
    fn test_parse_with_attributes_in_order() {
        let xml = r#"<Hotel Rating="4.2" Stars="5"><Name/></Hotel>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert_eq!(root.get_attribute("Rating"), Some("4.2"));
        let names: Vec<_> = root.attributes.keys().map(|q| q.local_name.as_str()).collect();
        assert_eq!(names, vec!["Rating", "Stars"]);
    }

    #[test]
    fn test_parse_with_namespaces() {
        let xml = r#"<h:Hotels xmlns:h="urn:hotels" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="Hotels.xsd"><h:Hotel/></h:Hotels>"#;
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert_eq!(root.namespace(), Some("urn:hotels"));
        assert_eq!(root.prefixed_name, "h:Hotels");
        assert_eq!(root.children[0].namespace(), Some("urn:hotels"));

        let loc = QName::namespaced(XSI_NAMESPACE, "noNamespaceSchemaLocation");
        assert_eq!(root.get_attribute_qname(&loc), Some("Hotels.xsd"));
        assert_eq!(root.attributes.len(), 1);
    }

    #[test]
    fn test_inner_text_follows_document_order() {
        let doc = Document::from_string("<Name>West<b>in</b> <i>Ho<u>t</u>el</i></Name>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.inner_text(), "Westin Hotel");
        assert_eq!(root.text.as_deref(), Some("West "));

        let doc = Document::from_string("<Rating> <v> </v> </Rating>").unwrap();
        assert_eq!(doc.root().unwrap().trimmed_inner_text(), None);
    }

    #[test]
    fn test_internal_entities_are_expanded() {
        let xml = r#"<!DOCTYPE Hotels [
  <!ENTITY w "Westin">
  <!ENTITY city 'Tempe'>
]>
<Hotels City="&city;"><Name>&w; &amp; Co</Name></Hotels>"#;
        let doc = Document::from_string(xml).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.get_attribute("City"), Some("Tempe"));
        assert_eq!(root.inner_text(), "Westin & Co");
    }

    #[test]
    fn test_unknown_entity_is_reported() {
        let err = Document::from_string("<Hotels>&w;</Hotels>").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("internal DTD entities are supported"), "{}", message);
        assert!(message.contains("(Line 1, Position 9)"), "{}", message);
    }

    #[test]
    fn test_positions_point_at_element_names() {
        let xml = "<Hotels>\n  <Hotel>\n    <Name>A</Name>\n  </Hotel>\n</Hotels>";
        let doc = Document::from_string(xml).unwrap();

        let root = doc.root().unwrap();
        assert_eq!(root.position, Some(TextPosition::new(1, 2)));
        let hotel = &root.children[0];
        assert_eq!(hotel.position, Some(TextPosition::new(2, 4)));
        assert_eq!(hotel.children[0].position, Some(TextPosition::new(3, 6)));
        assert_eq!(hotel.end_position, Some(TextPosition::new(4, 5)));
        assert_eq!(root.end_position, Some(TextPosition::new(5, 3)));

        let doc = Document::from_string("<Hotels>
  <Hotel/>
</Hotels>").unwrap();
        let hotel = &doc.root().unwrap().children[0];
        assert_eq!(hotel.end_position, hotel.position);
    }

    #[test]
    fn test_mismatched_tags_fail() {
        let err = Document::from_string("<Hotels><Hotel></Hotels>").unwrap_err();
        assert!(matches!(err, Error::Xml(_)));
    }

    #[test]
    fn test_unclosed_root_fails() {
        let err = Document::from_string("<Hotels><Hotel/>").unwrap_err();
        assert!(err.to_string().contains("not closed"));
    }

    #[test]
    fn test_empty_document_fails() {
        let err = Document::from_string("   ").unwrap_err();
        assert!(err.to_string().contains("Root element is missing"));
    }

    #[test]
    fn test_multiple_roots_fail() {
        let err = Document::from_string("<Hotels/><Hotels/>").unwrap_err();
        assert!(err.to_string().contains("multiple root elements"));
    }

    #[test]
    fn test_depth_limit() {
        let mut limits = Limits::default();
        limits.max_xml_depth = 2;
        let err = Document::parse("<a><b><c/></b></a>", &limits).unwrap_err();
        assert!(matches!(err, Error::LimitExceeded(_)));
    }
}
