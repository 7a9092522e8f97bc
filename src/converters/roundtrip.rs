//! JSON back to XML
//!
//! The converter's output must turn back into a well-formed XML document
//! under the usual JSON-to-XML mapping:
//!
//! - the top-level object has exactly one property, which names the root
//! - `@name` properties become attributes, `#text` becomes character data
//! - arrays repeat the element once per item, `null` gives an empty element
//! - every other key must be a valid XML name

use std::io::Cursor;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::names::validate_name;

const ATTRIBUTE_PREFIX: char = '@';
const TEXT_KEY: &str = "#text";

/// Rebuild an XML document from JSON text
pub fn json_to_xml(json: &str) -> Result<String> {
    let value: Value = serde_json::from_str(json)?;
    let root = match &value {
        Value::Object(map) if map.len() == 1 => map,
        Value::Object(_) => {
            return Err(Error::Data(
                "JSON root object has multiple properties. The root object must have a single property in order to create a valid XML document.".to_string(),
            ))
        }
        _ => return Err(Error::Data("JSON root must be an object.".to_string())),
    };

    let mut writer = Writer::new(Cursor::new(Vec::new()));
    for (name, value) in root {
        if matches!(value, Value::Array(_)) {
            return Err(Error::Data(format!(
                "The root property '{}' cannot be an array.",
                name
            )));
        }
        write_property(&mut writer, name, value)?;
    }

    String::from_utf8(writer.into_inner().into_inner()).map_err(|e| Error::Xml(e.to_string()))
}

/// Check that JSON text survives conversion back to XML
pub fn check_round_trip(json: &str) -> Result<()> {
    let xml = json_to_xml(json)?;
    let doc = roxmltree::Document::parse(&xml)
        .map_err(|e| Error::Xml(format!("Round trip produced malformed XML: {}", e)))?;
    debug!(
        root = doc.root_element().tag_name().name(),
        bytes = xml.len(),
        "round trip succeeded"
    );
    Ok(())
}

fn write_property(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, value: &Value) -> Result<()> {
    match value {
        Value::Array(items) => {
            for item in items {
                if matches!(item, Value::Array(_)) {
                    return Err(Error::Data(format!(
                        "Nested arrays are not supported under '{}'.",
                        name
                    )));
                }
                write_property(writer, name, item)?;
            }
            Ok(())
        }
        Value::Object(map) => write_element(writer, name, map),
        Value::Null => {
            validate_name(name)?;
            write(writer, Event::Empty(BytesStart::new(name)))
        }
        scalar => {
            validate_name(name)?;
            let text = scalar_text(scalar).unwrap_or_default();
            write(writer, Event::Start(BytesStart::new(name)))?;
            write(writer, Event::Text(BytesText::new(&text)))?;
            write(writer, Event::End(BytesEnd::new(name)))
        }
    }
}

fn write_element(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    name: &str,
    map: &Map<String, Value>,
) -> Result<()> {
    validate_name(name)?;

    let mut start = BytesStart::new(name);
    let mut text = None;
    let mut children = Vec::new();
    for (key, value) in map {
        if let Some(attribute) = key.strip_prefix(ATTRIBUTE_PREFIX) {
            validate_name(attribute)?;
            let value = scalar_text(value).ok_or_else(|| {
                Error::Data(format!("Attribute '{}' must have a simple value.", attribute))
            })?;
            start.push_attribute((attribute, value.as_str()));
        } else if key == TEXT_KEY {
            text = scalar_text(value);
        } else {
            children.push((key, value));
        }
    }

    if text.is_none() && children.is_empty() {
        return write(writer, Event::Empty(start));
    }

    write(writer, Event::Start(start))?;
    if let Some(text) = text {
        write(writer, Event::Text(BytesText::new(&text)))?;
    }
    for (key, value) in children {
        write_property(writer, key, value)?;
    }
    write(writer, Event::End(BytesEnd::new(name)))
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some(String::new()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn write(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| Error::Xml(format!("Failed to write XML: {}", e)))
}
