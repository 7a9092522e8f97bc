//! XML name validation
//!
//! Checks for XML Names, NCNames and NMTOKENs. Used by the `Name`/`NCName`
//! family of built-in schema types and by the JSON-to-XML round trip, which
//! turns object keys back into element names.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

const NAME_START: &str = r"A-Z_a-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}\u{370}-\u{37D}\u{37F}-\u{1FFF}\u{200C}-\u{200D}\u{2070}-\u{218F}\u{2C00}-\u{2FEF}\u{3001}-\u{D7FF}\u{F900}-\u{FDCF}\u{FDF0}-\u{FFFD}";
const NAME_EXTRA: &str = r"\-\.0-9\u{B7}\u{300}-\u{36F}\u{203F}-\u{2040}";

static NCNAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^[{0}][{0}{1}]*$", NAME_START, NAME_EXTRA)).unwrap()
});

static NMTOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^[:{0}{1}]+$", NAME_START, NAME_EXTRA)).unwrap()
});

/// Check if a string is a valid NCName (non-colonized name)
pub fn is_valid_ncname(name: &str) -> bool {
    NCNAME.is_match(name)
}

/// Check if a string is a valid XML Name. Colons are allowed anywhere
/// but at the start.
pub fn is_valid_name(name: &str) -> bool {
    match name.split_once(':') {
        None => is_valid_ncname(name),
        Some((head, rest)) => {
            is_valid_ncname(head) && rest.split(':').all(|part| part.is_empty() || NMTOKEN.is_match(part))
        }
    }
}

/// Check if a string is a valid NMTOKEN
pub fn is_valid_nmtoken(name: &str) -> bool {
    NMTOKEN.is_match(name)
}

/// Check if a string is a valid QName (qualified name)
pub fn is_valid_qname(name: &str) -> bool {
    match name.split_once(':') {
        Some((prefix, local)) => is_valid_ncname(prefix) && is_valid_ncname(local),
        None => is_valid_ncname(name),
    }
}

/// Validate an XML Name and return an error if invalid
pub fn validate_name(name: &str) -> Result<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(Error::Name(format!("Invalid XML Name: '{}'", name)))
    }
}

/// Split a QName into prefix and local name
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = qname.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, qname)
    }
}
