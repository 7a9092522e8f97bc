//! XSD constraining facets
//!
//! This module implements the facets a `xs:restriction` can put on a
//! simple type.

use regex::Regex;
use std::cmp::Ordering;

use super::builtins::parse_decimal;
use crate::error::{Error, ParseError, Result};

/// White space handling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhiteSpace {
    /// Preserve all white space
    Preserve,
    /// Replace tabs and newlines with spaces
    Replace,
    /// Replace and collapse multiple spaces
    Collapse,
}

impl WhiteSpace {
    /// Parse from the facet's `value` attribute
    pub fn from_name(s: &str) -> Result<Self> {
        match s {
            "preserve" => Ok(WhiteSpace::Preserve),
            "replace" => Ok(WhiteSpace::Replace),
            "collapse" => Ok(WhiteSpace::Collapse),
            _ => Err(Error::Value(format!(
                "Invalid whiteSpace value: '{}'. Must be 'preserve', 'replace', or 'collapse'",
                s
            ))),
        }
    }

    /// Normalize a string according to this white space mode
    pub fn normalize(&self, s: &str) -> String {
        match self {
            WhiteSpace::Preserve => s.to_string(),
            WhiteSpace::Replace => s.replace(['\t', '\n', '\r'], " "),
            WhiteSpace::Collapse => s.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

/// How a value is measured by length and range facets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Character data, length in characters
    Text,
    /// Number, ranges compare numerically
    Numeric,
    /// Whitespace-separated list, length in items
    List,
}

/// A `xs:pattern` facet compiled to an anchored regex
#[derive(Debug, Clone)]
pub struct XsdPattern {
    /// The pattern as written in the schema
    pub source: String,
    regex: Regex,
}

// Multi-character escapes XSD has and Rust regex does not
const NAME_CLASS_ESCAPES: [(&str, &str); 4] = [
    (r"\i", r"[_:A-Za-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}]"),
    (r"\I", r"[^_:A-Za-z\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}]"),
    (r"\c", r"[-._:A-Za-z0-9\u{B7}\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}]"),
    (r"\C", r"[^-._:A-Za-z0-9\u{B7}\u{C0}-\u{D6}\u{D8}-\u{F6}\u{F8}-\u{2FF}]"),
];

impl XsdPattern {
    /// Compile a schema pattern. XSD patterns always match the whole value.
    pub fn new(source: &str) -> Result<Self> {
        let mut translated = source.to_string();
        for (escape, class) in NAME_CLASS_ESCAPES {
            translated = translated.replace(escape, class);
        }

        let regex = Regex::new(&format!("^(?:{})$", translated)).map_err(|e| {
            ParseError::new(format!("Invalid pattern '{}': {}", source, e))
        })?;

        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// Check a value against the pattern
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Facets of one restriction step
#[derive(Debug, Clone, Default)]
pub struct Facets {
    /// Allowed values; empty means unrestricted
    pub enumeration: Vec<String>,
    /// Patterns of this step; a value must match at least one
    pub patterns: Vec<XsdPattern>,
    /// Exact length
    pub length: Option<usize>,
    /// Minimum length
    pub min_length: Option<usize>,
    /// Maximum length
    pub max_length: Option<usize>,
    /// Inclusive lower bound
    pub min_inclusive: Option<String>,
    /// Inclusive upper bound
    pub max_inclusive: Option<String>,
    /// Exclusive lower bound
    pub min_exclusive: Option<String>,
    /// Exclusive upper bound
    pub max_exclusive: Option<String>,
    /// Maximum number of significant digits
    pub total_digits: Option<u32>,
    /// Maximum number of fraction digits
    pub fraction_digits: Option<u32>,
    /// Whitespace normalization override
    pub white_space: Option<WhiteSpace>,
}

impl Facets {
    /// Record one facet element. Returns false if `name` is not a facet.
    pub fn set(&mut self, name: &str, value: &str) -> Result<bool> {
        let parse_len = |v: &str| -> Result<usize> {
            v.trim().parse::<usize>().map_err(|_| {
                ParseError::new(format!("Invalid {} value '{}'", name, v)).into()
            })
        };
        let parse_digits = |v: &str| -> Result<u32> {
            v.trim().parse::<u32>().map_err(|_| {
                ParseError::new(format!("Invalid {} value '{}'", name, v)).into()
            })
        };

        match name {
            "enumeration" => self.enumeration.push(value.to_string()),
            "pattern" => self.patterns.push(XsdPattern::new(value)?),
            "length" => self.length = Some(parse_len(value)?),
            "minLength" => self.min_length = Some(parse_len(value)?),
            "maxLength" => self.max_length = Some(parse_len(value)?),
            "minInclusive" => self.min_inclusive = Some(value.trim().to_string()),
            "maxInclusive" => self.max_inclusive = Some(value.trim().to_string()),
            "minExclusive" => self.min_exclusive = Some(value.trim().to_string()),
            "maxExclusive" => self.max_exclusive = Some(value.trim().to_string()),
            "totalDigits" => self.total_digits = Some(parse_digits(value)?),
            "fractionDigits" => self.fraction_digits = Some(parse_digits(value)?),
            "whiteSpace" => self.white_space = Some(WhiteSpace::from_name(value.trim())?),
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Check a normalized value against every facet of this step
    pub fn check(&self, value: &str, kind: ValueKind) -> std::result::Result<(), String> {
        if !self.enumeration.is_empty() && !self.enumeration.iter().any(|e| e == value) {
            return Err(format!(
                "The Enumeration constraint failed. Allowed values: {}.",
                self.enumeration
                    .iter()
                    .map(|e| format!("'{}'", e))
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        if !self.patterns.is_empty() && !self.patterns.iter().any(|p| p.is_match(value)) {
            return Err(format!(
                "The Pattern constraint failed. Expected pattern: '{}'.",
                self.patterns
                    .iter()
                    .map(|p| p.source.as_str())
                    .collect::<Vec<_>>()
                    .join("' or '")
            ));
        }

        let len = match kind {
            ValueKind::List => value.split_whitespace().count(),
            _ => value.chars().count(),
        };
        if let Some(expected) = self.length {
            if len != expected {
                return Err(format!("The actual length is not equal to the specified length {}.", expected));
            }
        }
        if let Some(min) = self.min_length {
            if len < min {
                return Err(format!("The actual length is less than the MinLength value {}.", min));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(format!("The actual length is greater than the MaxLength value {}.", max));
            }
        }

        let numeric = kind == ValueKind::Numeric;
        let bounds: [(&Option<String>, &str, &[Ordering]); 4] = [
            (&self.min_inclusive, "MinInclusive", &[Ordering::Less]),
            (&self.max_inclusive, "MaxInclusive", &[Ordering::Greater]),
            (&self.min_exclusive, "MinExclusive", &[Ordering::Less, Ordering::Equal]),
            (&self.max_exclusive, "MaxExclusive", &[Ordering::Greater, Ordering::Equal]),
        ];
        for (bound, facet, failing) in bounds {
            if let Some(bound) = bound {
                if let Some(ord) = compare(value, bound, numeric) {
                    if failing.contains(&ord) {
                        return Err(format!("The {} constraint failed. Bound: '{}'.", facet, bound));
                    }
                }
            }
        }

        if self.total_digits.is_some() || self.fraction_digits.is_some() {
            if let Some(number) = parse_decimal(value) {
                let normalized = number.normalize();
                let digits = normalized.mantissa().unsigned_abs().to_string();
                let fraction = normalized.scale();
                let total = (digits.trim_start_matches('0').len() as u32).max(fraction).max(1);
                if let Some(max) = self.total_digits {
                    if total > max {
                        return Err(format!("The TotalDigits constraint failed. Maximum: {}.", max));
                    }
                }
                if let Some(max) = self.fraction_digits {
                    if fraction > max {
                        return Err(format!("The FractionDigits constraint failed. Maximum: {}.", max));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Order `value` against a facet bound
fn compare(value: &str, bound: &str, numeric: bool) -> Option<Ordering> {
    if numeric {
        if let (Some(a), Some(b)) = (parse_decimal(value), parse_decimal(bound)) {
            return Some(a.cmp(&b));
        }
        let a = value.parse::<f64>().ok()?;
        let b = bound.parse::<f64>().ok()?;
        return a.partial_cmp(&b);
    }
    // ISO 8601 dates and times order lexically within one format
    if value.len() == bound.len() {
        Some(value.cmp(bound))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facets(pairs: &[(&str, &str)]) -> Facets {
        let mut facets = Facets::default();
        for (name, value) in pairs {
            assert!(facets.set(name, value).unwrap());
        }
        facets
    }

    #[test]
    fn test_white_space_normalize() {
        assert_eq!(WhiteSpace::Replace.normalize("a\tb\nc"), "a b c");
        assert_eq!(WhiteSpace::Collapse.normalize("  a \n  b  "), "a b");
        assert_eq!(WhiteSpace::Preserve.normalize(" a "), " a ");
    }

    #[test]
    fn test_enumeration() {
        let f = facets(&[("enumeration", "AZ"), ("enumeration", "CA")]);
        assert!(f.check("AZ", ValueKind::Text).is_ok());
        let err = f.check("TX", ValueKind::Text).unwrap_err();
        assert!(err.contains("Enumeration constraint failed"));
    }

    #[test]
    fn test_pattern_is_anchored() {
        let f = facets(&[("pattern", r"\d{3}-\d{3}-\d{4}")]);
        assert!(f.check("480-555-1234", ValueKind::Text).is_ok());
        assert!(f.check("x480-555-1234", ValueKind::Text).is_err());
        assert!(f.check("480-555-12345", ValueKind::Text).is_err());
    }

    #[test]
    fn test_pattern_name_escapes() {
        let f = facets(&[("pattern", r"\i\c*")]);
        assert!(f.check("Hotel_1", ValueKind::Text).is_ok());
        assert!(f.check("1Hotel", ValueKind::Text).is_err());
    }

    #[test]
    fn test_invalid_pattern_is_parse_error() {
        assert!(XsdPattern::new("(unclosed").is_err());
    }

    #[test]
    fn test_lengths() {
        let f = facets(&[("minLength", "5"), ("maxLength", "5")]);
        assert!(f.check("85281", ValueKind::Text).is_ok());
        assert!(f.check("8528", ValueKind::Text).is_err());

        let list = facets(&[("length", "2")]);
        assert!(list.check("a b", ValueKind::List).is_ok());
    }

    #[test]
    fn test_numeric_ranges() {
        let f = facets(&[("minInclusive", "0"), ("maxInclusive", "5")]);
        assert!(f.check("4.2", ValueKind::Numeric).is_ok());
        assert!(f.check("5", ValueKind::Numeric).is_ok());
        assert!(f.check("5.01", ValueKind::Numeric).is_err());

        let exclusive = facets(&[("minExclusive", "0")]);
        assert!(exclusive.check("0", ValueKind::Numeric).is_err());
        assert!(exclusive.check("1e-3", ValueKind::Numeric).is_ok());
    }

    #[test]
    fn test_digits() {
        let f = facets(&[("totalDigits", "3"), ("fractionDigits", "1")]);
        assert!(f.check("4.2", ValueKind::Numeric).is_ok());
        assert!(f.check("4.25", ValueKind::Numeric).is_err());
        assert!(f.check("1234", ValueKind::Numeric).is_err());
    }

    #[test]
    fn test_unknown_facet_is_not_recorded() {
        let mut f = Facets::default();
        assert!(!f.set("annotation", "").unwrap());
    }
}
