//! XSD built-in types
//!
//! The built-in primitive and derived types a schema can name with the
//! `xs:` prefix, and the lexical checks for each.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use url::Url;

use super::facets::WhiteSpace;
use crate::names;

static TIMEZONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(Z|[+-](0\d|1[0-4]):[0-5]\d)$").unwrap());

static INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

static DECIMAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").unwrap());

static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?|[+-]?INF|NaN)$").unwrap()
});

static LANGUAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z]{1,8}(-[a-zA-Z0-9]{1,8})*$").unwrap());

static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?P(\d+Y)?(\d+M)?(\d+D)?(T(\d+H)?(\d+M)?(\d+(\.\d+)?S)?)?$").unwrap()
});

static GYEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d{4,}$").unwrap());

static GYEAR_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?\d{4,}-(0[1-9]|1[0-2])$").unwrap());

static HEX_BINARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9a-fA-F]{2})*$").unwrap());

/// Built-in simple types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    /// xs:anySimpleType, also used for xs:anyType text
    AnySimpleType,
    /// xs:string
    String,
    /// xs:normalizedString
    NormalizedString,
    /// xs:token
    Token,
    /// xs:language
    Language,
    /// xs:Name
    Name,
    /// xs:NCName, xs:ID, xs:IDREF, xs:ENTITY
    NCName,
    /// xs:NMTOKEN
    NmToken,
    /// xs:boolean
    Boolean,
    /// xs:decimal
    Decimal,
    /// xs:integer and its bounded derivations
    Integer(IntegerKind),
    /// xs:float
    Float,
    /// xs:double
    Double,
    /// xs:duration
    Duration,
    /// xs:dateTime
    DateTime,
    /// xs:date
    Date,
    /// xs:time
    Time,
    /// xs:gYear
    GYear,
    /// xs:gYearMonth
    GYearMonth,
    /// xs:hexBinary
    HexBinary,
    /// xs:base64Binary
    Base64Binary,
    /// xs:anyURI
    AnyUri,
    /// xs:QName
    QName,
}

/// The xs:integer family, distinguished by range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerKind {
    /// xs:integer
    Integer,
    /// xs:long
    Long,
    /// xs:int
    Int,
    /// xs:short
    Short,
    /// xs:byte
    Byte,
    /// xs:nonNegativeInteger
    NonNegative,
    /// xs:positiveInteger
    Positive,
    /// xs:nonPositiveInteger
    NonPositive,
    /// xs:negativeInteger
    Negative,
    /// xs:unsignedLong
    UnsignedLong,
    /// xs:unsignedInt
    UnsignedInt,
    /// xs:unsignedShort
    UnsignedShort,
    /// xs:unsignedByte
    UnsignedByte,
}

impl IntegerKind {
    fn bounds(&self) -> (Option<i128>, Option<i128>) {
        match self {
            IntegerKind::Integer => (None, None),
            IntegerKind::Long => (Some(i64::MIN as i128), Some(i64::MAX as i128)),
            IntegerKind::Int => (Some(i32::MIN as i128), Some(i32::MAX as i128)),
            IntegerKind::Short => (Some(i16::MIN as i128), Some(i16::MAX as i128)),
            IntegerKind::Byte => (Some(i8::MIN as i128), Some(i8::MAX as i128)),
            IntegerKind::NonNegative => (Some(0), None),
            IntegerKind::Positive => (Some(1), None),
            IntegerKind::NonPositive => (None, Some(0)),
            IntegerKind::Negative => (None, Some(-1)),
            IntegerKind::UnsignedLong => (Some(0), Some(u64::MAX as i128)),
            IntegerKind::UnsignedInt => (Some(0), Some(u32::MAX as i128)),
            IntegerKind::UnsignedShort => (Some(0), Some(u16::MAX as i128)),
            IntegerKind::UnsignedByte => (Some(0), Some(u8::MAX as i128)),
        }
    }
}

impl BuiltinType {
    /// Look up a built-in type by its local name in the XSD namespace
    pub fn from_local_name(name: &str) -> Option<Self> {
        use BuiltinType as B;
        use IntegerKind as I;

        let builtin = match name {
            "anyType" | "anySimpleType" | "anyAtomicType" => B::AnySimpleType,
            "string" => B::String,
            "normalizedString" => B::NormalizedString,
            "token" => B::Token,
            "language" => B::Language,
            "Name" => B::Name,
            "NCName" | "ID" | "IDREF" | "ENTITY" => B::NCName,
            "NMTOKEN" => B::NmToken,
            "boolean" => B::Boolean,
            "decimal" => B::Decimal,
            "integer" => B::Integer(I::Integer),
            "long" => B::Integer(I::Long),
            "int" => B::Integer(I::Int),
            "short" => B::Integer(I::Short),
            "byte" => B::Integer(I::Byte),
            "nonNegativeInteger" => B::Integer(I::NonNegative),
            "positiveInteger" => B::Integer(I::Positive),
            "nonPositiveInteger" => B::Integer(I::NonPositive),
            "negativeInteger" => B::Integer(I::Negative),
            "unsignedLong" => B::Integer(I::UnsignedLong),
            "unsignedInt" => B::Integer(I::UnsignedInt),
            "unsignedShort" => B::Integer(I::UnsignedShort),
            "unsignedByte" => B::Integer(I::UnsignedByte),
            "float" => B::Float,
            "double" => B::Double,
            "duration" => B::Duration,
            "dateTime" => B::DateTime,
            "date" => B::Date,
            "time" => B::Time,
            "gYear" => B::GYear,
            "gYearMonth" => B::GYearMonth,
            "hexBinary" => B::HexBinary,
            "base64Binary" => B::Base64Binary,
            "anyURI" => B::AnyUri,
            "QName" => B::QName,
            _ => return None,
        };
        Some(builtin)
    }

    /// The whiteSpace facet the type imposes
    pub fn white_space(&self) -> WhiteSpace {
        match self {
            BuiltinType::String | BuiltinType::AnySimpleType => WhiteSpace::Preserve,
            BuiltinType::NormalizedString => WhiteSpace::Replace,
            _ => WhiteSpace::Collapse,
        }
    }

    /// Whether values compare as numbers under min/max facets
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            BuiltinType::Decimal | BuiltinType::Integer(_) | BuiltinType::Float | BuiltinType::Double
        )
    }

    /// Check a whitespace-normalized lexical value. The error is the reason
    /// the value was rejected.
    pub fn validate(&self, value: &str) -> std::result::Result<(), String> {
        let ok = match self {
            BuiltinType::AnySimpleType | BuiltinType::String => true,
            BuiltinType::NormalizedString => !value.contains(['\t', '\n', '\r']),
            BuiltinType::Token => !value.contains(['\t', '\n', '\r']) && !value.contains("  "),
            BuiltinType::Language => LANGUAGE.is_match(value),
            BuiltinType::Name => names::is_valid_name(value),
            BuiltinType::NCName => names::is_valid_ncname(value),
            BuiltinType::NmToken => names::is_valid_nmtoken(value),
            BuiltinType::Boolean => matches!(value, "true" | "false" | "1" | "0"),
            BuiltinType::Decimal => parse_decimal(value).is_some(),
            BuiltinType::Integer(kind) => return validate_integer(value, *kind),
            BuiltinType::Float | BuiltinType::Double => FLOAT.is_match(value),
            BuiltinType::Duration => DURATION.is_match(value) && value.len() > 1 && !value.ends_with('T'),
            BuiltinType::DateTime => {
                let (local, _) = split_timezone(value);
                NaiveDateTime::parse_from_str(local, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
            }
            BuiltinType::Date => {
                let (local, _) = split_timezone(value);
                NaiveDate::parse_from_str(local, "%Y-%m-%d").is_ok()
            }
            BuiltinType::Time => {
                let (local, _) = split_timezone(value);
                NaiveTime::parse_from_str(local, "%H:%M:%S%.f").is_ok()
            }
            BuiltinType::GYear => GYEAR.is_match(split_timezone(value).0),
            BuiltinType::GYearMonth => GYEAR_MONTH.is_match(split_timezone(value).0),
            BuiltinType::HexBinary => HEX_BINARY.is_match(value),
            BuiltinType::Base64Binary => {
                let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
                STANDARD.decode(compact).is_ok()
            }
            BuiltinType::AnyUri => is_valid_uri(value),
            BuiltinType::QName => names::is_valid_qname(value),
        };

        if ok {
            Ok(())
        } else {
            Err(format!("The string '{}' is not a valid {} value.", value, self))
        }
    }
}

impl fmt::Display for BuiltinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuiltinType::AnySimpleType => "anySimpleType",
            BuiltinType::String => "string",
            BuiltinType::NormalizedString => "normalizedString",
            BuiltinType::Token => "token",
            BuiltinType::Language => "language",
            BuiltinType::Name => "Name",
            BuiltinType::NCName => "NCName",
            BuiltinType::NmToken => "NMTOKEN",
            BuiltinType::Boolean => "boolean",
            BuiltinType::Decimal => "decimal",
            BuiltinType::Integer(kind) => match kind {
                IntegerKind::Integer => "integer",
                IntegerKind::Long => "long",
                IntegerKind::Int => "int",
                IntegerKind::Short => "short",
                IntegerKind::Byte => "byte",
                IntegerKind::NonNegative => "nonNegativeInteger",
                IntegerKind::Positive => "positiveInteger",
                IntegerKind::NonPositive => "nonPositiveInteger",
                IntegerKind::Negative => "negativeInteger",
                IntegerKind::UnsignedLong => "unsignedLong",
                IntegerKind::UnsignedInt => "unsignedInt",
                IntegerKind::UnsignedShort => "unsignedShort",
                IntegerKind::UnsignedByte => "unsignedByte",
            },
            BuiltinType::Float => "float",
            BuiltinType::Double => "double",
            BuiltinType::Duration => "duration",
            BuiltinType::DateTime => "dateTime",
            BuiltinType::Date => "date",
            BuiltinType::Time => "time",
            BuiltinType::GYear => "gYear",
            BuiltinType::GYearMonth => "gYearMonth",
            BuiltinType::HexBinary => "hexBinary",
            BuiltinType::Base64Binary => "base64Binary",
            BuiltinType::AnyUri => "anyURI",
            BuiltinType::QName => "QName",
        };
        f.write_str(name)
    }
}

/// Parse an xs:decimal lexical value (no exponent allowed)
pub fn parse_decimal(value: &str) -> Option<Decimal> {
    if !DECIMAL.is_match(value) {
        return None;
    }
    let unsigned = value.strip_prefix('+').unwrap_or(value);
    Decimal::from_str(unsigned).ok()
}

fn validate_integer(value: &str, kind: IntegerKind) -> std::result::Result<(), String> {
    let kind_name = BuiltinType::Integer(kind).to_string();
    if !INTEGER.is_match(value) {
        return Err(format!("The string '{}' is not a valid {} value.", value, kind_name));
    }

    let (min, max) = kind.bounds();
    match value.strip_prefix('+').unwrap_or(value).parse::<i128>() {
        Ok(n) => {
            if min.map_or(false, |m| n < m) || max.map_or(false, |m| n > m) {
                Err(format!("Value '{}' was either too large or too small for {}.", value, kind_name))
            } else {
                Ok(())
            }
        }
        // Beyond i128: fine when the kind is unbounded on that side
        Err(_) if value.starts_with('-') && min.is_none() => Ok(()),
        Err(_) if !value.starts_with('-') && max.is_none() => Ok(()),
        Err(_) => Err(format!("Value '{}' was either too large or too small for {}.", value, kind_name)),
    }
}

fn split_timezone(value: &str) -> (&str, Option<&str>) {
    match TIMEZONE.find(value) {
        Some(m) => (&value[..m.start()], Some(m.as_str())),
        None => (value, None),
    }
}

fn is_valid_uri(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    if Url::parse(value).is_ok() {
        return true;
    }
    // Relative references resolve against any absolute base
    Url::parse("http://relative.invalid/")
        .and_then(|base| base.join(value))
        .is_ok()
}
