//! Resource location resolution
//!
//! This module handles resolution of resource locations (URLs, file paths,
//! inline text) for loading schemas and XML documents.

use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// Resource location - can be a URL, file path, or inline document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// File system path
    Path(PathBuf),
    /// URL (http or https)
    Url(Url),
    /// Inline document text
    String(String),
}

impl Location {
    /// Wrap inline document text
    pub fn inline(text: impl Into<String>) -> Self {
        Location::String(text.into())
    }

    /// Check if this is a remote location (URL)
    pub fn is_remote(&self) -> bool {
        matches!(self, Location::Url(_))
    }

    /// Check if this is a local file
    pub fn is_file(&self) -> bool {
        matches!(self, Location::Path(_))
    }
}

impl FromStr for Location {
    type Err = Error;

    /// Auto-detect the location kind. Text starting with `<` is inline XML,
    /// anything with a URL scheme is a URL, everything else is a path.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::Resource("Empty resource location".to_string()));
        }

        if trimmed.starts_with('<') {
            return Ok(Location::String(s.to_string()));
        }

        // A one-letter scheme is a Windows drive, not a URL
        if let Ok(url) = Url::parse(trimmed) {
            if url.scheme() == "file" {
                let path = url.to_file_path().map_err(|_| {
                    Error::Resource(format!("Invalid file URL: '{}'", trimmed))
                })?;
                return Ok(Location::Path(path));
            }
            if url.scheme().len() > 1 {
                return Ok(Location::Url(url));
            }
        }

        Ok(Location::Path(PathBuf::from(trimmed)))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Path(p) => write!(f, "{}", p.display()),
            Location::Url(u) => write!(f, "{}", u),
            Location::String(_) => write!(f, "<inline document>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_from_url() {
        let loc: Location = "https://example.com/Hotels.xsd".parse().unwrap();
        assert!(matches!(loc, Location::Url(_)));
        assert!(loc.is_remote());
    }

    #[test]
    fn test_location_from_path() {
        let loc: Location = "/tmp/Hotels.xml".parse().unwrap();
        assert!(matches!(loc, Location::Path(_)));
        assert!(loc.is_file());

        let relative: Location = "tests/fixtures/Hotels.xml".parse().unwrap();
        assert!(relative.is_file());
    }

    #[test]
    fn test_location_from_file_url() {
        let loc: Location = "file:///tmp/Hotels.xml".parse().unwrap();
        assert_eq!(loc, Location::Path(PathBuf::from("/tmp/Hotels.xml")));
    }

    #[test]
    fn test_location_from_inline_xml() {
        let loc: Location = "<Hotels/>".parse().unwrap();
        assert_eq!(loc, Location::inline("<Hotels/>"));
        assert_eq!(loc.to_string(), "<inline document>");
    }

    #[test]
    fn test_empty_location_is_rejected() {
        assert!("   ".parse::<Location>().is_err());
    }
}
