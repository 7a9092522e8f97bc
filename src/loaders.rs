//! Resource loading utilities
//!
//! This module handles loading of XML schemas and documents from files,
//! HTTP(S) URLs and inline text.

use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::locations::Location;
use reqwest::blocking::Client;
use std::fs;
use std::time::Duration;
use tracing::debug;

/// HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resource loader for schemas and documents
#[derive(Debug, Clone)]
pub struct Loader {
    /// Resource limits
    limits: Limits,
    /// Whether to allow remote resources
    allow_remote: bool,
    /// Timeout for remote requests
    timeout: Duration,
}

impl Loader {
    /// Create a new loader with default settings
    pub fn new() -> Self {
        Self {
            limits: Limits::default(),
            allow_remote: true,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Set the limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set whether to allow remote resources
    pub fn with_allow_remote(mut self, allow: bool) -> Self {
        self.allow_remote = allow;
        self
    }

    /// Set the timeout for remote requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Load a resource as a string
    pub fn load(&self, location: &Location) -> Result<String> {
        let content = match location {
            Location::Path(path) => fs::read_to_string(path).map_err(|e| {
                Error::Resource(format!("Failed to read file '{}': {}", path.display(), e))
            })?,
            Location::Url(url) => {
                if !self.allow_remote {
                    return Err(Error::Resource(
                        "Remote resources are not allowed".to_string(),
                    ));
                }

                debug!(%url, "fetching remote resource");
                let client = Client::builder().timeout(self.timeout).build()?;
                let response = client
                    .get(url.clone())
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| Error::Resource(format!("Failed to fetch '{}': {}", url, e)))?;
                response.text()?
            }
            Location::String(s) => s.clone(),
        };

        self.limits.check_xml_size(content.len())?;
        debug!(%location, bytes = content.len(), "loaded resource");

        Ok(content)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
