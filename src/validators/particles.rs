//! XSD Particle occurrence bounds
//!
//! Particles (elements and model groups inside a content model) carry
//! minOccurs/maxOccurs constraints.

use crate::error::{ParseError, Result};

/// Occurrence bounds for a particle (minOccurs, maxOccurs)
/// None for max means unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurs {
    /// Minimum number of occurrences (default 1)
    pub min: u32,
    /// Maximum number of occurrences (None = unbounded, default 1)
    pub max: Option<u32>,
}

impl Default for Occurs {
    fn default() -> Self {
        Self::once()
    }
}

impl Occurs {
    /// Create new occurrence bounds
    pub fn new(min: u32, max: Option<u32>) -> Self {
        Self { min, max }
    }

    /// Default occurrence (1, 1)
    pub fn once() -> Self {
        Self { min: 1, max: Some(1) }
    }

    /// Optional occurrence (0, 1)
    pub fn optional() -> Self {
        Self { min: 0, max: Some(1) }
    }

    /// Zero or more (0, unbounded)
    pub fn zero_or_more() -> Self {
        Self { min: 0, max: None }
    }

    /// Parse the `minOccurs`/`maxOccurs` attribute values
    pub fn parse(min: Option<&str>, max: Option<&str>) -> Result<Self> {
        let min = match min {
            Some(s) => s.trim().parse::<u32>().map_err(|_| {
                ParseError::new(format!("Invalid minOccurs value '{}'", s))
            })?,
            None => 1,
        };

        let max = match max.map(str::trim) {
            Some("unbounded") => None,
            Some(s) => Some(s.parse::<u32>().map_err(|_| {
                ParseError::new(format!("Invalid maxOccurs value '{}'", s))
            })?),
            None => Some(1),
        };

        if let Some(max) = max {
            if max < min {
                return Err(ParseError::new(format!(
                    "maxOccurs ({}) must not be less than minOccurs ({})",
                    max, min
                ))
                .into());
            }
        }

        Ok(Self { min, max })
    }

    /// Check if this particle can be empty (minOccurs == 0)
    pub fn is_emptiable(&self) -> bool {
        self.min == 0
    }

    /// Check whether `count` more occurrences would still be allowed
    pub fn allows(&self, count: u32) -> bool {
        self.max.map_or(true, |max| count <= max)
    }

    /// Check whether `count` occurrences satisfy the minimum
    pub fn is_satisfied(&self, count: u32) -> bool {
        count >= self.min
    }
}
