//! Hotel records to JSON
//!
//! Maps a `Hotels` document onto a fixed JSON shape:
//!
//! ```json
//! { "Hotels": { "Hotel": [ { "Name": "...", "Phone": ["..."],
//!   "Address": { "City": "..." }, "_Rating": "4.2" } ] } }
//! ```
//!
//! Fields that are missing or blank are left out rather than written as
//! null or empty values.

use serde::{Deserialize, Serialize};
use serde_json::ser::{PrettyFormatter, Serializer};
use tracing::{debug, info};

use super::base::ConverterConfig;
use super::roundtrip::check_round_trip;
use crate::documents::{Document, Element};
use crate::error::{Error, Result};
use crate::locations::Location;

/// Tag of the document root
pub const ROOT_TAG: &str = "Hotels";

/// Tag of one record
pub const RECORD_TAG: &str = "Hotel";

/// JSON key the rating is written under
pub const RATING_KEY: &str = "_Rating";

/// A converted hotels document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotels {
    /// The record container
    #[serde(rename = "Hotels")]
    pub hotels: HotelList,
}

/// Records under the root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotelList {
    /// Records in document order
    #[serde(rename = "Hotel", default)]
    pub hotel: Vec<Hotel>,
}

/// One hotel record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Hotel {
    /// Hotel name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Phone numbers in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phone: Vec<String>,
    /// Postal address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    /// Rating, kept as written
    #[serde(rename = "_Rating", default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
}

/// Postal address of a hotel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Address {
    /// Street number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Street name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    /// City
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Postal code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    /// Code of the nearest airport
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nearest_airport: Option<String>,
}

impl Address {
    /// Check whether no field is set
    pub fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.street.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.zip.is_none()
            && self.nearest_airport.is_none()
    }
}

/// Converts hotel documents to JSON text
#[derive(Debug, Clone, Default)]
pub struct HotelConverter {
    config: ConverterConfig,
}

impl HotelConverter {
    /// Create a converter with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a converter with the given configuration
    pub fn with_config(config: ConverterConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Load, map, serialize and round-trip check a document
    pub fn convert(&self, location: &Location) -> Result<String> {
        let loader = self.config.loader();
        let text = loader.load(location)?;
        let doc = Document::parse(&text, loader.limits())?;
        let json = self.convert_document(&doc)?;
        info!(source = %location, "document converted");
        Ok(json)
    }

    /// Map, serialize and round-trip check a parsed document
    pub fn convert_document(&self, doc: &Document) -> Result<String> {
        let hotels = self.to_hotels(doc)?;
        let json = self.to_json(&hotels)?;
        check_round_trip(&json)?;
        Ok(json)
    }

    /// Map a parsed document onto the record model
    pub fn to_hotels(&self, doc: &Document) -> Result<Hotels> {
        let root = doc
            .root()
            .filter(|root| root.prefixed_name == ROOT_TAG)
            .ok_or_else(|| Error::Data(format!("Root element must be '{}'.", ROOT_TAG)))?;

        let hotel: Vec<Hotel> = root
            .find_children(RECORD_TAG)
            .map(|record| self.to_hotel(record))
            .collect();
        if hotel.is_empty() {
            return Err(Error::Data(format!("No '{}' elements found.", RECORD_TAG)));
        }

        debug!(records = hotel.len(), "hotel records mapped");
        Ok(Hotels {
            hotels: HotelList { hotel },
        })
    }

    fn to_hotel(&self, record: &Element) -> Hotel {
        let rating = match record.find_child("Rating") {
            Some(rating) => trimmed(rating),
            None if self.config.rating_attribute() => record
                .get_attribute("Rating")
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            None => None,
        };

        Hotel {
            name: child_text(record, "Name"),
            phone: record
                .find_children("Phone")
                .filter_map(trimmed)
                .collect(),
            address: record.find_child("Address").map(to_address).filter(|a| !a.is_empty()),
            rating,
        }
    }

    /// Serialize with the configured indentation
    pub fn to_json(&self, hotels: &Hotels) -> Result<String> {
        let indent = vec![b' '; self.config.indent()];
        let mut buffer = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(&indent));
        hotels.serialize(&mut serializer)?;
        String::from_utf8(buffer).map_err(|e| Error::Data(e.to_string()))
    }
}

fn to_address(address: &Element) -> Address {
    Address {
        number: child_text(address, "Number"),
        street: child_text(address, "Street"),
        city: child_text(address, "City"),
        state: child_text(address, "State"),
        zip: child_text(address, "Zip"),
        nearest_airport: child_text(address, "NearestAirport"),
    }
}

/// Text of the element and its descendants, trimmed
fn trimmed(elem: &Element) -> Option<String> {
    elem.trimmed_inner_text()
}

/// Trimmed text of the first child with this tag
fn child_text(parent: &Element, tag: &str) -> Option<String> {
    parent.find_child(tag).and_then(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn convert(xml: &str) -> Result<Hotels> {
        let doc = Document::from_string(xml)?;
        HotelConverter::new().to_hotels(&doc)
    }

    #[test]
    fn test_full_record() {
        let hotels = convert(
            r#"<Hotels><Hotel>
                 <Name> Westin </Name>
                 <Phone>480-111</Phone><Phone>800-222</Phone>
                 <Address><Number>11</Number><Street>Main</Street><City>Tempe</City>
                   <State>AZ</State><Zip>85281</Zip><NearestAirport>PHX</NearestAirport></Address>
                 <Rating>4.2</Rating>
               </Hotel></Hotels>"#,
        )
        .unwrap();

        let hotel = &hotels.hotels.hotel[0];
        assert_eq!(hotel.name.as_deref(), Some("Westin"));
        assert_eq!(hotel.phone, vec!["480-111", "800-222"]);
        assert_eq!(hotel.rating.as_deref(), Some("4.2"));
        let address = hotel.address.as_ref().unwrap();
        assert_eq!(address.nearest_airport.as_deref(), Some("PHX"));
    }

    #[test]
    fn test_blank_fields_are_omitted() {
        let hotels = convert(
            r#"<Hotels><Hotel>
                 <Name>  </Name><Phone></Phone><Phone> </Phone>
                 <Address><City/></Address><Rating/>
               </Hotel></Hotels>"#,
        )
        .unwrap();
        assert_eq!(hotels.hotels.hotel[0], Hotel::default());
    }

    #[test]
    fn test_rating_attribute_ignored_by_default() {
        let xml = r#"<Hotels><Hotel Rating="4.2"><Name>Inn</Name></Hotel></Hotels>"#;
        let hotels = convert(xml).unwrap();
        assert_eq!(hotels.hotels.hotel[0].rating, None);
    }

    #[test]
    fn test_rating_attribute_fallback() {
        let converter =
            HotelConverter::with_config(ConverterConfig::new().with_rating_attribute(true));
        let to_rating = |xml: &str| {
            let doc = Document::from_string(xml).unwrap();
            converter.to_hotels(&doc).unwrap().hotels.hotel[0].rating.clone()
        };

        let xml = r#"<Hotels><Hotel Rating=" 3.5 "><Name>Inn</Name></Hotel></Hotels>"#;
        assert_eq!(to_rating(xml).as_deref(), Some("3.5"));

        // A Rating child wins, even when blank
        let xml = r#"<Hotels><Hotel Rating="3.5"><Name>Inn</Name><Rating/></Hotel></Hotels>"#;
        assert_eq!(to_rating(xml), None);
    }

    #[test]
    fn test_text_includes_descendants() {
        let xml = r#"<Hotels><Hotel><Name>West<b>in</b> Hotel</Name><Rating><v>4.2</v></Rating></Hotel></Hotels>"#;
        let hotel = &convert(xml).unwrap().hotels.hotel[0];
        assert_eq!(hotel.name.as_deref(), Some("Westin Hotel"));
        assert_eq!(hotel.rating.as_deref(), Some("4.2"));
    }

    #[test]
    fn test_wrong_root() {
        let err = convert("<Motels><Hotel/></Motels>").unwrap_err();
        assert_eq!(err.to_string(), "Root element must be 'Hotels'.");
    }

    #[test]
    fn test_no_records() {
        let err = convert("<Hotels><Motel/></Hotels>").unwrap_err();
        assert_eq!(err.to_string(), "No 'Hotel' elements found.");
    }

    #[test]
    fn test_json_shape_and_key_order() {
        let hotels = convert(
            r#"<Hotels><Hotel><Rating>4</Rating><Address><State>AZ</State><City>Tempe</City></Address>
                 <Name>Inn</Name></Hotel><Hotel/></Hotels>"#,
        )
        .unwrap();
        let json = HotelConverter::new().to_json(&hotels).unwrap();
        let expected = r#"{
  "Hotels": {
    "Hotel": [
      {
        "Name": "Inn",
        "Address": {
          "City": "Tempe",
          "State": "AZ"
        },
        "_Rating": "4"
      },
      {}
    ]
  }
}"#;
        assert_eq!(json, expected);
    }

    #[test]
    fn test_convert_document_round_trips() {
        let doc = Document::from_string(
            "<Hotels><Hotel><Name>Inn &amp; Suites</Name><Phone>1</Phone></Hotel></Hotels>",
        )
        .unwrap();
        let json = HotelConverter::new().convert_document(&doc).unwrap();
        let back: Hotels = serde_json::from_str(&json).unwrap();
        assert_eq!(back.hotels.hotel[0].name.as_deref(), Some("Inn & Suites"));
    }
}
