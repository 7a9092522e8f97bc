//! Conversion of hotel documents to JSON

use std::io::Write;
use std::path::PathBuf;

use hotel_xml::converters::{json_to_xml, Address, Hotel};
use hotel_xml::{xml_to_json, xml_to_json_with, ConverterConfig, HotelConverter, Hotels, Location};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::Value;

fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path.to_string_lossy().into_owned()
}

fn address(number: &str, street: &str, city: &str, zip: &str) -> Address {
    Address {
        number: Some(number.to_string()),
        street: Some(street.to_string()),
        city: Some(city.to_string()),
        state: Some("AZ".to_string()),
        zip: Some(zip.to_string()),
        nearest_airport: Some("PHX".to_string()),
    }
}

#[test]
fn test_fixture_converts_to_records() {
    let json = xml_to_json(&fixture("Hotels.xml"));
    let hotels: Hotels = serde_json::from_str(&json).unwrap();

    let expected = vec![
        Hotel {
            name: Some("Westin".to_string()),
            phone: vec!["480-968-8885".to_string(), "800-937-8461".to_string()],
            address: Some(address("11", "E 7th St", "Tempe", "85281")),
            rating: Some("4.2".to_string()),
        },
        Hotel {
            name: Some("Hilton Garden Inn".to_string()),
            phone: vec!["480-966-2800".to_string()],
            address: Some(address("7200", "S Price Rd", "Chandler", "85226")),
            rating: None,
        },
        Hotel {
            name: Some("Hyatt Regency".to_string()),
            phone: vec!["602-252-1234".to_string()],
            address: Some(address("122", "N 2nd St", "Phoenix", "85004")),
            rating: Some("4.5".to_string()),
        },
    ];
    assert_eq!(hotels.hotels.hotel, expected);
}

#[test]
fn test_fixture_json_shape() {
    let json = xml_to_json(&fixture("Hotels.xml"));
    let value: Value = serde_json::from_str(&json).unwrap();

    let records = value["Hotels"]["Hotel"].as_array().unwrap();
    assert_eq!(records.len(), 3);

    let keys: Vec<&str> = records[0].as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Name", "Phone", "Address", "_Rating"]);

    let address_keys: Vec<&str> = records[0]["Address"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(
        address_keys,
        vec!["Number", "Street", "City", "State", "Zip", "NearestAirport"]
    );

    // No rating, no key
    assert!(records[1].get("_Rating").is_none());
    // A single phone is still a list
    assert_eq!(records[1]["Phone"], serde_json::json!(["480-966-2800"]));
}

#[test]
fn test_fixture_json_round_trips_to_xml() {
    let json = xml_to_json(&fixture("Hotels.xml"));
    let xml = json_to_xml(&json).unwrap();

    let doc = roxmltree::Document::parse(&xml).unwrap();
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "Hotels");
    let records: Vec<_> = root.children().filter(|n| n.has_tag_name("Hotel")).collect();
    assert_eq!(records.len(), 3);
    let phones = records[0].children().filter(|n| n.has_tag_name("Phone")).count();
    assert_eq!(phones, 2);
    assert!(records[0].children().any(|n| n.has_tag_name("_Rating")));
}

#[test]
fn test_blank_fields_are_omitted() {
    let xml = r#"<Hotels>
      <Hotel>
        <Name>  </Name>
        <Phone>555-000-1111</Phone>
        <Phone></Phone>
        <Address><City> Mesa </City><Zip/></Address>
        <Rating> </Rating>
      </Hotel>
      <Hotel><Address><Street>  </Street></Address></Hotel>
    </Hotels>"#;
    let json = xml_to_json(xml);
    let value: Value = serde_json::from_str(&json).unwrap();

    assert_eq!(
        value,
        serde_json::json!({
            "Hotels": {
                "Hotel": [
                    { "Phone": ["555-000-1111"], "Address": { "City": "Mesa" } },
                    {}
                ]
            }
        })
    );
}

#[test]
fn test_rating_comes_from_the_element() {
    let xml = r#"<Hotels><Hotel Rating="4.2"><Name>Inn</Name></Hotel></Hotels>"#;
    assert!(!xml_to_json(xml).contains("_Rating"));

    let config = ConverterConfig::new().with_rating_attribute(true);
    assert!(xml_to_json_with(xml, &config).contains("\"_Rating\": \"4.2\""));

    // The child element wins over the attribute
    let xml = r#"<Hotels><Hotel Rating="1"><Rating>2</Rating></Hotel></Hotels>"#;
    assert!(xml_to_json_with(xml, &config).contains("\"_Rating\": \"2\""));
}

#[test]
fn test_nested_markup_keeps_its_text() {
    let xml = r#"<Hotels><Hotel><Name>West<b>in</b> Hotel</Name><Rating><v>4.2</v></Rating></Hotel></Hotels>"#;
    let value: Value = serde_json::from_str(&xml_to_json(xml)).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "Hotels": { "Hotel": [ { "Name": "Westin Hotel", "_Rating": "4.2" } ] } })
    );
}

#[test]
fn test_indentation_is_configurable() {
    let xml = r#"<Hotels><Hotel><Name>Inn</Name></Hotel></Hotels>"#;
    let json = xml_to_json_with(xml, &ConverterConfig::new().with_indent(4));
    assert!(json.starts_with("{\n    \"Hotels\": {\n        \"Hotel\": ["), "{}", json);
}

#[test]
fn test_errors_become_messages() {
    assert_eq!(xml_to_json("<Motels><Hotel/></Motels>"), "Root element must be 'Hotels'.");
    assert_eq!(xml_to_json("<Hotels><Motel/></Hotels>"), "No 'Hotel' elements found.");

    let message = xml_to_json("<Hotels><Hotel></Hotels>");
    assert!(!message.starts_with('{'), "{}", message);

    let message = xml_to_json(&fixture("Missing.xml"));
    assert!(!message.starts_with('{'), "{}", message);
}

#[test]
fn test_only_direct_records_are_converted() {
    let xml = r#"<Hotels><Group><Hotel><Name>Nested</Name></Hotel></Group><Hotel><Name>Top</Name></Hotel></Hotels>"#;
    let json = xml_to_json(xml);
    assert!(json.contains("Top"));
    assert!(!json.contains("Nested"));
}

#[test]
fn test_convert_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "<?xml version=\"1.0\"?>\n<Hotels><Hotel><Name>Motel &amp; Suites</Name></Hotel></Hotels>"
    )
    .unwrap();

    let location = Location::Path(file.path().to_path_buf());
    let json = HotelConverter::new().convert(&location).unwrap();
    let hotels: Hotels = serde_json::from_str(&json).unwrap();
    assert_eq!(hotels.hotels.hotel[0].name.as_deref(), Some("Motel & Suites"));
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

proptest! {
    #[test]
    fn prop_text_is_trimmed_and_blank_is_dropped(
        name in "[ A-Za-z0-9&<>'-]{0,16}",
        phones in prop::collection::vec("[ 0-9-]{0,12}", 0..4),
    ) {
        let mut xml = format!("<Hotels><Hotel><Name>{}</Name>", escape(&name));
        for phone in &phones {
            xml.push_str(&format!("<Phone>{}</Phone>", phone));
        }
        xml.push_str("</Hotel></Hotels>");

        let json = xml_to_json(&xml);
        let hotels: Hotels = serde_json::from_str(&json).unwrap();
        let hotel = &hotels.hotels.hotel[0];

        let expected_name = Some(name.trim()).filter(|n| !n.is_empty()).map(str::to_string);
        prop_assert_eq!(&hotel.name, &expected_name);

        let expected_phones: Vec<String> = phones
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();
        prop_assert_eq!(&hotel.phone, &expected_phones);

        prop_assert!(json_to_xml(&json).is_ok());
    }
}
