//! XML to JSON Converters
//!
//! This module maps hotel documents to their JSON form and checks that the
//! JSON can be turned back into XML.

mod base;
mod hotels;
mod roundtrip;

pub use base::ConverterConfig;
pub use hotels::{
    Address, Hotel, HotelConverter, HotelList, Hotels, RATING_KEY, RECORD_TAG, ROOT_TAG,
};
pub use roundtrip::{check_round_trip, json_to_xml};
