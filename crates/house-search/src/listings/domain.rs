use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier of a listing within the store namespace (the part after `listings/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingKey(pub String);

impl ListingKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scraped listing as written by the ingestion process. Every attribute is
/// optional because upstream pages are inconsistent; a value of the wrong
/// shape reads as text or as `None` instead of rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, alias = "lat", deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "long", alias = "lng", deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bedrooms: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bathrooms: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub lot_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub photo: Option<String>,
}

/// Strings pass through, scalars are rendered as text, anything else is `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// Numbers pass through, numeric strings are parsed, anything else is `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|value| value.is_finite()))
}

impl Listing {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinate {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    /// Last all-digit whitespace token of the free-text lot size, e.g. `650`
    /// for `"650 sqft"`.
    pub fn lot_size_value(&self) -> Option<u64> {
        self.lot_size
            .as_deref()?
            .split_whitespace()
            .filter(|token| token.chars().all(|c| c.is_ascii_digit()))
            .filter_map(|token| token.parse::<u64>().ok())
            .last()
    }
}

/// WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn id(&self) -> LocationId {
        LocationId(format!(
            "{:.5},{:.5}",
            round5(self.latitude),
            round5(self.longitude)
        ))
    }
}

fn round5(value: f64) -> f64 {
    // `+ 0.0` folds -0.0 into 0.0 so both render identically.
    (value * 100_000.0).round() / 100_000.0 + 0.0
}

/// Identity derived from a coordinate rounded to five decimals (about a metre).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub String);

impl LocationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A place on the map, optionally tied back to the listing it belongs to.
#[derive(Debug, Clone)]
pub struct Location {
    pub coordinate: Coordinate,
    pub address: Option<String>,
    pub listing_key: Option<ListingKey>,
}

impl Location {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            address: None,
            listing_key: None,
        }
    }

    pub fn for_listing(coordinate: Coordinate, key: ListingKey) -> Self {
        Self {
            coordinate,
            address: None,
            listing_key: Some(key),
        }
    }

    pub fn id(&self) -> LocationId {
        self.coordinate.id()
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Location {}
