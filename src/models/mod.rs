use serde::{Deserialize, Serialize};

pub mod feed;

pub use feed::{Feed, FeedMarker, FeedOffer, PriceBandSpec, ScanInfo, Stats};

/// Neutral marker color used when the feed does not describe a price band
pub const NEUTRAL_COLOR: &str = "#808080";

/// Geographic coordinate in WGS84 degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Geographic anchor shared by one or more offers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub coords: Coordinate,
    pub address: String,
}

/// Single listing observation as published by the feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub price: i64,
    /// Chronological, never empty after normalization
    pub price_history: Vec<i64>,
    pub active: bool,
    /// `DD.MM.YY HH:MM`, parsed lazily by the time filter
    pub first_seen: String,
    pub last_seen: String,
    pub days_active: u32,
    pub media_info: String,
    pub description: String,
    pub url: String,
    /// Key into the catalog's price band table
    pub price_range: String,
    pub is_new: bool,
}

/// Named, colored price bucket
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRange {
    pub key: String,
    pub label: String,
    pub color: String,
}

impl PriceRange {
    /// Placeholder band for a key the feed never declared
    pub fn neutral(key: &str) -> Self {
        Self {
            key: key.to_string(),
            label: key.to_string(),
            color: NEUTRAL_COLOR.to_string(),
        }
    }
}
