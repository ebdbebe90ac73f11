//! Wire shape of the `data.json` document produced by the scan pipeline.
//!
//! Every field the map does not strictly need is defaulted so that partially
//! populated documents (no markers, no stats, missing band entries) still load.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Coordinate;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Feed {
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub scan_info: ScanInfo,
    #[serde(default)]
    pub price_ranges: BTreeMap<String, PriceBandSpec>,
    #[serde(default)]
    pub markers: Vec<FeedMarker>,
}

/// Aggregates over active offers, computed upstream
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    #[serde(default)]
    pub active_count: u64,
    #[serde(default)]
    pub avg_price: i64,
    #[serde(default)]
    pub min_price: i64,
    #[serde(default)]
    pub max_price: i64,
}

/// Human readable labels of the last and next scan run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScanInfo {
    #[serde(default)]
    pub last: String,
    #[serde(default)]
    pub next: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBandSpec {
    pub label: String,
    pub color: String,
}

/// One geographic point and every offer observed there
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedMarker {
    pub coords: Coordinate,
    pub address: String,
    #[serde(default)]
    pub offers: Vec<FeedOffer>,
    pub price_range: String,
    #[serde(default)]
    pub has_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedOffer {
    pub id: String,
    pub price: i64,
    #[serde(default)]
    pub price_history: Vec<i64>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub first_seen: String,
    #[serde(default)]
    pub last_seen: String,
    #[serde(default)]
    pub days_active: u32,
    #[serde(default)]
    pub media_info: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub is_new: bool,
}

impl Feed {
    /// Parse a feed document from its JSON text
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
