use serde::Serialize;

use crate::map::markers::{Layer, Marker};

/// Data behind a marker's popup; formatting is left to the presentation layer
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OfferDetail {
    pub offer_id: String,
    pub address: String,
    pub layer: Layer,
    pub price: i64,
    /// Present only when the price changed at least once
    pub price_history: Option<Vec<i64>>,
    pub media_info: String,
    pub description: String,
    pub url: String,
    pub first_seen: String,
    pub last_seen: String,
    pub days_active: u32,
    pub is_new: bool,
}

impl From<&Marker> for OfferDetail {
    fn from(marker: &Marker) -> Self {
        let offer = &marker.offer;
        Self {
            offer_id: offer.id.clone(),
            address: marker.address.clone(),
            layer: marker.layer(),
            price: offer.price,
            price_history: (offer.price_history.len() > 1).then(|| offer.price_history.clone()),
            media_info: offer.media_info.clone(),
            description: offer.description.clone(),
            url: offer.url.clone(),
            first_seen: offer.first_seen.clone(),
            last_seen: offer.last_seen.clone(),
            days_active: offer.days_active,
            is_new: offer.is_new,
        }
    }
}
