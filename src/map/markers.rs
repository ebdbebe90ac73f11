use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::ListingCatalog;
use crate::map::declutter::DeclutterPolicy;
use crate::models::{Coordinate, Offer};

/// Rendering partition a marker belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Active,
    Inactive,
    Damaged,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Active, Layer::Inactive, Layer::Damaged];
}

/// Position in the registry, stable until the next rebuild
pub type MarkerId = usize;

/// Renderable unit bound to exactly one offer
#[derive(Debug, Clone)]
pub struct Marker {
    pub id: MarkerId,
    pub offer: Offer,
    pub address: String,
    pub price_range: String,
    pub color: String,
    pub is_active: bool,
    /// Snapshot of the override store at build time
    pub is_damaged: bool,
    pub anchor: Coordinate,
    pub position: Coordinate,
    /// `firstSeen` of every offer anchored to the same location
    pub location_first_seen: Vec<String>,
    slot_index: usize,
    slot_count: usize,
}

impl Marker {
    /// Damaged takes precedence over activity
    pub fn layer(&self) -> Layer {
        if self.is_damaged {
            Layer::Damaged
        } else if self.is_active {
            Layer::Active
        } else {
            Layer::Inactive
        }
    }

    pub fn price(&self) -> i64 {
        self.offer.price
    }
}

/// Live set of markers in insertion order
#[derive(Debug, Clone, Default)]
pub struct MarkerRegistry {
    markers: Vec<Marker>,
}

impl MarkerRegistry {
    /// Materialize one marker per catalog offer.
    ///
    /// Within each location the active partition is inserted before the
    /// inactive one and each partition is declustered on its own.
    pub fn build<F>(catalog: &ListingCatalog, is_damaged: F, policy: &DeclutterPolicy, zoom: f64) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let mut markers = Vec::with_capacity(catalog.offer_count());

        for entry in catalog.locations() {
            let location_first_seen: Vec<String> =
                entry.offers.iter().map(|offer| offer.first_seen.clone()).collect();
            let (active, inactive) = entry.partition();

            for (partition, is_active) in [(active, true), (inactive, false)] {
                let count = partition.len();
                let placed = policy.disperse(entry.location.coords, &partition, zoom);

                for (slot_index, (offer, position)) in placed.into_iter().enumerate() {
                    let band = catalog.band(&offer.price_range);
                    markers.push(Marker {
                        id: markers.len(),
                        offer: offer.clone(),
                        address: entry.location.address.clone(),
                        price_range: offer.price_range.clone(),
                        color: band.color,
                        is_active,
                        is_damaged: is_damaged(&offer.id),
                        anchor: entry.location.coords,
                        position,
                        location_first_seen: location_first_seen.clone(),
                        slot_index,
                        slot_count: count,
                    });
                }
            }
        }

        debug!(
            "Built {} markers ({} damaged)",
            markers.len(),
            markers.iter().filter(|m| m.is_damaged).count()
        );

        Self { markers }
    }

    /// Recompute displayed coordinates for a new zoom level
    pub fn redisperse(&mut self, policy: &DeclutterPolicy, zoom: f64) {
        for marker in &mut self.markers {
            marker.position = policy.position(marker.anchor, marker.slot_index, marker.slot_count, zoom);
        }
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id)
    }

    pub fn find_by_offer(&self, offer_id: &str) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.offer.id == offer_id)
    }
}
