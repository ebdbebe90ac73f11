use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::models::{Feed, FeedMarker, Location, Offer, PriceRange, ScanInfo, Stats};

/// A location together with the offers anchored to it, in feed order
#[derive(Debug, Clone)]
pub struct LocationEntry {
    pub location: Location,
    pub offers: Vec<Offer>,
}

impl LocationEntry {
    /// Split the offers into (active, inactive), keeping feed order in each
    pub fn partition(&self) -> (Vec<&Offer>, Vec<&Offer>) {
        self.offers.iter().partition(|offer| offer.active)
    }
}

/// Typed, read-only view over one loaded feed
#[derive(Debug, Clone, Default)]
pub struct ListingCatalog {
    locations: Vec<LocationEntry>,
    bands: BTreeMap<String, PriceRange>,
    stats: Stats,
    scan_info: ScanInfo,
}

impl ListingCatalog {
    /// Normalize a feed document. The catalog is replaced wholesale on every load.
    pub fn from_feed(feed: Feed) -> Self {
        let bands = feed
            .price_ranges
            .into_iter()
            .map(|(key, spec)| {
                let band = PriceRange {
                    key: key.clone(),
                    label: spec.label,
                    color: spec.color,
                };
                (key, band)
            })
            .collect();

        let mut seen_ids = HashSet::new();
        let locations: Vec<LocationEntry> = feed
            .markers
            .into_iter()
            .map(|marker| normalize_marker(marker, &mut seen_ids))
            .collect();

        let catalog = Self {
            locations,
            bands,
            stats: feed.stats,
            scan_info: feed.scan_info,
        };

        info!(
            "Catalog loaded: {} locations, {} offers, {} price bands",
            catalog.locations.len(),
            catalog.offer_count(),
            catalog.bands.len()
        );

        catalog
    }

    pub fn locations(&self) -> &[LocationEntry] {
        &self.locations
    }

    pub fn offer_count(&self) -> usize {
        self.locations.iter().map(|entry| entry.offers.len()).sum()
    }

    pub fn offers(&self) -> impl Iterator<Item = &Offer> {
        self.locations.iter().flat_map(|entry| entry.offers.iter())
    }

    pub fn find_offer(&self, id: &str) -> Option<&Offer> {
        self.offers().find(|offer| offer.id == id)
    }

    /// Band metadata for `key`, or a neutral band when the feed omitted it
    pub fn band(&self, key: &str) -> PriceRange {
        match self.bands.get(key) {
            Some(band) => band.clone(),
            None => {
                debug!("No price band metadata for '{}', using neutral color", key);
                PriceRange::neutral(key)
            }
        }
    }

    /// Declared bands, used to build the per-layer band checklists
    pub fn bands(&self) -> impl Iterator<Item = &PriceRange> {
        self.bands.values()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn scan_info(&self) -> &ScanInfo {
        &self.scan_info
    }
}

fn normalize_marker(marker: FeedMarker, seen_ids: &mut HashSet<String>) -> LocationEntry {
    let location = Location {
        coords: marker.coords,
        address: marker.address,
    };

    let offers = marker
        .offers
        .into_iter()
        .map(|raw| {
            if !seen_ids.insert(raw.id.clone()) {
                warn!("Offer id '{}' appears more than once in the feed", raw.id);
            }

            let price_history = if raw.price_history.is_empty() {
                vec![raw.price]
            } else {
                raw.price_history
            };

            Offer {
                id: raw.id,
                price: raw.price,
                price_history,
                active: raw.active,
                first_seen: raw.first_seen,
                last_seen: raw.last_seen,
                days_active: raw.days_active,
                media_info: raw.media_info,
                description: raw.description,
                url: raw.url,
                price_range: marker.price_range.clone(),
                is_new: raw.is_new,
            }
        })
        .collect();

    LocationEntry { location, offers }
}
