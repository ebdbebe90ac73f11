//! Spreads offers that share one location so each stays clickable.
//!
//! Offer `i` of `n` is placed at angle `2π·i/n` on a circle of radius
//! `offset·i` around the anchor, so the first offer always sits on the anchor
//! and later offers spiral outwards. Below the zoom threshold the offset is
//! zero and every offer overlaps the anchor.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::models::{Coordinate, Offer};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeclutterPolicy {
    /// Offsets apply only when the zoom level is strictly above this
    pub zoom_threshold: f64,
    /// Radius step in degrees
    pub offset: f64,
}

impl Default for DeclutterPolicy {
    fn default() -> Self {
        Self {
            zoom_threshold: 15.0,
            offset: 0.0001,
        }
    }
}

impl DeclutterPolicy {
    pub fn offset_for_zoom(&self, zoom: f64) -> f64 {
        if zoom > self.zoom_threshold {
            self.offset
        } else {
            0.0
        }
    }

    /// Displayed coordinate of the `index`-th of `count` co-located offers
    pub fn position(&self, base: Coordinate, index: usize, count: usize, zoom: f64) -> Coordinate {
        if count == 0 || index == 0 {
            return base;
        }

        let magnitude = self.offset_for_zoom(zoom);
        let angle = (index as f64 / count as f64) * 2.0 * PI;
        let radius = magnitude * index as f64;

        Coordinate {
            lat: base.lat + angle.cos() * radius,
            lon: base.lon + angle.sin() * radius,
        }
    }

    /// Place one activity partition of a location's offers.
    ///
    /// Callers decluster active and inactive offers in separate calls.
    pub fn disperse<'a>(
        &self,
        base: Coordinate,
        offers: &[&'a Offer],
        zoom: f64,
    ) -> Vec<(&'a Offer, Coordinate)> {
        let count = offers.len();
        offers
            .iter()
            .enumerate()
            .map(|(index, offer)| (*offer, self.position(base, index, count, zoom)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(id: &str) -> Offer {
        Offer {
            id: id.to_string(),
            price: 1000,
            price_history: vec![1000],
            active: true,
            first_seen: String::new(),
            last_seen: String::new(),
            days_active: 0,
            media_info: String::new(),
            description: String::new(),
            url: String::new(),
            price_range: "low".to_string(),
            is_new: false,
        }
    }

    fn distance(a: Coordinate, b: Coordinate) -> f64 {
        ((a.lat - b.lat).powi(2) + (a.lon - b.lon).powi(2)).sqrt()
    }

    #[test]
    fn radius_grows_with_index() {
        let policy = DeclutterPolicy::default();
        let base = Coordinate::new(51.2465, 22.5684);
        let offers = [offer("a"), offer("b"), offer("c"), offer("d")];
        let refs: Vec<&Offer> = offers.iter().collect();

        let placed = policy.disperse(base, &refs, 17.0);
        assert_eq!(placed.len(), 4);
        assert_eq!(placed[0].1, base);
        for (index, (_, coord)) in placed.iter().enumerate() {
            let expected = policy.offset * index as f64;
            assert!((distance(base, *coord) - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn angle_follows_index_over_count() {
        let policy = DeclutterPolicy::default();
        let base = Coordinate::new(0.0, 0.0);

        // 2 of 4 -> angle π, straight down in latitude
        let coord = policy.position(base, 2, 4, 18.0);
        assert!((coord.lat + 2.0 * policy.offset).abs() < 1e-12);
        assert!(coord.lon.abs() < 1e-12);

        // 1 of 4 -> angle π/2, east in longitude
        let coord = policy.position(base, 1, 4, 18.0);
        assert!(coord.lat.abs() < 1e-12);
        assert!((coord.lon - policy.offset).abs() < 1e-12);
    }

    #[test]
    fn coarse_zoom_keeps_everything_on_anchor() {
        let policy = DeclutterPolicy::default();
        let base = Coordinate::new(51.0, 22.0);
        let offers = [offer("a"), offer("b"), offer("c")];
        let refs: Vec<&Offer> = offers.iter().collect();

        // threshold itself is still coarse
        for zoom in [10.0, 15.0] {
            for (_, coord) in policy.disperse(base, &refs, zoom) {
                assert_eq!(coord, base);
            }
        }
    }

    #[test]
    fn single_offer_sits_on_anchor() {
        let policy = DeclutterPolicy::default();
        let base = Coordinate::new(51.0, 22.0);
        let only = offer("a");
        let placed = policy.disperse(base, &[&only], 19.0);
        assert_eq!(placed[0].1, base);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let policy = DeclutterPolicy::default();
        let base = Coordinate::new(51.0, 22.0);
        let offers = [offer("a"), offer("b"), offer("c"), offer("d"), offer("e")];
        let refs: Vec<&Offer> = offers.iter().collect();

        let first: Vec<Coordinate> = policy.disperse(base, &refs, 17.0).into_iter().map(|(_, c)| c).collect();
        let second: Vec<Coordinate> = policy.disperse(base, &refs, 17.0).into_iter().map(|(_, c)| c).collect();
        assert_eq!(first, second);
    }
}
