use tracing::{debug, info};

use crate::map::filter::FilterConfig;
use crate::map::markers::{MarkerId, MarkerRegistry};
use crate::models::Coordinate;

/// Camera move plus popup request for a search hit
#[derive(Debug, Clone, PartialEq)]
pub struct FocusRequest {
    pub marker: MarkerId,
    pub offer_id: String,
    pub center: Coordinate,
    pub zoom: f64,
    pub open_detail: bool,
}

/// Resolves free-text queries against marker addresses
#[derive(Debug, Clone, Copy)]
pub struct SearchNavigator {
    focus_zoom: f64,
}

impl SearchNavigator {
    pub fn new(focus_zoom: f64) -> Self {
        Self { focus_zoom }
    }

    /// First marker in insertion order whose address contains `query`
    /// (ignoring case) and whose layer is toggled on.
    pub fn resolve(&self, query: &str, registry: &MarkerRegistry, config: &FilterConfig) -> Option<FocusRequest> {
        if query.is_empty() {
            return None;
        }
        let needle = query.to_lowercase();

        let hit = registry
            .iter()
            .find(|marker| marker.address.to_lowercase().contains(&needle) && config.is_shown(marker.layer()));

        match hit {
            Some(marker) => {
                info!("Search '{}' matched {} ({})", query, marker.address, marker.offer.id);
                Some(FocusRequest {
                    marker: marker.id,
                    offer_id: marker.offer.id.clone(),
                    center: marker.position,
                    zoom: self.focus_zoom,
                    open_detail: true,
                })
            }
            None => {
                debug!("Search '{}' matched nothing", query);
                None
            }
        }
    }
}

impl Default for SearchNavigator {
    fn default() -> Self {
        Self::new(17.0)
    }
}
