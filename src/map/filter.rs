//! Visibility filter evaluated over every marker on each UI change.
//!
//! A marker is visible when all of the following hold:
//! its layer toggle is on, the time window admits at least one offer at its
//! address, its price band is enabled for its layer, its price lies inside
//! the layer's bounds, and its address contains the search term.
//! Damaged markers have no band or price controls.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::map::markers::{Layer, Marker, MarkerId, MarkerRegistry};
use crate::map::timefmt::{parse_seen, ParseResult};

/// Categorical "time since first observation" selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeWindow {
    #[default]
    All,
    LastDays(u32),
}

impl TimeWindow {
    /// Whether any of the given `firstSeen` labels falls inside the window.
    ///
    /// Unparseable labels count as inside.
    pub fn admits<'a, I>(&self, first_seen: I, now: NaiveDateTime) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let days = match self {
            TimeWindow::All => return true,
            TimeWindow::LastDays(days) => *days,
        };
        // a window reaching past the representable range admits everything
        let cutoff = Duration::try_days(i64::from(days))
            .and_then(|span| now.checked_sub_signed(span))
            .unwrap_or(NaiveDateTime::MIN);

        first_seen.into_iter().any(|label| match parse_seen(label) {
            ParseResult::Parsed(at) => at >= cutoff,
            ParseResult::Invalid { input, reason } => {
                debug!("Unparseable firstSeen '{}' ({}), passing time filter", input, reason);
                true
            }
        })
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    /// Accepts `all`, `7` or `7d`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(TimeWindow::All);
        }
        s.trim_end_matches(['d', 'D'])
            .parse::<u32>()
            .map(TimeWindow::LastDays)
            .map_err(|_| format!("invalid time window '{}', expected 'all' or a day count", s))
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeWindow::All => write!(f, "all"),
            TimeWindow::LastDays(days) => write!(f, "last {} days", days),
        }
    }
}

/// Read a numeric price input; anything that is not an integer is an open bound
pub fn parse_bound(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Inclusive price bounds with open ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceBound {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl PriceBound {
    pub fn from_inputs(min_raw: &str, max_raw: &str) -> Self {
        Self {
            min: parse_bound(min_raw),
            max: parse_bound(max_raw),
        }
    }

    pub fn contains(&self, price: i64) -> bool {
        price >= self.min.unwrap_or(0) && self.max.map_or(true, |max| price <= max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    Min,
    Max,
}

/// Band and price controls of one priced layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerFilter {
    pub bands: BTreeSet<String>,
    pub bounds: PriceBound,
}

impl LayerFilter {
    fn admits(&self, marker: &Marker) -> bool {
        self.bands.contains(&marker.price_range) && self.bounds.contains(marker.price())
    }
}

/// Complete filter state as set by the controls
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub show_active: bool,
    pub show_inactive: bool,
    pub show_damaged: bool,
    pub time_window: TimeWindow,
    pub active: LayerFilter,
    pub inactive: LayerFilter,
    pub search: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            show_active: true,
            show_inactive: true,
            show_damaged: false,
            time_window: TimeWindow::All,
            active: LayerFilter::default(),
            inactive: LayerFilter::default(),
            search: String::new(),
        }
    }
}

impl FilterConfig {
    /// Default toggles with every given band enabled on both priced layers
    pub fn with_bands<'a, I>(keys: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let bands: BTreeSet<String> = keys.into_iter().map(str::to_string).collect();
        Self {
            active: LayerFilter {
                bands: bands.clone(),
                bounds: PriceBound::default(),
            },
            inactive: LayerFilter {
                bands,
                bounds: PriceBound::default(),
            },
            ..Self::default()
        }
    }

    pub fn is_shown(&self, layer: Layer) -> bool {
        match layer {
            Layer::Active => self.show_active,
            Layer::Inactive => self.show_inactive,
            Layer::Damaged => self.show_damaged,
        }
    }

    pub fn set_shown(&mut self, layer: Layer, shown: bool) {
        match layer {
            Layer::Active => self.show_active = shown,
            Layer::Inactive => self.show_inactive = shown,
            Layer::Damaged => self.show_damaged = shown,
        }
    }

    /// Band/price controls for `layer`; the damaged layer has none
    pub fn layer_filter(&self, layer: Layer) -> Option<&LayerFilter> {
        match layer {
            Layer::Active => Some(&self.active),
            Layer::Inactive => Some(&self.inactive),
            Layer::Damaged => None,
        }
    }

    pub fn layer_filter_mut(&mut self, layer: Layer) -> Option<&mut LayerFilter> {
        match layer {
            Layer::Active => Some(&mut self.active),
            Layer::Inactive => Some(&mut self.inactive),
            Layer::Damaged => None,
        }
    }

    /// Lowercased search term, `None` when empty
    pub fn search_term(&self) -> Option<String> {
        if self.search.is_empty() {
            None
        } else {
            Some(self.search.to_lowercase())
        }
    }

    pub fn is_visible(&self, marker: &Marker, now: NaiveDateTime) -> bool {
        let layer = marker.layer();
        if !self.is_shown(layer) {
            return false;
        }

        let first_seen = marker.location_first_seen.iter().map(String::as_str);
        if !self.time_window.admits(first_seen, now) {
            return false;
        }

        if let Some(filter) = self.layer_filter(layer) {
            if !filter.admits(marker) {
                return false;
            }
        }

        match self.search_term() {
            Some(term) => marker.address.to_lowercase().contains(&term),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerActionKind {
    Add,
    Remove,
}

/// One membership change the render layer has to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerAction {
    pub marker: MarkerId,
    pub layer: Layer,
    pub kind: LayerActionKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayerCounts {
    pub active: usize,
    pub inactive: usize,
    pub damaged: usize,
}

impl LayerCounts {
    pub fn get(&self, layer: Layer) -> usize {
        match layer {
            Layer::Active => self.active,
            Layer::Inactive => self.inactive,
            Layer::Damaged => self.damaged,
        }
    }

    pub fn total(&self) -> usize {
        self.active + self.inactive + self.damaged
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOutcome {
    pub actions: Vec<LayerAction>,
    pub counts: LayerCounts,
}

/// Tracks which layer each marker is rendered in and emits only the changes
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    rendered: BTreeMap<MarkerId, Layer>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(
        &mut self,
        registry: &MarkerRegistry,
        config: &FilterConfig,
        now: NaiveDateTime,
    ) -> FilterOutcome {
        let mut actions = Vec::new();

        // ids past the end belong to a previous, larger registry
        let stale: Vec<MarkerId> = self
            .rendered
            .range(registry.len()..)
            .map(|(id, _)| *id)
            .collect();
        for id in stale {
            if let Some(layer) = self.rendered.remove(&id) {
                actions.push(LayerAction {
                    marker: id,
                    layer,
                    kind: LayerActionKind::Remove,
                });
            }
        }

        for marker in registry.iter() {
            let desired = config.is_visible(marker, now).then(|| marker.layer());
            let current = self.rendered.get(&marker.id).copied();
            if desired == current {
                continue;
            }

            if let Some(layer) = current {
                actions.push(LayerAction {
                    marker: marker.id,
                    layer,
                    kind: LayerActionKind::Remove,
                });
                self.rendered.remove(&marker.id);
            }
            if let Some(layer) = desired {
                actions.push(LayerAction {
                    marker: marker.id,
                    layer,
                    kind: LayerActionKind::Add,
                });
                self.rendered.insert(marker.id, layer);
            }
        }

        let counts = self.counts();
        debug!(
            "Filter pass: {} transitions, visible active={} inactive={} damaged={}",
            actions.len(),
            counts.active,
            counts.inactive,
            counts.damaged
        );

        FilterOutcome { actions, counts }
    }

    /// Drop every marker from its layer, e.g. before a rebuild
    pub fn clear(&mut self) -> Vec<LayerAction> {
        std::mem::take(&mut self.rendered)
            .into_iter()
            .map(|(marker, layer)| LayerAction {
                marker,
                layer,
                kind: LayerActionKind::Remove,
            })
            .collect()
    }

    pub fn layer_of(&self, id: MarkerId) -> Option<Layer> {
        self.rendered.get(&id).copied()
    }

    pub fn visible_in(&self, layer: Layer) -> impl Iterator<Item = MarkerId> + '_ {
        self.rendered
            .iter()
            .filter(move |(_, l)| **l == layer)
            .map(|(id, _)| *id)
    }

    pub fn counts(&self) -> LayerCounts {
        let mut counts = LayerCounts::default();
        for layer in self.rendered.values() {
            match layer {
                Layer::Active => counts.active += 1,
                Layer::Inactive => counts.inactive += 1,
                Layer::Damaged => counts.damaged += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ListingCatalog;
    use crate::map::declutter::DeclutterPolicy;
    use crate::models::{Coordinate, Feed, FeedMarker, FeedOffer};

    fn now() -> NaiveDateTime {
        parse_seen("18.10.26 12:00").ok().unwrap()
    }

    fn raw_offer(id: &str, price: i64, active: bool, first_seen: &str) -> FeedOffer {
        FeedOffer {
            id: id.to_string(),
            price,
            price_history: vec![price],
            active,
            first_seen: first_seen.to_string(),
            last_seen: "18.10.26 09:00".to_string(),
            days_active: 1,
            media_info: String::new(),
            description: String::new(),
            url: String::new(),
            is_new: false,
        }
    }

    fn location(address: &str, band: &str, offers: Vec<FeedOffer>) -> FeedMarker {
        FeedMarker {
            coords: Coordinate::new(51.0, 22.0),
            address: address.to_string(),
            offers,
            price_range: band.to_string(),
            has_active: true,
        }
    }

    fn registry(markers: Vec<FeedMarker>, damaged: &[&str]) -> MarkerRegistry {
        let feed = Feed {
            markers,
            ..Feed::default()
        };
        let catalog = ListingCatalog::from_feed(feed);
        MarkerRegistry::build(&catalog, |id| damaged.contains(&id), &DeclutterPolicy::default(), 13.0)
    }

    fn sample() -> MarkerRegistry {
        registry(
            vec![
                location(
                    "Lipowa 3",
                    "low",
                    vec![
                        raw_offer("a1", 500, true, "17.10.26 10:00"),
                        raw_offer("a2", 550, false, "01.09.26 10:00"),
                    ],
                ),
                location("Zana 12", "high", vec![raw_offer("b1", 1500, true, "01.08.26 10:00")]),
            ],
            &[],
        )
    }

    #[test]
    fn everything_visible_with_open_config() {
        let registry = sample();
        let config = FilterConfig::with_bands(["low", "high"]);
        let mut engine = FilterEngine::new();

        let outcome = engine.evaluate(&registry, &config, now());
        assert_eq!(outcome.counts, LayerCounts { active: 2, inactive: 1, damaged: 0 });
        assert!(outcome.actions.iter().all(|a| a.kind == LayerActionKind::Add));
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let registry = sample();
        let config = FilterConfig::with_bands(["low", "high"]);
        let mut engine = FilterEngine::new();

        let first = engine.evaluate(&registry, &config, now());
        assert_eq!(first.actions.len(), 3);
        let second = engine.evaluate(&registry, &config, now());
        assert!(second.actions.is_empty());
        assert_eq!(first.counts, second.counts);
    }

    #[test]
    fn toggling_layer_emits_removals_then_re_adds() {
        let registry = sample();
        let mut config = FilterConfig::with_bands(["low", "high"]);
        let mut engine = FilterEngine::new();
        engine.evaluate(&registry, &config, now());

        config.set_shown(Layer::Inactive, false);
        let outcome = engine.evaluate(&registry, &config, now());
        assert_eq!(
            outcome.actions,
            vec![LayerAction {
                marker: 1,
                layer: Layer::Inactive,
                kind: LayerActionKind::Remove,
            }]
        );

        config.set_shown(Layer::Inactive, true);
        let outcome = engine.evaluate(&registry, &config, now());
        assert_eq!(outcome.actions.len(), 1);
        assert_eq!(outcome.actions[0].kind, LayerActionKind::Add);
    }

    #[test]
    fn band_sets_are_independent_per_layer() {
        let registry = sample();
        let mut config = FilterConfig::with_bands(["low", "high"]);
        config.inactive.bands.remove("low");
        let mut engine = FilterEngine::new();

        let outcome = engine.evaluate(&registry, &config, now());
        assert_eq!(outcome.counts.active, 2);
        assert_eq!(outcome.counts.inactive, 0);
    }

    #[test]
    fn garbage_price_inputs_exclude_nothing() {
        let registry = sample();
        let mut config = FilterConfig::with_bands(["low", "high"]);
        config.active.bounds = PriceBound::from_inputs("", "abc");
        config.inactive.bounds = PriceBound::from_inputs("-x", "  ");
        let mut engine = FilterEngine::new();

        let outcome = engine.evaluate(&registry, &config, now());
        assert_eq!(outcome.counts.total(), 3);
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let registry = sample();
        let mut config = FilterConfig::with_bands(["low", "high"]);
        config.active.bounds = PriceBound::from_inputs("500", " 1000 ");
        let mut engine = FilterEngine::new();

        let outcome = engine.evaluate(&registry, &config, now());
        assert_eq!(engine.layer_of(0), Some(Layer::Active));
        assert_eq!(engine.layer_of(2), None);
        assert_eq!(outcome.counts.active, 1);
    }

    #[test]
    fn time_window_counts_any_offer_at_the_address() {
        let registry = sample();
        let mut config = FilterConfig::with_bands(["low", "high"]);
        config.time_window = TimeWindow::LastDays(7);
        let mut engine = FilterEngine::new();

        let outcome = engine.evaluate(&registry, &config, now());
        // Lipowa has a fresh offer so its old inactive offer stays, Zana is too old
        assert_eq!(outcome.counts, LayerCounts { active: 1, inactive: 1, damaged: 0 });
    }

    #[test]
    fn unparseable_first_seen_fails_open() {
        let registry = registry(
            vec![location("Ogrodowa 1", "low", vec![raw_offer("z", 400, true, "niedawno")])],
            &[],
        );
        let mut config = FilterConfig::with_bands(["low"]);
        config.time_window = TimeWindow::LastDays(7);
        let mut engine = FilterEngine::new();

        assert_eq!(engine.evaluate(&registry, &config, now()).counts.active, 1);
    }

    #[test]
    fn damaged_marker_ignores_activity_toggles() {
        let registry = registry(
            vec![location("Lipowa 3", "low", vec![raw_offer("123", 500, true, "17.10.26 10:00")])],
            &["123"],
        );
        let mut engine = FilterEngine::new();

        for (show_active, show_inactive) in [(true, true), (false, false), (true, false)] {
            let mut config = FilterConfig::with_bands(["low"]);
            config.show_active = show_active;
            config.show_inactive = show_inactive;
            config.show_damaged = false;
            let outcome = engine.evaluate(&registry, &config, now());
            assert_eq!(outcome.counts.total(), 0);

            config.show_damaged = true;
            let outcome = engine.evaluate(&registry, &config, now());
            assert_eq!(outcome.counts, LayerCounts { active: 0, inactive: 0, damaged: 1 });
        }
    }

    #[test]
    fn damaged_marker_skips_band_and_price_controls() {
        let registry = registry(
            vec![location("Lipowa 3", "low", vec![raw_offer("123", 500, true, "17.10.26 10:00")])],
            &["123"],
        );
        let mut config = FilterConfig::with_bands(std::iter::empty());
        config.show_damaged = true;
        config.active.bounds = PriceBound::from_inputs("9000", "");
        let mut engine = FilterEngine::new();

        assert_eq!(engine.evaluate(&registry, &config, now()).counts.damaged, 1);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let registry = sample();
        let mut config = FilterConfig::with_bands(["low", "high"]);
        config.search = "LIPO".to_string();
        let mut engine = FilterEngine::new();

        let outcome = engine.evaluate(&registry, &config, now());
        assert_eq!(outcome.counts.total(), 2);
        assert_eq!(engine.layer_of(2), None);
    }

    #[test]
    fn shrinking_registry_removes_stale_ids() {
        let config = FilterConfig::with_bands(["low", "high"]);
        let mut engine = FilterEngine::new();
        engine.evaluate(&sample(), &config, now());

        let smaller = registry(
            vec![location("Zana 12", "high", vec![raw_offer("b1", 1500, true, "01.08.26 10:00")])],
            &[],
        );
        let outcome = engine.evaluate(&smaller, &config, now());
        assert_eq!(outcome.counts.total(), 1);
        assert!(outcome
            .actions
            .iter()
            .any(|a| a.marker == 2 && a.kind == LayerActionKind::Remove));
    }

    #[test]
    fn time_window_boundary_is_inclusive() {
        let window = TimeWindow::LastDays(7);
        assert!(window.admits(["11.10.26 12:00"], now()));
        assert!(!window.admits(["11.10.26 11:59"], now()));
    }

    #[test]
    fn huge_time_window_admits_everything() {
        let window: TimeWindow = "200000000".parse().unwrap();
        assert!(window.admits(["17.10.26 10:00"], now()));
        assert!(window.admits(["01.01.70 00:00"], now()));
        assert!(TimeWindow::LastDays(u32::MAX).admits(["05.05.05 05:05"], now()));
    }

    #[test]
    fn bound_requires_whole_integer() {
        assert_eq!(parse_bound(" 1600 "), Some(1600));
        assert_eq!(parse_bound("16OO"), None);
        assert_eq!(parse_bound("1 600"), None);
        assert_eq!(parse_bound(""), None);
    }

    #[test]
    fn time_window_from_str() {
        assert_eq!("all".parse::<TimeWindow>().unwrap(), TimeWindow::All);
        assert_eq!("7".parse::<TimeWindow>().unwrap(), TimeWindow::LastDays(7));
        assert_eq!("30d".parse::<TimeWindow>().unwrap(), TimeWindow::LastDays(30));
        assert!("soon".parse::<TimeWindow>().is_err());
    }
}
