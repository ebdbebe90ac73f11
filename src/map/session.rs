//! Per-load owner of all mutable map state.
//!
//! The presentation layer turns user gestures into [`SessionCommand`]s and
//! applies the returned layer actions and focus requests. Nothing here knows
//! about DOM ids or widgets.

use tracing::{debug, info};

use crate::catalog::ListingCatalog;
use crate::error::StoreError;
use crate::map::declutter::DeclutterPolicy;
use crate::map::detail::OfferDetail;
use crate::map::filter::{parse_bound, BoundKind, FilterConfig, FilterEngine, FilterOutcome, TimeWindow};
use crate::map::markers::{Layer, Marker, MarkerId, MarkerRegistry};
use crate::map::search::{FocusRequest, SearchNavigator};
use crate::map::timefmt::{Clock, SystemClock};
use crate::models::{Feed, ScanInfo, Stats};
use crate::overrides::{OverrideStore, SlotStore};

/// Typed user intents
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    SetLayerShown { layer: Layer, shown: bool },
    SetTimeWindow(TimeWindow),
    SetBandEnabled { layer: Layer, band: String, enabled: bool },
    /// Raw text of a min/max input; non-numeric text clears the bound
    SetPriceBound { layer: Layer, bound: BoundKind, raw: String },
    Search(String),
    SetZoom(f64),
    MarkDamaged(String),
    Restore(String),
}

/// What the presentation layer has to apply after a command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionUpdate {
    pub filter: FilterOutcome,
    pub focus: Option<FocusRequest>,
    /// Markers were rebuilt; every id may point at a different offer now
    pub rebuilt: bool,
    /// Displayed coordinates changed
    pub repositioned: bool,
}

pub struct MapSession<S: SlotStore> {
    catalog: ListingCatalog,
    registry: MarkerRegistry,
    engine: FilterEngine,
    config: FilterConfig,
    overrides: OverrideStore<S>,
    policy: DeclutterPolicy,
    navigator: SearchNavigator,
    zoom: f64,
    clock: Box<dyn Clock>,
}

impl<S: SlotStore> MapSession<S> {
    /// Empty session; nothing is rendered until [`MapSession::load`]
    pub fn new(overrides: OverrideStore<S>, policy: DeclutterPolicy, navigator: SearchNavigator, zoom: f64) -> Self {
        Self {
            catalog: ListingCatalog::default(),
            registry: MarkerRegistry::default(),
            engine: FilterEngine::new(),
            config: FilterConfig::default(),
            overrides,
            policy,
            navigator,
            zoom,
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Replace the catalog with `feed` and render it.
    ///
    /// Layer toggles, time window and search survive; band selections are
    /// reset to every band the new feed declares.
    pub fn load(&mut self, feed: Feed) -> FilterOutcome {
        self.catalog = ListingCatalog::from_feed(feed);

        let fresh = FilterConfig::with_bands(self.catalog.bands().map(|band| band.key.as_str()));
        self.config.active.bands = fresh.active.bands;
        self.config.inactive.bands = fresh.inactive.bands;

        self.rebuild()
    }

    /// Rebuild every marker from the catalog and the current override set
    pub fn rebuild(&mut self) -> FilterOutcome {
        let mut actions = self.engine.clear();
        let overrides = &self.overrides;
        self.registry = MarkerRegistry::build(&self.catalog, |id| overrides.is_damaged(id), &self.policy, self.zoom);
        info!("Rebuilt {} markers at zoom {}", self.registry.len(), self.zoom);

        let mut outcome = self.refresh();
        actions.append(&mut outcome.actions);
        outcome.actions = actions;
        outcome
    }

    /// Full filter pass over the current markers
    pub fn refresh(&mut self) -> FilterOutcome {
        let now = self.clock.now();
        self.engine.evaluate(&self.registry, &self.config, now)
    }

    pub fn dispatch(&mut self, command: SessionCommand) -> Result<SessionUpdate, StoreError> {
        debug!("Dispatching {:?}", command);
        let mut update = SessionUpdate::default();

        match command {
            SessionCommand::SetLayerShown { layer, shown } => {
                self.config.set_shown(layer, shown);
            }
            SessionCommand::SetTimeWindow(window) => {
                self.config.time_window = window;
            }
            SessionCommand::SetBandEnabled { layer, band, enabled } => {
                if let Some(filter) = self.config.layer_filter_mut(layer) {
                    if enabled {
                        filter.bands.insert(band);
                    } else {
                        filter.bands.remove(&band);
                    }
                }
            }
            SessionCommand::SetPriceBound { layer, bound, raw } => {
                if let Some(filter) = self.config.layer_filter_mut(layer) {
                    let value = parse_bound(&raw);
                    match bound {
                        BoundKind::Min => filter.bounds.min = value,
                        BoundKind::Max => filter.bounds.max = value,
                    }
                }
            }
            SessionCommand::Search(query) => {
                update.focus = self.navigator.resolve(&query, &self.registry, &self.config);
                self.config.search = query;
            }
            SessionCommand::SetZoom(zoom) => {
                let moved = self.policy.offset_for_zoom(zoom) != self.policy.offset_for_zoom(self.zoom);
                self.zoom = zoom;
                if moved {
                    self.registry.redisperse(&self.policy, zoom);
                    update.repositioned = true;
                }
            }
            SessionCommand::MarkDamaged(id) => {
                if self.overrides.mark_damaged(&id)? {
                    update.filter = self.rebuild();
                    update.rebuilt = true;
                    return Ok(update);
                }
            }
            SessionCommand::Restore(id) => {
                if self.overrides.restore(&id)? {
                    update.filter = self.rebuild();
                    update.rebuilt = true;
                    return Ok(update);
                }
            }
        }

        update.filter = self.refresh();
        Ok(update)
    }

    pub fn catalog(&self) -> &ListingCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn overrides(&self) -> &OverrideStore<S> {
        &self.overrides
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn stats(&self) -> &Stats {
        self.catalog.stats()
    }

    pub fn scan_info(&self) -> &ScanInfo {
        self.catalog.scan_info()
    }

    pub fn is_visible(&self, id: MarkerId) -> bool {
        self.engine.layer_of(id).is_some()
    }

    /// Markers currently rendered in `layer`, in insertion order
    pub fn visible_in(&self, layer: Layer) -> Vec<&Marker> {
        self.engine
            .visible_in(layer)
            .filter_map(|id| self.registry.get(id))
            .collect()
    }

    pub fn detail(&self, id: MarkerId) -> Option<OfferDetail> {
        self.registry.get(id).map(OfferDetail::from)
    }
}
