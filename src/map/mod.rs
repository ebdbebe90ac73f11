pub mod declutter;
pub mod detail;
pub mod filter;
pub mod markers;
pub mod search;
pub mod session;
pub mod timefmt;

pub use declutter::DeclutterPolicy;
pub use detail::OfferDetail;
pub use filter::{BoundKind, FilterConfig, FilterEngine, FilterOutcome, LayerAction, LayerActionKind, PriceBound, TimeWindow};
pub use markers::{Layer, Marker, MarkerId, MarkerRegistry};
pub use search::{FocusRequest, SearchNavigator};
pub use session::{MapSession, SessionCommand, SessionUpdate};
pub use timefmt::{parse_seen, Clock, ParseResult, SystemClock};
