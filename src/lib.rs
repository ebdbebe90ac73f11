//! Core of the listings map: turns a scan feed into declustered markers,
//! routes them into active / inactive / damaged layers and keeps the
//! client-local damaged list.

pub mod catalog;
pub mod config;
pub mod error;
pub mod feed;
pub mod map;
pub mod models;
pub mod overrides;

pub use catalog::ListingCatalog;
pub use error::{FeedError, StoreError};
pub use map::{MapSession, SessionCommand};
pub use overrides::{FileSlotStore, OverrideStore};
