//! Two-step feed acquisition: a cache-busted attempt, then one plain retry.
//! A document that fails to parse counts as a failed attempt. There is no
//! partial result; the caller either gets a whole feed or a terminal error.

use chrono::Utc;
use tracing::{info, warn};

use crate::error::FeedError;
use crate::feed::traits::FeedFetch;
use crate::models::Feed;

pub struct FeedLoader<F: FeedFetch> {
    fetch: F,
}

impl<F: FeedFetch> FeedLoader<F> {
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }

    pub async fn load(&self) -> Result<Feed, FeedError> {
        let token = Utc::now().timestamp_millis().to_string();
        info!("Loading feed from {}", self.fetch.source_name());

        let first = match self.attempt(Some(&token)).await {
            Ok(feed) => return Ok(feed),
            Err(err) => err,
        };
        warn!("Cache-busted feed request failed ({}), retrying without", first);

        match self.attempt(None).await {
            Ok(feed) => Ok(feed),
            Err(fallback) => Err(FeedError::Unavailable {
                first: Box::new(first),
                fallback: Box::new(fallback),
            }),
        }
    }

    async fn attempt(&self, cache_bust: Option<&str>) -> Result<Feed, FeedError> {
        let text = self.fetch.fetch(cache_bust).await?;
        let feed = Feed::from_json(&text)?;
        info!("Feed loaded: {} locations", feed.markers.len());
        Ok(feed)
    }
}
