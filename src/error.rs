use std::path::PathBuf;

use thiserror::Error;

/// Failures while acquiring the listings feed
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("feed document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Both the cache-busted request and the plain fallback failed
    #[error("feed unavailable (first attempt: {first}; fallback: {fallback})")]
    Unavailable {
        first: Box<FeedError>,
        fallback: Box<FeedError>,
    },
}

/// Failures of the persistent override slot
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("override slot {} is not accessible: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode override list: {0}")]
    Encode(#[from] serde_json::Error),
}
