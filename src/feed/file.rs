use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::FeedError;
use crate::feed::traits::FeedFetch;

/// Reads the feed document from a local file
pub struct FileFeedFetch {
    path: PathBuf,
}

impl FileFeedFetch {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FeedFetch for FileFeedFetch {
    async fn fetch(&self, _cache_bust: Option<&str>) -> Result<String, FeedError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| FeedError::Io {
                path: self.path.clone(),
                source,
            })
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }
}
