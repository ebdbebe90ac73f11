use async_trait::async_trait;

use crate::error::FeedError;

/// Transport that yields the raw feed document.
///
/// `cache_bust` is a token the transport should use to defeat intermediate
/// caches; transports without caches ignore it.
#[async_trait]
pub trait FeedFetch: Send + Sync {
    async fn fetch(&self, cache_bust: Option<&str>) -> Result<String, FeedError>;

    /// Where the feed comes from, for log lines
    fn source_name(&self) -> String;
}

#[async_trait]
impl<T: FeedFetch + ?Sized> FeedFetch for Box<T> {
    async fn fetch(&self, cache_bust: Option<&str>) -> Result<String, FeedError> {
        (**self).fetch(cache_bust).await
    }

    fn source_name(&self) -> String {
        (**self).source_name()
    }
}
