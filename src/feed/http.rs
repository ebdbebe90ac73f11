use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::FeedError;
use crate::feed::traits::FeedFetch;

/// Fetches the feed document over HTTP
pub struct HttpFeedFetch {
    client: Client,
    url: String,
}

impl HttpFeedFetch {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let url = url.into();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("listing-map/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| FeedError::Transport {
                url: url.clone(),
                message: err.to_string(),
            })?;

        Ok(Self { client, url })
    }

    /// `url` with a `v=<token>` query parameter appended
    pub fn busted_url(&self, token: &str) -> String {
        let separator = if self.url.contains('?') { '&' } else { '?' };
        format!("{}{}v={}", self.url, separator, token)
    }
}

#[async_trait]
impl FeedFetch for HttpFeedFetch {
    async fn fetch(&self, cache_bust: Option<&str>) -> Result<String, FeedError> {
        let url = match cache_bust {
            Some(token) => self.busted_url(token),
            None => self.url.clone(),
        };

        debug!("Fetching URL: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| FeedError::Transport {
                url: url.clone(),
                message: err.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(FeedError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await.map_err(|err| FeedError::Transport {
            url: url.clone(),
            message: err.to_string(),
        })?;

        debug!("Downloaded {} bytes of feed", body.len());
        Ok(body)
    }

    fn source_name(&self) -> String {
        self.url.clone()
    }
}
