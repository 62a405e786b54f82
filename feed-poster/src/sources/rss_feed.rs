use crate::traits::FeedSource;
use crate::types::{FetchConfig, FetchedFeed, Result};
use crate::{FeedParser, Fetcher};
use async_trait::async_trait;
use tracing::info;

/// Feed source that downloads feeds over HTTP and parses them with [`FeedParser`].
pub struct HttpFeedSource {
    fetcher: Fetcher,
}

impl HttpFeedSource {
    pub fn new(fetch_config: FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(fetch_config)?,
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, url: &str) -> Result<FetchedFeed> {
        info!("Pulling feed: {}", url);

        let content = self.fetcher.fetch_feed(url).await?;
        FeedParser::parse_feed(&content, url)
    }
}
