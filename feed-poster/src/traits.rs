use crate::types::{FetchedFeed, Message, Result};
use async_trait::async_trait;

/// Something that can produce the current state of a syndication feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed at `url`.
    /// Errors here are per-feed: the caller logs them and moves on.
    async fn fetch(&self, url: &str) -> Result<FetchedFeed>;
}

/// Destination for rendered content.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Post one message on behalf of `message.account`.
    async fn post(&self, message: &Message<'_>) -> Result<()>;
}
