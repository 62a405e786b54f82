use crate::types::{FeedItem, FetchedFeed, PosterError, Result};
use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Link};
use feed_rs::parser;
use tracing::{debug, info};

/// Turns RSS, Atom and JSON Feed documents into [`FetchedFeed`]s.
pub struct FeedParser;

impl FeedParser {
    /// Parse `content`, recording `update_url` as the address it was fetched from.
    pub fn parse_feed(content: &str, update_url: &str) -> Result<FetchedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| PosterError::Parse(format!("Failed to parse feed {}: {}", update_url, e)))?;

        let title = feed.title.map(|t| t.content).unwrap_or_default();
        let link = alternate_link(&feed.links).unwrap_or_default();
        let feed_updated = feed.updated;

        let items: Vec<FeedItem> = feed
            .entries
            .into_iter()
            .map(|entry| Self::parse_entry(entry, feed_updated))
            .collect();

        info!("Parsed feed [{}] with {} entries", title, items.len());

        Ok(FetchedFeed {
            title,
            link,
            update_url: update_url.to_string(),
            items,
        })
    }

    fn parse_entry(entry: Entry, feed_updated: Option<DateTime<Utc>>) -> FeedItem {
        let title = entry.title.map(|t| t.content).unwrap_or_default();
        let link = alternate_link(&entry.links).unwrap_or_default();

        let summary = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body))
            .unwrap_or_default();

        // With no date anywhere the entry counts as arbitrarily old.
        let date = entry
            .updated
            .or(entry.published)
            .or(feed_updated)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        FeedItem {
            title,
            link,
            summary,
            date,
        }
    }
}

/// The link to the human-readable page: the `alternate` (or relation-less)
/// link, otherwise the first one. Skips `self`, `enclosure` and the like.
fn alternate_link(links: &[Link]) -> Option<String> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
        .map(|l| l.href.clone())
}
