#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use feed_poster::{Config, FeedItem, FeedSource, FetchedFeed, Message, PosterError, Publisher, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, Once};
use uuid::Uuid;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

pub fn ago(seconds: i64) -> DateTime<Utc> {
    Utc::now() - Duration::seconds(seconds)
}

pub fn item(title: &str, link: &str, date: DateTime<Utc>) -> FeedItem {
    FeedItem {
        title: title.to_string(),
        link: link.to_string(),
        summary: format!("Summary of {}", title),
        date,
    }
}

pub fn feed(url: &str, items: Vec<FeedItem>) -> FetchedFeed {
    FetchedFeed {
        title: format!("Feed at {}", url),
        link: "/".to_string(),
        update_url: url.to_string(),
        items,
    }
}

/// In-memory feed source. URLs without a registered feed fail to fetch.
#[derive(Default)]
pub struct FakeSource {
    feeds: HashMap<String, FetchedFeed>,
    pub fetched: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feed(self, feed: FetchedFeed) -> Self {
        let url = feed.update_url.clone();
        self.with_feed_at(&url, feed)
    }

    /// Serve `feed` for `url` even if the feed reports a different update URL.
    pub fn with_feed_at(mut self, url: &str, feed: FetchedFeed) -> Self {
        self.feeds.insert(url.to_string(), feed);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched.lock().unwrap().len()
    }
}

#[async_trait]
impl FeedSource for FakeSource {
    async fn fetch(&self, url: &str) -> Result<FetchedFeed> {
        self.fetched.lock().unwrap().push(url.to_string());
        self.feeds.get(url).cloned().ok_or_else(|| PosterError::Fetch {
            url: url.to_string(),
            message: "connection refused".to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posted {
    pub account: String,
    pub feed_url: String,
    pub format: String,
    pub content: String,
}

#[derive(Default)]
pub struct FakePublisher {
    pub posted: Mutex<Vec<Posted>>,
    fail: bool,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            posted: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn posted(&self) -> Vec<Posted> {
        self.posted.lock().unwrap().clone()
    }
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn post(&self, message: &Message<'_>) -> Result<()> {
        if self.fail {
            return Err(PosterError::Publish {
                account: message.account.name.clone(),
                content: message.content.clone(),
                message: "HTTP 422 Unprocessable Entity: Validation failed".to_string(),
            });
        }
        self.posted.lock().unwrap().push(Posted {
            account: message.account.name.clone(),
            feed_url: message.feed.url.clone(),
            format: message.feed.format.clone(),
            content: message.content.clone(),
        });
        Ok(())
    }
}

pub fn temp_config_path() -> PathBuf {
    std::env::temp_dir().join(format!("feed-poster-test-{}.yaml", Uuid::new_v4()))
}

/// Build a config backed by a fresh temp file path (not yet written).
pub fn config_from_yaml(yaml: &str) -> Config {
    Config::from_yaml(yaml, temp_config_path()).expect("valid test config")
}
