use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_FORMAT: &str = "plain";

/// One posting identity together with the feeds it republishes.
#[derive(Clone, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    /// Base URL of the Mastodon-compatible server, e.g. `https://mastodon.social`
    pub server: String,
    #[serde(rename = "accesstoken")]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
}

// Hand-written so access tokens never reach the logs.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("name", &self.name)
            .field("server", &self.server)
            .field("access_token", &"***")
            .field("visibility", &self.visibility)
            .field("feeds", &self.feeds)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    pub url: String,
    pub template: String,
    #[serde(default)]
    pub format: String,
    /// Items dated within this window of the fetch time are held back.
    #[serde(rename = "timejitter", default, with = "humantime_serde")]
    pub time_jitter: Duration,
}

/// A feed as returned for one polling cycle.
#[derive(Debug, Clone, Default)]
pub struct FetchedFeed {
    pub title: String,
    pub link: String,
    pub update_url: String,
    pub items: Vec<FeedItem>,
}

#[derive(Debug, Clone)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub summary: String,
    pub date: DateTime<Utc>,
}

/// The only data a template gets to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderableArticle {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Summary")]
    pub summary: String,
}

/// Rendered content bound to the account and feed it belongs to. Lives for one publish call.
#[derive(Debug)]
pub struct Message<'a> {
    pub account: &'a Account,
    pub feed: &'a FeedConfig,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub retry_delay_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("feed-poster/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_seconds: 30,
            max_retries: 2,
            retry_delay_seconds: 2,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PosterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("Feed {url} exceeds size limit: {size_mb}MB")]
    FeedTooLarge { url: String, size_mb: usize },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Failed parsing {what} [{url}]: {source}")]
    InvalidUrl {
        what: &'static str,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Expected at least one feed to successfully fetch for account [{account}]")]
    NoFeedsFetched { account: String },

    #[error("Failed to parse template [{template}]: {source}")]
    TemplateCompile {
        template: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("Error executing template for [{feed_url}]: {source}")]
    TemplateRender {
        feed_url: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error("No template registered for [{0}]")]
    TemplateNotFound(String),

    #[error("Failed to post message \"{content}\" for account [{account}]: {message}")]
    Publish {
        account: String,
        content: String,
        message: String,
    },

    #[error("Config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PosterError>;
