use crate::freshness::{classify, Freshness};
use crate::template::TemplateRegistry;
use crate::traits::{FeedSource, Publisher};
use crate::types::{
    Account, FeedConfig, FeedItem, FetchedFeed, Message, PosterError, RenderableArticle, Result,
};
use chrono::{DateTime, Utc};
use std::ops::AddAssign;
use tracing::{debug, info, warn};
use url::Url;

/// What the freshness decision needs to know about the run as a whole.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunContext {
    /// Start of the last successful run, `None` if there never was one.
    pub last_run: Option<DateTime<Utc>>,
    /// Bypasses the staleness check so old items can be reprocessed.
    pub debug: bool,
}

/// Counters for what happened to the feeds of one or more accounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub feeds_fetched: usize,
    pub feeds_failed: usize,
    pub feeds_empty: usize,
    pub items_stale: usize,
    pub items_too_close: usize,
    pub published: usize,
}

impl AddAssign for FeedStats {
    fn add_assign(&mut self, other: Self) {
        self.feeds_fetched += other.feeds_fetched;
        self.feeds_failed += other.feeds_failed;
        self.feeds_empty += other.feeds_empty;
        self.items_stale += other.items_stale;
        self.items_too_close += other.items_too_close;
        self.published += other.published;
    }
}

/// Fetch, decide, render and publish for the feeds of one account.
///
/// Fetch failures only skip the feed that failed. Everything else that goes
/// wrong (no feed fetched at all, unparseable URLs, template execution,
/// publishing) is returned as an error and ends the run.
pub struct FeedPipeline<'a> {
    source: &'a dyn FeedSource,
    publisher: &'a dyn Publisher,
    templates: &'a TemplateRegistry,
    context: RunContext,
}

impl<'a> FeedPipeline<'a> {
    pub fn new(
        source: &'a dyn FeedSource,
        publisher: &'a dyn Publisher,
        templates: &'a TemplateRegistry,
        context: RunContext,
    ) -> Self {
        Self {
            source,
            publisher,
            templates,
            context,
        }
    }

    pub async fn process_account(&self, account: &Account) -> Result<FeedStats> {
        let mut stats = FeedStats::default();

        info!("Fetching feeds for account [{}]...", account.name);
        let mut fetched: Vec<(&FeedConfig, FetchedFeed)> = Vec::new();
        for source in &account.feeds {
            debug!("source: {:?}", source);
            match self.source.fetch(&source.url).await {
                Ok(feed) => {
                    info!("Fetched [{}]", feed.title);
                    stats.feeds_fetched += 1;
                    fetched.push((source, feed));
                }
                Err(e) => {
                    warn!("Error fetching {}: {}", source.url, e);
                    stats.feeds_failed += 1;
                }
            }
        }

        if fetched.is_empty() {
            return Err(PosterError::NoFeedsFetched {
                account: account.name.clone(),
            });
        }

        for (source, feed) in &fetched {
            self.process_feed(account, source, feed, &mut stats).await?;
        }

        Ok(stats)
    }

    async fn process_feed(
        &self,
        account: &Account,
        source: &FeedConfig,
        feed: &FetchedFeed,
        stats: &mut FeedStats,
    ) -> Result<()> {
        let Some(item) = most_recent(&feed.items) else {
            warn!("Warning: feed {} has no items.", feed.title);
            stats.feeds_empty += 1;
            return Ok(());
        };
        if feed.items.len() > 1 {
            debug!(
                "Feed {} carries {} items, keeping only the most recent",
                feed.title,
                feed.items.len()
            );
        }

        let base = Url::parse(&feed.update_url).map_err(|e| PosterError::InvalidUrl {
            what: "update URL of the feed",
            url: feed.update_url.clone(),
            source: e,
        })?;
        let feed_link = base.join(&feed.link).map_err(|e| PosterError::InvalidUrl {
            what: "canonical feed URL of the feed",
            url: feed.link.clone(),
            source: e,
        })?;

        let current_time = Utc::now();
        info!(
            "Current Time: {}  LastProgramRunTime: {:?} LastItemTime: {}",
            current_time, self.context.last_run, item.date
        );

        match classify(
            item.date,
            self.context.last_run,
            current_time,
            source.time_jitter,
            self.context.debug,
        ) {
            Freshness::Stale => {
                info!("No new items. Skipping.");
                stats.items_stale += 1;
            }
            Freshness::TooCloseToFetchTime => {
                info!("Item time is close to fetch time");
                stats.items_too_close += 1;
            }
            Freshness::Fresh => {
                let item_link = base.join(&item.link).map_err(|e| PosterError::InvalidUrl {
                    what: "article URL of the feed item",
                    url: item.link.clone(),
                    source: e,
                })?;

                info!(
                    "Item Data:\n\tTimestamp: {}\n\tSite URL: {}\n\tFeed Title: {}\n\tItem Title: {}\n\tItem URL: {}",
                    item.date, feed_link, feed.title, item.title, item_link
                );

                let article = RenderableArticle {
                    title: item.title.clone(),
                    url: item_link.to_string(),
                    summary: item.summary.clone(),
                };
                let content = self.templates.render(&source.url, &article)?;

                let message = Message {
                    account,
                    feed: source,
                    content,
                };
                self.publisher.post(&message).await?;
                stats.published += 1;
            }
        }

        Ok(())
    }
}

/// The latest-dated item; on equal dates the one listed first wins.
pub fn most_recent(items: &[FeedItem]) -> Option<&FeedItem> {
    items
        .iter()
        .reduce(|best, item| if item.date > best.date { item } else { best })
}
