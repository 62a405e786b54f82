use crate::config::Config;
use crate::pipeline::{FeedPipeline, FeedStats, RunContext};
use crate::template::TemplateRegistry;
use crate::traits::{FeedSource, Publisher};
use crate::types::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Publish as usual but leave the run state alone.
    pub dry_run: bool,
    /// Reprocess stale items and leave the run state alone.
    pub debug: bool,
}

impl RunOptions {
    pub fn persists_state(&self) -> bool {
        !(self.dry_run || self.debug)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub accounts: usize,
    pub stats: FeedStats,
    /// Whether `lastupdated` was moved forward and saved.
    pub state_advanced: bool,
}

/// Drives one complete pass over every configured account.
pub struct RunCoordinator {
    source: Arc<dyn FeedSource>,
    publisher: Arc<dyn Publisher>,
    options: RunOptions,
}

impl RunCoordinator {
    pub fn new(source: Arc<dyn FeedSource>, publisher: Arc<dyn Publisher>, options: RunOptions) -> Self {
        Self {
            source,
            publisher,
            options,
        }
    }

    /// Run one pass. Templates are compiled before anything is fetched; the
    /// first fatal error ends the pass and is returned untouched. Only a pass
    /// that finishes, outside dry-run and debug mode, advances and saves the
    /// run state.
    pub async fn run(&self, config: &mut Config) -> Result<RunSummary> {
        let started = Utc::now();
        let templates = TemplateRegistry::compile(&mut config.accounts)?;

        let context = RunContext {
            last_run: config.state.last_updated,
            debug: self.options.debug,
        };
        let pipeline = FeedPipeline::new(
            self.source.as_ref(),
            self.publisher.as_ref(),
            &templates,
            context,
        );

        let mut summary = RunSummary::default();
        for account in &config.accounts {
            summary.stats += pipeline.process_account(account).await?;
            summary.accounts += 1;
        }

        if self.options.persists_state() {
            config.state.advance(started);
            config.save()?;
            summary.state_advanced = true;
        } else {
            info!(
                "Dry run or debug run: last updated time stays at {:?}",
                config.state.last_updated
            );
        }

        Ok(summary)
    }
}
