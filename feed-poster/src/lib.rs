pub mod types;
pub mod traits;
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod sources;
pub mod template;
pub mod freshness;
pub mod pipeline;
pub mod publisher;
pub mod coordinator;

pub use types::*;
pub use traits::{FeedSource, Publisher};
pub use config::{read_config, Config, RunState};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use sources::HttpFeedSource;
pub use template::TemplateRegistry;
pub use freshness::{classify, Freshness};
pub use pipeline::{FeedPipeline, FeedStats, RunContext};
pub use publisher::MastodonPublisher;
pub use coordinator::{RunCoordinator, RunOptions, RunSummary};
