//! Crawler module: scheduling, fetching, and orchestration
//!
//! This module contains the crawl engine:
//! - Bounded-concurrency job queue with a cumulative cap and timeouts
//! - Rate limiting and randomized inter-request delays
//! - The fetch adapter wrapping a pluggable driver with hooks
//! - Body classification and frontier discovery
//! - The coordinator loop tying it all together

mod adapter;
mod context;
mod coordinator;
mod discover;
mod fetcher;
mod limits;
mod observer;
mod parser;
mod queue;

pub use adapter::{Driver, DriverFailure, FetchAdapter, RequestHook, ResponseHook};
pub use context::{ContentKind, InboundResponse, OutboundRequest, RequestContext};
pub use coordinator::{CrawlStats, Crawler};
pub use discover::{Discover, SelectorDiscovery};
pub use fetcher::{build_http_client, HttpDriver};
pub use limits::{DelayRange, RateLimiter};
pub use observer::CrawlObserver;
pub use parser::{json_candidates, parse_body, Document, ParsedBody};
pub use queue::{JobOutcome, JobQueue};

use crate::config::CrawlConfig;
use crate::Result;
use std::sync::Arc;

/// Runs a complete crawl with the given discovery function
///
/// Convenience wrapper over [`Crawler`] for the common case of one driver
/// and one discovery function with no hooks or observer.
///
/// # Arguments
///
/// * `config` - The run configuration
/// * `driver` - The transport performing each fetch
/// * `discover` - The frontier-discovery function
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl completed
/// * `Err(CrawlError)` - Invalid configuration or fatal job error
pub async fn crawl(
    config: CrawlConfig,
    driver: Arc<dyn Driver>,
    discover: Arc<dyn Discover>,
) -> Result<CrawlStats> {
    Crawler::new(config, driver)
        .with_discover(discover)
        .run()
        .await
}
