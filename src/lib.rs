//! Kumo: a concurrency-bounded, rate-limited crawl scheduler
//!
//! This crate implements the orchestration engine of a crawler: a bounded
//! concurrency job queue with a cumulative job cap and per-job timeouts, a
//! rate limiter and randomized delay generator, and a coordinator loop that
//! ties fetch → classify → discover → schedule together until no outstanding
//! work remains.
//!
//! The transport is a pluggable [`Driver`] (a default [`HttpDriver`] built on
//! reqwest is provided), and frontier discovery is a pluggable [`Discover`]
//! function or a declarative [`SelectorDiscovery`]. Discovered URLs are not
//! deduplicated; repeats are fetched repeatedly by design.
//!
//! ```no_run
//! use std::sync::Arc;
//! use kumo_crawl::{CrawlConfig, Crawler, HttpDriver, SelectorDiscovery};
//!
//! # async fn example() -> kumo_crawl::Result<()> {
//! let mut config = CrawlConfig::new("https://example.com/");
//! config.concurrency = 4;
//! config.limit = Some(100);
//!
//! let driver = Arc::new(HttpDriver::new("kumo/0.1")?);
//! let stats = Crawler::new(config, driver)
//!     .with_discover(Arc::new(SelectorDiscovery::new("a[href]")))
//!     .run()
//!     .await?;
//! println!("fetched {} pages", stats.pages_fetched);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crawler;

use thiserror::Error;

/// Main error type for crawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Driver error for {url}: {source}")]
    Driver {
        url: String,
        source: crawler::DriverFailure,
    },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Invalid seed URL {url}: {source}")]
    Seed {
        url: String,
        source: url::ParseError,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

impl CrawlError {
    /// Returns the URL this error is attached to, if any
    pub fn url(&self) -> Option<&str> {
        match self {
            CrawlError::Driver { url, .. }
            | CrawlError::Timeout { url }
            | CrawlError::Seed { url, .. } => Some(url),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for crawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{load_config, CrawlConfig, DelayConfig, ThrottleConfig};
pub use crawler::{
    json_candidates, ContentKind, CrawlObserver, CrawlStats, Crawler, Discover, Document, Driver,
    DriverFailure, FetchAdapter, HttpDriver, ParsedBody, RequestContext, SelectorDiscovery,
};
