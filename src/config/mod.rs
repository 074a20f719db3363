//! Configuration module for kumo-crawl
//!
//! This module handles loading, parsing, and validating TOML run
//! configurations, and defines the plain-data [`CrawlConfig`] consumed by
//! [`crate::Crawler`] at run start.
//!
//! # Example
//!
//! ```no_run
//! use kumo_crawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.toml")).unwrap();
//! println!("Crawling {} with concurrency {}", config.seed, config.concurrency);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CrawlConfig, DelayConfig, ThrottleConfig};

// Re-export parser and validation functions
pub use parser::load_config;
pub use validation::validate;
