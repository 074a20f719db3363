use serde::Deserialize;
use std::time::Duration;

/// Run configuration for a crawl
///
/// This is a plain data value: build it in code or load it from a TOML file
/// with [`crate::config::load_config`]. The running crawl takes an immutable
/// snapshot of it at start, so mutating a config after `run()` has been
/// called has no effect on that run.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// The URL the crawl starts from
    pub seed: String,

    /// Maximum number of jobs running concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Cumulative cap on accepted jobs; `None` means unbounded
    ///
    /// Forced to 1 at run start when no discovery function is configured.
    #[serde(default)]
    pub limit: Option<u64>,

    /// Per-job timeout in milliseconds; `None` disables the timeout
    #[serde(rename = "timeout-ms", default)]
    pub timeout_ms: Option<u64>,

    /// Rate limit on request starts; `None` means unlimited
    #[serde(default)]
    pub throttle: Option<ThrottleConfig>,

    /// Randomized additional wait applied to every scheduled job
    #[serde(default)]
    pub delay: DelayConfig,

    /// Escalate the first per-job error to the caller and stop scheduling
    #[serde(rename = "fatal-on-error", default)]
    pub fatal_on_error: bool,
}

/// Rate limit configuration: at most `requests` starts per `window_ms`
#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    pub requests: u32,

    #[serde(rename = "window-ms")]
    pub window_ms: u64,
}

/// Inter-request delay range in milliseconds
///
/// Each scheduled job waits an extra duration sampled uniformly from
/// `[min_ms, max_ms]`. When `max_ms` is absent it defaults to `min_ms`,
/// making the delay deterministic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DelayConfig {
    #[serde(rename = "min-ms", default)]
    pub min_ms: u64,

    #[serde(rename = "max-ms", default)]
    pub max_ms: Option<u64>,
}

fn default_concurrency() -> usize {
    10
}

impl CrawlConfig {
    /// Creates a configuration with defaults for everything but the seed
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            concurrency: default_concurrency(),
            limit: None,
            timeout_ms: None,
            throttle: None,
            delay: DelayConfig::default(),
            fatal_on_error: false,
        }
    }

    /// The per-job timeout as a duration, if enabled
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl DelayConfig {
    /// The `[min, max]` delay bounds as durations, with `max` defaulting to `min`
    pub fn bounds(&self) -> (Duration, Duration) {
        let min = Duration::from_millis(self.min_ms);
        let max = Duration::from_millis(self.max_ms.unwrap_or(self.min_ms));
        (min, max)
    }
}
