//! Crawl coordinator - the run state machine
//!
//! The coordinator drives a crawl run from seed to quiescence. All
//! coordination happens on one logical thread: job completions and delay
//! timers are delivered as events over a single channel, and the handlers
//! for those events are the only code touching the liveness counter, the
//! remaining-limit counter, and the rate limiter's window state.
//!
//! The liveness counter (`in_flight`) is the load-bearing piece. It is
//! incremented when a unit of work is created - the seed submission, or a
//! discovered URL entering its scheduling delay - and decremented exactly
//! once when that unit's outcome has been fully processed, including the
//! rejected-submission path. The run is finished precisely when it reaches
//! zero; a stray timer firing afterwards sends into a dropped receiver and
//! is discarded.

use crate::config::{validate, CrawlConfig};
use crate::crawler::adapter::{Driver, FetchAdapter, RequestHook, ResponseHook};
use crate::crawler::discover::Discover;
use crate::crawler::limits::{DelayRange, RateLimiter};
use crate::crawler::observer::CrawlObserver;
use crate::crawler::parser::parse_body;
use crate::crawler::queue::{JobOutcome, JobQueue};
use crate::crawler::RequestContext;
use crate::CrawlError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use url::Url;

/// Summary of one completed crawl run
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// Number of successfully fetched pages
    pub pages_fetched: u64,

    /// Number of failed jobs (driver errors and timeouts)
    pub errors: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// A configured crawl, ready to run
///
/// Built from an immutable [`CrawlConfig`] and a [`Driver`]; discovery,
/// hooks, and an observer attach through the `with_*` methods. `run()`
/// consumes the crawler, freezing everything for the duration of the run.
pub struct Crawler {
    config: CrawlConfig,
    driver: Arc<dyn Driver>,
    discover: Option<Arc<dyn Discover>>,
    request_hook: Option<RequestHook>,
    response_hook: Option<ResponseHook>,
    observer: Option<Arc<dyn CrawlObserver>>,
}

impl Crawler {
    /// Creates a crawler over `config` fetching through `driver`
    pub fn new(config: CrawlConfig, driver: Arc<dyn Driver>) -> Self {
        Self {
            config,
            driver,
            discover: None,
            request_hook: None,
            response_hook: None,
            observer: None,
        }
    }

    /// Attaches the frontier-discovery function
    ///
    /// Without one, the run is exactly one fetch of the seed.
    pub fn with_discover(mut self, discover: Arc<dyn Discover>) -> Self {
        self.discover = Some(discover);
        self
    }

    /// Attaches a hook run on each context before dispatch
    pub fn with_request_hook(mut self, hook: RequestHook) -> Self {
        self.request_hook = Some(hook);
        self
    }

    /// Attaches a hook run on each context after a successful dispatch
    pub fn with_response_hook(mut self, hook: ResponseHook) -> Self {
        self.response_hook = Some(hook);
        self
    }

    /// Attaches an observer for response/error signals
    pub fn with_observer(mut self, observer: Arc<dyn CrawlObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Runs the crawl to completion
    ///
    /// The run ends when no outstanding work remains or the cumulative
    /// limit has exhausted the frontier. Per-job errors are reported via
    /// the observer and do not end the run unless `fatal_on_error` is set,
    /// in which case the first error is returned here once in-flight and
    /// already-delayed jobs have drained.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlStats)` - The run completed
    /// * `Err(CrawlError)` - Invalid configuration, or a fatal job error
    pub async fn run(self) -> Result<CrawlStats, CrawlError> {
        validate(&self.config)?;

        let seed = Url::parse(&self.config.seed).map_err(|source| CrawlError::Seed {
            url: self.config.seed.clone(),
            source,
        })?;

        // Without discovery there is nothing past the seed; force the cap
        // to a single fetch.
        let limit = if self.discover.is_none() {
            Some(1)
        } else {
            self.config.limit
        };

        let rate = match &self.config.throttle {
            Some(throttle) => RateLimiter::new(
                throttle.requests,
                Duration::from_millis(throttle.window_ms),
            ),
            None => RateLimiter::unlimited(),
        };
        let (delay_min, delay_max) = self.config.delay.bounds();

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();

        let mut coordinator = Coordinator {
            queue: JobQueue::new(self.config.concurrency, self.config.timeout(), limit),
            rate,
            delay: DelayRange::new(delay_min, delay_max),
            adapter: FetchAdapter::with_hooks(self.driver, self.request_hook, self.response_hook),
            discover: self.discover,
            observer: self.observer,
            fatal_on_error: self.config.fatal_on_error,
            in_flight: 0,
            remaining: limit,
            fatal: None,
            stats: CrawlStats {
                pages_fetched: 0,
                errors: 0,
                elapsed: Duration::ZERO,
            },
            events_tx,
        };

        tracing::info!(
            "Starting crawl from {} (concurrency {}, limit {:?})",
            seed,
            self.config.concurrency,
            limit
        );
        let started = std::time::Instant::now();

        coordinator.in_flight += 1;
        coordinator.submit_job(seed);

        while coordinator.in_flight > 0 {
            // The coordinator holds a sender, so the channel cannot close
            // while work is outstanding.
            let Some(event) = events_rx.recv().await else {
                break;
            };

            match event {
                Event::DelayElapsed { url } => coordinator.on_delay_elapsed(url),
                Event::JobFinished(outcome) => coordinator.on_job_finished(outcome),
            }
        }

        coordinator.stats.elapsed = started.elapsed();
        tracing::info!(
            "Crawl finished: {} pages, {} errors in {:?}",
            coordinator.stats.pages_fetched,
            coordinator.stats.errors,
            coordinator.stats.elapsed
        );

        if let Some(error) = coordinator.fatal.take() {
            return Err(error);
        }
        Ok(coordinator.stats)
    }
}

enum Event {
    /// A scheduled URL's delay has elapsed; submit it to the queue
    DelayElapsed { url: Url },

    /// A submitted job reached its terminal outcome
    JobFinished(JobOutcome<RequestContext>),
}

struct Coordinator {
    queue: JobQueue,
    rate: RateLimiter,
    delay: DelayRange,
    adapter: FetchAdapter,
    discover: Option<Arc<dyn Discover>>,
    observer: Option<Arc<dyn CrawlObserver>>,
    fatal_on_error: bool,

    /// Units of work created but not yet fully processed; the run is over
    /// when this returns to zero
    in_flight: u64,

    /// Scheduling budget left under the cumulative limit
    remaining: Option<u64>,

    fatal: Option<CrawlError>,
    stats: CrawlStats,
    events_tx: mpsc::UnboundedSender<Event>,
}

impl Coordinator {
    /// Submits a job for `url`; the caller has already counted it in-flight
    fn submit_job(&mut self, url: Url) {
        let adapter = self.adapter.clone();
        let job_url = url.clone();
        let events_tx = self.events_tx.clone();

        let accepted = self.queue.submit(
            url.to_string(),
            async move { adapter.fetch(job_url).await },
            move |outcome| {
                let _ = events_tx.send(Event::JobFinished(outcome));
            },
        );

        if !accepted {
            // Undo the speculative increment, or the run never completes.
            tracing::debug!("Submission rejected at cap: {}", url);
            self.in_flight -= 1;
        }
    }

    /// A delayed URL is due: submit it
    ///
    /// Delayed jobs drain even after a fatal error; only new candidate
    /// scheduling halts.
    fn on_delay_elapsed(&mut self, url: Url) {
        self.submit_job(url);
    }

    /// Processes one job's terminal outcome
    fn on_job_finished(&mut self, outcome: JobOutcome<RequestContext>) {
        match outcome.result {
            Err(error) => {
                self.stats.errors += 1;
                tracing::warn!("Fetch failed: {}", error);
                if let Some(observer) = &self.observer {
                    observer.on_error(&error);
                }
                if self.fatal_on_error && self.fatal.is_none() {
                    tracing::error!("Halting new scheduling after fatal error");
                    self.fatal = Some(error);
                }
            }
            Ok(ctx) => {
                self.stats.pages_fetched += 1;
                tracing::debug!("Fetched {}", ctx.url);

                let body = parse_body(&ctx);
                if let Some(observer) = &self.observer {
                    observer.on_response(&body, &ctx);
                }

                if self.fatal.is_none() {
                    if let Some(discover) = self.discover.clone() {
                        for candidate in discover.discover(&body, &ctx) {
                            if self.remaining == Some(0) {
                                tracing::debug!("Limit exhausted, dropping remaining candidates");
                                break;
                            }

                            // Candidates must parse as absolute URLs; anything
                            // else is dropped silently without consuming limit.
                            let Ok(url) = Url::parse(&candidate) else {
                                tracing::debug!("Dropping invalid candidate {:?}", candidate);
                                continue;
                            };

                            if let Some(remaining) = self.remaining.as_mut() {
                                *remaining -= 1;
                            }
                            self.schedule(url);
                        }
                    }
                }
            }
        }

        self.in_flight -= 1;
    }

    /// Schedules a discovered URL behind the rate limiter and delay range
    fn schedule(&mut self, url: Url) {
        // Counted before the delay elapses so the run cannot finish while
        // this unit is pending.
        self.in_flight += 1;

        let wait = self.rate.consume() + self.delay.next();
        tracing::trace!("Scheduling {} after {:?}", url, wait);

        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            if !wait.is_zero() {
                tokio::time::sleep(wait).await;
            }
            let _ = events_tx.send(Event::DelayElapsed { url });
        });
    }
}
