//! Fetch adapter: hooks around a pluggable driver
//!
//! One fetch cycle is: build a fresh context → request hook → driver
//! dispatch → response hook. The request hook runs synchronously before
//! dispatch and may pre-populate the response body, in which case the driver
//! is skipped entirely (replay mode, used heavily in tests). On driver
//! failure the response hook does not run and the error is returned tagged
//! with the offending URL.

use crate::crawler::context::RequestContext;
use crate::CrawlError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Error reported by a [`Driver`] implementation
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DriverFailure {
    message: String,
}

impl DriverFailure {
    /// Creates a driver failure from any displayable message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for DriverFailure {
    fn from(error: reqwest::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// The pluggable transport: performs one request described by the context
///
/// A driver reads the outbound descriptor and populates the inbound one in
/// place. It never runs hooks and never retries; that is the adapter's and
/// the caller's business respectively.
#[async_trait]
pub trait Driver: Send + Sync {
    async fn dispatch(&self, ctx: &mut RequestContext) -> Result<(), DriverFailure>;
}

/// Synchronous mutator run on the context before dispatch
pub type RequestHook = Arc<dyn Fn(&mut RequestContext) + Send + Sync>;

/// Synchronous mutator run on the context after a successful dispatch
pub type ResponseHook = Arc<dyn Fn(&mut RequestContext) + Send + Sync>;

/// Runs one full fetch cycle per job
///
/// Cheap to clone; every queued job owns a clone so the fetch future is
/// `'static`.
#[derive(Clone)]
pub struct FetchAdapter {
    driver: Arc<dyn Driver>,
    request_hook: Option<RequestHook>,
    response_hook: Option<ResponseHook>,
}

impl FetchAdapter {
    /// Creates an adapter with no hooks
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            request_hook: None,
            response_hook: None,
        }
    }

    /// Creates an adapter with optional request/response hooks
    pub fn with_hooks(
        driver: Arc<dyn Driver>,
        request_hook: Option<RequestHook>,
        response_hook: Option<ResponseHook>,
    ) -> Self {
        Self {
            driver,
            request_hook,
            response_hook,
        }
    }

    /// Performs one fetch cycle for `url`
    ///
    /// # Returns
    ///
    /// * `Ok(RequestContext)` - The populated context after hooks
    /// * `Err(CrawlError::Driver)` - The driver failed; no response hook ran
    pub async fn fetch(&self, url: Url) -> Result<RequestContext, CrawlError> {
        let mut ctx = RequestContext::new(url);

        if let Some(hook) = &self.request_hook {
            hook(&mut ctx);
        }

        // A body seeded by the request hook short-circuits the driver.
        if ctx.response.body.is_none() {
            self.driver
                .dispatch(&mut ctx)
                .await
                .map_err(|source| CrawlError::Driver {
                    url: ctx.url.to_string(),
                    source,
                })?;
        } else {
            tracing::trace!("Replaying pre-populated body for {}", ctx.url);
        }

        if let Some(hook) = &self.response_hook {
            hook(&mut ctx);
        }

        Ok(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Driver serving a canned body, counting dispatches
    struct CannedDriver {
        body: Option<String>,
        dispatches: AtomicUsize,
    }

    impl CannedDriver {
        fn new(body: Option<&str>) -> Self {
            Self {
                body: body.map(|s| s.to_string()),
                dispatches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Driver for CannedDriver {
        async fn dispatch(&self, ctx: &mut RequestContext) -> Result<(), DriverFailure> {
            self.dispatches.fetch_add(1, Ordering::SeqCst);
            match &self.body {
                Some(body) => {
                    ctx.response.status = Some(200);
                    ctx.response.content_type = Some("text/html".to_string());
                    ctx.response.body = Some(body.clone());
                    Ok(())
                }
                None => Err(DriverFailure::new("connection refused")),
            }
        }
    }

    fn url() -> Url {
        Url::parse("https://example.com/").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_populates_context() {
        let driver = Arc::new(CannedDriver::new(Some("<html></html>")));
        let adapter = FetchAdapter::new(driver.clone());

        let ctx = adapter.fetch(url()).await.unwrap();
        assert_eq!(ctx.response.status, Some(200));
        assert_eq!(ctx.response.body.as_deref(), Some("<html></html>"));
        assert_eq!(driver.dispatches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_hook_mutates_outbound() {
        let driver = Arc::new(CannedDriver::new(Some("ok")));
        let adapter = FetchAdapter::with_hooks(
            driver,
            Some(Arc::new(|ctx: &mut RequestContext| {
                ctx.request
                    .headers
                    .insert("x-trace".to_string(), "1".to_string());
            })),
            None,
        );

        let ctx = adapter.fetch(url()).await.unwrap();
        assert_eq!(ctx.request.headers.get("x-trace").map(String::as_str), Some("1"));
    }

    #[tokio::test]
    async fn test_seeded_body_skips_driver() {
        let driver = Arc::new(CannedDriver::new(Some("from driver")));
        let adapter = FetchAdapter::with_hooks(
            driver.clone(),
            Some(Arc::new(|ctx: &mut RequestContext| {
                ctx.response.content_type = Some("text/html".to_string());
                ctx.response.body = Some("replayed".to_string());
            })),
            None,
        );

        let ctx = adapter.fetch(url()).await.unwrap();
        assert_eq!(ctx.response.body.as_deref(), Some("replayed"));
        assert_eq!(driver.dispatches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_response_hook_runs_on_success() {
        let driver = Arc::new(CannedDriver::new(Some("ok")));
        let adapter = FetchAdapter::with_hooks(
            driver,
            None,
            Some(Arc::new(|ctx: &mut RequestContext| {
                ctx.response.content_type = Some("application/json".to_string());
            })),
        );

        let ctx = adapter.fetch(url()).await.unwrap();
        assert_eq!(
            ctx.response.content_type.as_deref(),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_driver_failure_skips_response_hook() {
        let hook_runs = Arc::new(AtomicUsize::new(0));
        let hook_runs_clone = Arc::clone(&hook_runs);

        let driver = Arc::new(CannedDriver::new(None));
        let adapter = FetchAdapter::with_hooks(
            driver,
            None,
            Some(Arc::new(move |_ctx: &mut RequestContext| {
                hook_runs_clone.fetch_add(1, Ordering::SeqCst);
            })),
        );

        let err = adapter.fetch(url()).await.unwrap_err();
        assert!(matches!(err, CrawlError::Driver { ref url, .. } if url == "https://example.com/"));
        assert_eq!(hook_runs.load(Ordering::SeqCst), 0);
    }
}
