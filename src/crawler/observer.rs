//! Observable crawl signals
//!
//! An observer receives one `on_response` per successful fetch (with the
//! parsed body and its context) and one `on_error` per failed job (the
//! error carries the offending URL). Callbacks run on the coordinator's
//! logical thread, so they should stay cheap.

use crate::crawler::context::RequestContext;
use crate::crawler::parser::ParsedBody;
use crate::CrawlError;

/// Receives crawl signals; all methods default to no-ops
pub trait CrawlObserver: Send + Sync {
    /// Fired once per successful fetch, before discovery runs
    fn on_response(&self, _body: &ParsedBody, _ctx: &RequestContext) {}

    /// Fired once per failed job; the error carries the offending URL
    fn on_error(&self, _error: &CrawlError) {}
}
