//! Per-job request context
//!
//! A [`RequestContext`] is created fresh for every job and discarded once
//! its completion has been processed. The request hook may mutate the
//! outbound descriptor before dispatch (or pre-populate the response body to
//! short-circuit the driver entirely), and the response hook may mutate the
//! inbound descriptor after dispatch.

use std::collections::HashMap;
use url::Url;

/// Content classification derived from the response Content-Type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Xml,
    Json,
    Other,
}

/// The outbound request descriptor, mutable by the request hook
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// HTTP method, defaults to GET
    pub method: String,

    /// Headers to send with the request
    pub headers: HashMap<String, String>,
}

impl Default for OutboundRequest {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            headers: HashMap::new(),
        }
    }
}

/// The inbound response descriptor, populated by the driver
#[derive(Debug, Clone, Default)]
pub struct InboundResponse {
    /// HTTP status code, if the driver got that far
    pub status: Option<u16>,

    /// Response headers
    pub headers: HashMap<String, String>,

    /// Content-Type header value
    pub content_type: Option<String>,

    /// Response body
    pub body: Option<String>,
}

/// One fetch cycle's state: the URL, what goes out, and what came back
#[derive(Debug)]
pub struct RequestContext {
    /// The URL being fetched
    pub url: Url,

    /// Outbound descriptor
    pub request: OutboundRequest,

    /// Inbound descriptor
    pub response: InboundResponse,
}

impl RequestContext {
    /// Creates a fresh context for one fetch of `url`
    pub fn new(url: Url) -> Self {
        Self {
            url,
            request: OutboundRequest::default(),
            response: InboundResponse::default(),
        }
    }

    /// Classifies the response by its Content-Type header
    ///
    /// A missing Content-Type classifies as [`ContentKind::Other`]; the body
    /// is then treated as opaque.
    pub fn content_kind(&self) -> ContentKind {
        let Some(content_type) = &self.response.content_type else {
            return ContentKind::Other;
        };

        let content_type = content_type.to_ascii_lowercase();
        if content_type.contains("html") {
            ContentKind::Html
        } else if content_type.contains("json") {
            ContentKind::Json
        } else if content_type.contains("xml") {
            ContentKind::Xml
        } else {
            ContentKind::Other
        }
    }
}
