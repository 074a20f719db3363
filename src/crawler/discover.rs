//! Frontier discovery
//!
//! Discovery turns one fetched page into zero or more candidate URLs. It is
//! a plain synchronous function of the parsed body and its context; the
//! coordinator filters the returned candidates and does all scheduling.
//! Candidates are not deduplicated, so a discovery function returning the
//! same URL twice causes two fetches.

use crate::crawler::context::RequestContext;
use crate::crawler::parser::{Document, ParsedBody};

/// Produces candidate URLs from one fetched page
pub trait Discover: Send + Sync {
    fn discover(&self, body: &ParsedBody, ctx: &RequestContext) -> Vec<String>;
}

impl<F> Discover for F
where
    F: Fn(&ParsedBody, &RequestContext) -> Vec<String> + Send + Sync,
{
    fn discover(&self, body: &ParsedBody, ctx: &RequestContext) -> Vec<String> {
        self(body, ctx)
    }
}

/// Declarative discovery from a CSS selector
///
/// Evaluates the selector against html/xml bodies via [`Document::select`];
/// other body kinds yield no candidates. This is the compiled form of
/// "follow everything matching this selector".
#[derive(Debug, Clone)]
pub struct SelectorDiscovery {
    selector: String,
}

impl SelectorDiscovery {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
        }
    }
}

impl Discover for SelectorDiscovery {
    fn discover(&self, body: &ParsedBody, _ctx: &RequestContext) -> Vec<String> {
        match body {
            ParsedBody::Document(document) => document.select(&self.selector),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn html_body(html: &str) -> ParsedBody {
        ParsedBody::Document(Document::new(
            html,
            Url::parse("https://example.com/").unwrap(),
        ))
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Url::parse("https://example.com/").unwrap())
    }

    #[test]
    fn test_selector_discovery_on_document() {
        let discovery = SelectorDiscovery::new("a.next");
        let body = html_body(r#"<a class="next" href="/page/2">next</a><a href="/other">x</a>"#);

        assert_eq!(
            discovery.discover(&body, &ctx()),
            vec!["https://example.com/page/2"]
        );
    }

    #[test]
    fn test_selector_discovery_ignores_non_documents() {
        let discovery = SelectorDiscovery::new("a");
        assert!(discovery
            .discover(&ParsedBody::Raw("text".to_string()), &ctx())
            .is_empty());
        assert!(discovery.discover(&ParsedBody::Empty, &ctx()).is_empty());
    }

    #[test]
    fn test_closure_discovery() {
        let discovery = |_body: &ParsedBody, _ctx: &RequestContext| {
            vec!["https://example.com/fixed".to_string()]
        };

        assert_eq!(
            Discover::discover(&discovery, &ParsedBody::Empty, &ctx()),
            vec!["https://example.com/fixed"]
        );
    }
}
