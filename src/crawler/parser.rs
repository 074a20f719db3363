//! Response body parsing and classification
//!
//! Successful fetches are classified by Content-Type and wrapped in a
//! [`ParsedBody`] before discovery runs:
//! - html/xml bodies become a traversable [`Document`] that rewrites
//!   relative links to absolute against the fetch URL
//! - json bodies are decoded into a `serde_json::Value`
//! - anything else is passed through opaque

use crate::crawler::context::{ContentKind, RequestContext};
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

/// A successful fetch's body, classified and ready for discovery
#[derive(Debug, Clone)]
pub enum ParsedBody {
    /// An html or xml body wrapped for traversal
    Document(Document),

    /// A decoded json body
    Json(Value),

    /// An opaque body of some other content type
    Raw(String),

    /// The driver produced no body at all
    Empty,
}

/// A traversable html/xml document bound to its fetch URL
///
/// The underlying DOM is rebuilt on each query rather than held, keeping the
/// value cheap to pass between tasks.
#[derive(Debug, Clone)]
pub struct Document {
    html: String,
    base: Url,
}

impl Document {
    pub fn new(html: impl Into<String>, base: Url) -> Self {
        Self {
            html: html.into(),
            base,
        }
    }

    /// The raw markup
    pub fn html(&self) -> &str {
        &self.html
    }

    /// The URL relative links are resolved against
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// The page title, if present and non-empty
    pub fn title(&self) -> Option<String> {
        let document = Html::parse_document(&self.html);
        let selector = Selector::parse("title").ok()?;

        document
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// All anchor links, resolved to absolute URLs
    pub fn links(&self) -> Vec<String> {
        self.select("a[href]")
    }

    /// Evaluates a CSS selector, yielding one candidate string per match
    ///
    /// For each matched element the `href` attribute is preferred, then
    /// `src`, then the element's trimmed text. Values that resolve against
    /// the base URL are rewritten to absolute form; unresolvable values are
    /// passed through untouched so the caller's validity filter can judge
    /// them. An unparsable selector yields nothing.
    pub fn select(&self, selector: &str) -> Vec<String> {
        let Ok(selector) = Selector::parse(selector) else {
            tracing::warn!("Unparsable selector: {:?}", selector);
            return Vec::new();
        };

        let document = Html::parse_document(&self.html);
        let mut values = Vec::new();

        for element in document.select(&selector) {
            let value = element
                .value()
                .attr("href")
                .or_else(|| element.value().attr("src"))
                .map(|s| s.to_string())
                .unwrap_or_else(|| element.text().collect::<String>());
            let value = value.trim();

            if value.is_empty() {
                continue;
            }

            match resolve_link(value, &self.base) {
                Some(absolute) => values.push(absolute),
                None => values.push(value.to_string()),
            }
        }

        values
    }
}

/// Resolves a link value to an absolute URL string
///
/// Returns None for values that are not resolvable links (fragments, data
/// URIs, or text that fails to join against the base).
fn resolve_link(value: &str, base: &Url) -> Option<String> {
    if value.starts_with('#') || value.starts_with("data:") {
        return None;
    }

    // Values that already parse absolutely are kept verbatim; everything
    // else is joined against the fetch URL.
    if Url::parse(value).is_ok() {
        return Some(value.to_string());
    }

    base.join(value).ok().map(|url| url.to_string())
}

/// Classifies and parses a completed fetch's body
pub fn parse_body(ctx: &RequestContext) -> ParsedBody {
    let Some(body) = &ctx.response.body else {
        return ParsedBody::Empty;
    };

    match ctx.content_kind() {
        ContentKind::Html | ContentKind::Xml => {
            ParsedBody::Document(Document::new(body.clone(), ctx.url.clone()))
        }
        ContentKind::Json => match serde_json::from_str(body) {
            Ok(value) => ParsedBody::Json(value),
            Err(e) => {
                tracing::debug!("Undecodable json body for {}: {}", ctx.url, e);
                ParsedBody::Raw(body.clone())
            }
        },
        ContentKind::Other => ParsedBody::Raw(body.clone()),
    }
}

/// Extracts candidate strings from a json value at a pointer
///
/// A pointer resolving to an array yields its string elements; a pointer
/// resolving to a single string yields that one value. Selecting over a
/// single non-collection value is therefore well defined instead of an
/// error.
pub fn json_candidates(value: &Value, pointer: &str) -> Vec<String> {
    let Some(selected) = value.pointer(pointer) else {
        return Vec::new();
    };

    match selected {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(|s| s.to_string()))
            .collect(),
        Value::String(s) => vec![s.clone()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_url() -> Url {
        Url::parse("https://example.com/page").unwrap()
    }

    fn doc(html: &str) -> Document {
        Document::new(html, base_url())
    }

    #[test]
    fn test_extract_title() {
        let d = doc("<html><head><title>  Test Page </title></head><body></body></html>");
        assert_eq!(d.title(), Some("Test Page".to_string()));
    }

    #[test]
    fn test_no_title() {
        let d = doc("<html><head></head><body></body></html>");
        assert_eq!(d.title(), None);
    }

    #[test]
    fn test_links_absolute_kept_verbatim() {
        let d = doc(r#"<html><body><a href="https://other.com/page">Link</a></body></html>"#);
        assert_eq!(d.links(), vec!["https://other.com/page"]);
    }

    #[test]
    fn test_links_relative_rewritten() {
        let d = doc(r#"<html><body><a href="/other">Link</a></body></html>"#);
        assert_eq!(d.links(), vec!["https://example.com/other"]);
    }

    #[test]
    fn test_links_path_relative_rewritten() {
        let d = doc(r#"<html><body><a href="other">Link</a></body></html>"#);
        assert_eq!(d.links(), vec!["https://example.com/other"]);
    }

    #[test]
    fn test_fragment_links_passed_through_raw() {
        let d = doc(r##"<html><body><a href="#section">Jump</a></body></html>"##);
        // Fragment values don't resolve; the orchestrator filter drops them.
        assert_eq!(d.links(), vec!["#section"]);
    }

    #[test]
    fn test_select_prefers_href_then_src() {
        let d = doc(r#"<html><body><img src="/pic.png"><a href="/a">x</a></body></html>"#);
        assert_eq!(d.select("img"), vec!["https://example.com/pic.png"]);
        assert_eq!(d.select("a"), vec!["https://example.com/a"]);
    }

    #[test]
    fn test_select_falls_back_to_text() {
        let d = doc(r#"<html><body><span class="u">https://x.test/p</span></body></html>"#);
        assert_eq!(d.select("span.u"), vec!["https://x.test/p"]);
    }

    #[test]
    fn test_select_bad_selector_yields_nothing() {
        let d = doc("<html><body><a href='/a'>x</a></body></html>");
        assert!(d.select("[[[").is_empty());
    }

    #[test]
    fn test_parse_body_html() {
        let mut ctx = RequestContext::new(base_url());
        ctx.response.content_type = Some("text/html".to_string());
        ctx.response.body = Some("<html></html>".to_string());

        assert!(matches!(parse_body(&ctx), ParsedBody::Document(_)));
    }

    #[test]
    fn test_parse_body_json() {
        let mut ctx = RequestContext::new(base_url());
        ctx.response.content_type = Some("application/json".to_string());
        ctx.response.body = Some(r#"{"next": "https://example.com/2"}"#.to_string());

        match parse_body(&ctx) {
            ParsedBody::Json(value) => {
                assert_eq!(value["next"], "https://example.com/2");
            }
            other => panic!("expected json body, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_body_broken_json_falls_back_to_raw() {
        let mut ctx = RequestContext::new(base_url());
        ctx.response.content_type = Some("application/json".to_string());
        ctx.response.body = Some("{not json".to_string());

        assert!(matches!(parse_body(&ctx), ParsedBody::Raw(_)));
    }

    #[test]
    fn test_parse_body_opaque() {
        let mut ctx = RequestContext::new(base_url());
        ctx.response.content_type = Some("image/png".to_string());
        ctx.response.body = Some("binaryish".to_string());

        assert!(matches!(parse_body(&ctx), ParsedBody::Raw(_)));
    }

    #[test]
    fn test_parse_body_empty() {
        let ctx = RequestContext::new(base_url());
        assert!(matches!(parse_body(&ctx), ParsedBody::Empty));
    }

    #[test]
    fn test_json_candidates_array() {
        let value = json!({"links": ["https://a.test/", "https://b.test/"]});
        assert_eq!(
            json_candidates(&value, "/links"),
            vec!["https://a.test/", "https://b.test/"]
        );
    }

    #[test]
    fn test_json_candidates_single_string() {
        let value = json!({"next": "https://a.test/2"});
        assert_eq!(json_candidates(&value, "/next"), vec!["https://a.test/2"]);
    }

    #[test]
    fn test_json_candidates_missing_pointer() {
        let value = json!({"next": "https://a.test/2"});
        assert!(json_candidates(&value, "/absent").is_empty());
    }

    #[test]
    fn test_json_candidates_non_string_values_skipped() {
        let value = json!({"links": ["https://a.test/", 42, null]});
        assert_eq!(json_candidates(&value, "/links"), vec!["https://a.test/"]);
    }
}
