//! Default HTTP driver
//!
//! A reqwest-backed [`Driver`] for the common case. It issues the request
//! described by the outbound descriptor and copies status, headers, content
//! type, and body into the inbound descriptor. Like any driver it does no
//! retrying and runs no hooks; replace it wholesale to use a different
//! transport.

use crate::crawler::adapter::{Driver, DriverFailure};
use crate::crawler::context::RequestContext;
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;

/// Builds an HTTP client with sane crawl defaults
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header to send on every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// The default reqwest-backed driver
pub struct HttpDriver {
    client: Client,
}

impl HttpDriver {
    /// Creates a driver with a freshly built client
    pub fn new(user_agent: &str) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent)?,
        })
    }

    /// Wraps an existing client, keeping its configuration
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Driver for HttpDriver {
    async fn dispatch(&self, ctx: &mut RequestContext) -> Result<(), DriverFailure> {
        let method =
            Method::from_bytes(ctx.request.method.as_bytes()).unwrap_or(Method::GET);

        let mut request = self.client.request(method, ctx.url.clone());
        for (name, value) in &ctx.request.headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;

        ctx.response.status = Some(response.status().as_u16());
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                ctx.response
                    .headers
                    .insert(name.as_str().to_string(), value.to_string());
            }
        }
        ctx.response.content_type = ctx.response.headers.get("content-type").cloned();

        let body = response.text().await?;
        ctx.response.body = Some(body);

        Ok(())
    }
}
