//! Remote data sources.

use crate::error::FetchError;
use crate::normalize::RawResponse;
use crate::query::QueryKey;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Header carrying the total row count on json-server style listings.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Fetches one page for a query key.
///
/// Each call performs exactly one network request. Cancellation is done by
/// dropping the returned future; the dispatcher does that when a newer query
/// supersedes this one.
#[async_trait]
pub trait RemoteDataSource: Send + Sync {
    async fn fetch(&self, key: &QueryKey) -> Result<RawResponse, FetchError>;
}

#[async_trait]
impl<S: RemoteDataSource + ?Sized> RemoteDataSource for Arc<S> {
    async fn fetch(&self, key: &QueryKey) -> Result<RawResponse, FetchError> {
        (**self).fetch(key).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
    #[error("Invalid header {name}: {reason}")]
    Header { name: String, reason: String },
    #[error("Invalid base URL: {0}")]
    BaseUrl(String),
}

/// Everything a fetch needs from its surroundings: the shared client, the API
/// root and the headers to attach. Built by the host and passed in explicitly.
#[derive(Debug, Clone)]
pub struct RequestContext {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
}

impl RequestContext {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ContextError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ContextError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ContextError::BaseUrl(base_url.to_string()));
        }
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            headers: HeaderMap::new(),
        })
    }

    /// Attach a header to every request, replacing any previous value.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ContextError> {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| ContextError::Header {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        let mut header_value = HeaderValue::from_str(value).map_err(|e| ContextError::Header {
            name: name.to_string(),
            reason: e.to_string(),
        })?;
        header_value.set_sensitive(true);
        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// `<base>/<resource>?<query>`
    pub fn url_for(&self, key: &QueryKey) -> String {
        let resource = key.resource().trim_start_matches('/');
        if key.query().is_empty() {
            format!("{}/{}", self.base_url, resource)
        } else {
            format!("{}/{}?{}", self.base_url, resource, key.query())
        }
    }
}

/// [`RemoteDataSource`] over HTTP GET.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    context: RequestContext,
}

impl HttpDataSource {
    pub fn new(context: RequestContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }
}

#[async_trait]
impl RemoteDataSource for HttpDataSource {
    async fn fetch(&self, key: &QueryKey) -> Result<RawResponse, FetchError> {
        let url = self.context.url_for(key);
        tracing::debug!(%url, "fetching page");

        let response = self
            .context
            .client
            .get(&url)
            .headers(self.context.headers.clone())
            .send()
            .await
            .map_err(transient)?;

        let status = response.status();
        let total_count = response
            .headers()
            .get(TOTAL_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let text = response.text().await.map_err(transient)?;

        if !status.is_success() {
            let message = rejection_message(&text)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            tracing::warn!(%url, status = status.as_u16(), %message, "request rejected");
            return Err(FetchError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        // Non-JSON bodies are passed through as strings; the normalizer
        // reports them as malformed.
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
        Ok(RawResponse { body, total_count })
    }
}

fn transient(err: reqwest::Error) -> FetchError {
    FetchError::Transient(err.to_string())
}

/// Server-provided message from an error body: `message`, `error`, or
/// `error.message`, else the trimmed body text.
fn rejection_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let message = serde_json::from_str::<Value>(body).ok().and_then(|value| {
        let text = |v: &Value| v.as_str().map(str::to_string);
        value
            .get("message")
            .and_then(text)
            .or_else(|| value.get("error").and_then(text))
            .or_else(|| value.pointer("/error/message").and_then(text))
    });
    Some(message.unwrap_or_else(|| body.to_string()))
}
