//! HTTP wiring: turns console config into the grid's request context.

use crate::config::TuiConfig;
use registrar_grid::{ContextError, HttpDataSource, RemoteDataSource, RequestContext};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ApiClientError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Request context error: {0}")]
    Context(#[from] ContextError),
}

/// Shared client, base URL, timeout, and the auth header every request carries.
pub fn request_context(config: &TuiConfig) -> Result<RequestContext, ApiClientError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.request_timeout_ms))
        .build()?;
    let context = RequestContext::with_client(client, &config.api_base_url)?
        .with_header(config.auth.header.trim(), config.auth.token.trim())?;
    Ok(context)
}

pub fn data_source(config: &TuiConfig) -> Result<Arc<dyn RemoteDataSource>, ApiClientError> {
    let context = request_context(config)?;
    tracing::info!(base_url = context.base_url(), "http data source ready");
    Ok(Arc::new(HttpDataSource::new(context)))
}
