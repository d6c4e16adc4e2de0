// src/services/changes.rs

//! Recent changes feed client.
//!
//! Turns one window into one `list=recentchanges` query and classifies the
//! answer as a batch, a failed request, a saturated window or a malformed body.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{FetchError, Result};
use crate::models::{ApiConfig, RecordBatch, WindowSpec};
use crate::utils::http;

/// Properties requested for every change.
pub const RC_PROPERTIES: &str = "title|timestamp|userid|user|comment|flags|sizes";

/// Anything that can return the raw rows for one window.
#[async_trait]
pub trait ChangeSource: Send + Sync {
    async fn fetch(&self, window: &WindowSpec) -> std::result::Result<RecordBatch, FetchError>;
}

/// HTTP client for the MediaWiki recent changes list.
pub struct ChangeFeedClient {
    config: Arc<ApiConfig>,
    client: Client,
}

impl ChangeFeedClient {
    /// Create a new client with the given configuration.
    pub fn new(config: Arc<ApiConfig>) -> Result<Self> {
        let client = http::create_async_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl ChangeSource for ChangeFeedClient {
    async fn fetch(&self, window: &WindowSpec) -> std::result::Result<RecordBatch, FetchError> {
        let params = request_params(window, self.config.limit);
        log::debug!("Request parameters: {:?}", params);

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            log::error!("API request failed with status {}", status.as_u16());
            log::error!("Response text: {}", body);
            return Err(FetchError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let batch = parse_response(*window, &body, self.config.limit)?;
        log::info!("Window {} returned {} records", window, batch.len());
        Ok(batch)
    }
}

/// Query parameters for one window.
///
/// `rcstart` is the later bound and `rcend` the earlier one: the API lists
/// changes newest first.
pub fn request_params(window: &WindowSpec, limit: u32) -> Vec<(&'static str, String)> {
    vec![
        ("action", "query".to_string()),
        ("format", "json".to_string()),
        ("list", "recentchanges".to_string()),
        ("rcstart", window.rcstart()),
        ("rcend", window.rcend()),
        ("rclimit", limit.to_string()),
        ("rcprop", RC_PROPERTIES.to_string()),
    ]
}

/// Extract `query.recentchanges` from a successful response body.
///
/// A batch holding exactly `limit` rows is rejected as saturated: the API
/// stops at the cap without saying whether more rows exist.
pub fn parse_response(
    window: WindowSpec,
    body: &str,
    limit: u32,
) -> std::result::Result<RecordBatch, FetchError> {
    let mut envelope: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::MalformedResponse(format!("body is not JSON: {e}")))?;

    if let Some(error) = envelope.get("error") {
        let code = error.get("code").and_then(Value::as_str).unwrap_or("unknown");
        let info = error.get("info").and_then(Value::as_str).unwrap_or("");
        return Err(FetchError::MalformedResponse(format!(
            "API error '{code}': {info}"
        )));
    }

    let rows = match envelope
        .get_mut("query")
        .and_then(|query| query.get_mut("recentchanges"))
        .map(Value::take)
    {
        Some(Value::Array(rows)) => rows,
        Some(other) => {
            return Err(FetchError::MalformedResponse(format!(
                "query.recentchanges is not a list: {other}"
            )));
        }
        None => {
            return Err(FetchError::MalformedResponse(
                "missing query.recentchanges".to_string(),
            ));
        }
    };

    if rows.len() == limit as usize {
        log::error!(
            "Window {} reached the {} record cap; reduce the window size",
            window,
            limit
        );
        return Err(FetchError::WindowSaturated { window, limit });
    }

    Ok(RecordBatch::new(window, rows))
}
