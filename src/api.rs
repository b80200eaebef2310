//! ERP REST API client.
//!
//! [`RestGateway`] implements [`ErpGateway`] against a Frappe/ERPNext-style
//! resource API: token-authenticated JSON requests to
//! `{base}/api/resource/{DocType}`, list/filter queries for reference data,
//! and POSTs for creates. Server error bodies are preserved verbatim in the
//! returned errors so the operator sees what the ERP actually said.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{info, trace};

use crate::catalog::{CustomerRef, ItemRef};
use crate::config::ErpConfig;
use crate::error::ApiError;
use crate::gateway::{ErpGateway, NewItem, RecordRef, SalesOrderPayload};

/// Default timeout for API requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout used specifically for the lightweight connectivity test.
const CONNECTIVITY_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Convert a `reqwest::Error` into a user-friendly message.
fn friendly_error(url: &str, err: &reqwest::Error) -> String {
    if err.is_connect() {
        return format!("Cannot reach ERP server at {url}");
    }
    if err.is_timeout() {
        return format!("Connection to {url} timed out");
    }
    if err.is_builder() {
        return format!("Invalid ERP server URL: {url}");
    }
    format!("Network error communicating with {url}: {err}")
}

/// Convert an HTTP status code into a user-friendly message.
fn status_error(status: StatusCode) -> String {
    match status.as_u16() {
        401 => "API token is invalid or expired".to_string(),
        403 => "API token is not permitted to do this".to_string(),
        404 => "ERP endpoint not found".to_string(),
        s if s >= 500 => format!("ERP server error (HTTP {s})"),
        s => format!("Unexpected response from ERP server (HTTP {s})"),
    }
}

/// Build the error detail shown to the operator: friendly status text plus
/// whatever the server said, verbatim. Frappe reports validation problems
/// in `message` or `exception` with the class name in `exc_type`.
fn error_detail(status: StatusCode, body_text: &str) -> String {
    let code = status.as_u16();
    if let Ok(json) = serde_json::from_str::<Value>(body_text) {
        let message = json
            .get("message")
            .or_else(|| json.get("exception"))
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .unwrap_or_else(|| status_error(status));
        let details = json
            .get("_server_messages")
            .or_else(|| json.get("exc_type"))
            .cloned();
        if let Some(details) = details {
            format!("{message} (HTTP {code}): {details}")
        } else if !body_text.trim().is_empty() && body_text.trim() != message {
            format!("{message} (HTTP {code}): {}", body_text.trim())
        } else {
            format!("{message} (HTTP {code})")
        }
    } else if !body_text.trim().is_empty() {
        format!(
            "{} (HTTP {code}): {}",
            status_error(status),
            body_text.trim()
        )
    } else {
        format!("{} (HTTP {code})", status_error(status))
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Unwrap the `{"data": ...}` envelope the resource API wraps responses
/// in. Bare payloads (proxies sometimes strip the envelope) pass through
/// unchanged.
fn unwrap_data(resp: Value) -> Value {
    match resp {
        Value::Object(mut obj) if obj.contains_key("data") => {
            obj.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

// ---------------------------------------------------------------------------
// Connectivity test
// ---------------------------------------------------------------------------

/// Result of a connectivity test.
#[derive(serde::Serialize)]
pub struct ConnectivityResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// REST gateway
// ---------------------------------------------------------------------------

/// HTTP implementation of [`ErpGateway`].
pub struct RestGateway {
    config: ErpConfig,
    client: Client,
}

impl RestGateway {
    /// Build a gateway from the given configuration.
    pub fn new(config: ErpConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ErpConfig {
        &self.config
    }

    fn resource_url(&self, doctype: &str) -> String {
        format!("{}/api/resource/{}", self.config.base_url, doctype)
    }

    /// Perform an authenticated request against the resource API.
    ///
    /// `query` values go through reqwest's URL encoding; Frappe expects the
    /// `fields`/`filters` values to already be JSON text.
    async fn request(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        trace!(method = %method, url = %url, "erp request");

        let mut req = self
            .client
            .request(method, url)
            .header("Authorization", format!("token {}", self.config.api_token))
            .header("Content-Type", "application/json");
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Transport(friendly_error(&self.config.base_url, &e)))?;
        let status = resp.status();

        if !status.is_success() {
            // The body carries the server's own words; keep them verbatim.
            let body_text = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: error_detail(status, &body_text),
            });
        }

        // Return the JSON body, or null for empty 204 responses.
        let body_text = resp.text().await.unwrap_or_default();
        if body_text.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body_text).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn list(&self, doctype: &str, fields: &[&str], limit: u32) -> Result<Value, ApiError> {
        let url = self.resource_url(doctype);
        let query = [
            ("fields", serde_json::json!(fields).to_string()),
            ("limit", limit.to_string()),
        ];
        let resp = self.request(Method::GET, &url, &query, None).await?;
        Ok(unwrap_data(resp))
    }

    async fn find_by_field(
        &self,
        doctype: &str,
        field: &str,
        value: &str,
    ) -> Result<Option<RecordRef>, ApiError> {
        let url = self.resource_url(doctype);
        let query = [(
            "filters",
            serde_json::json!([[field, "=", value]]).to_string(),
        )];
        let resp = self.request(Method::GET, &url, &query, None).await?;
        let rows: Vec<RecordRef> = decode(unwrap_data(resp))?;
        Ok(rows.into_iter().next())
    }

    async fn create(&self, doctype: &str, body: Value) -> Result<RecordRef, ApiError> {
        let url = self.resource_url(doctype);
        let resp = self.request(Method::POST, &url, &[], Some(&body)).await?;
        decode(unwrap_data(resp))
    }

    /// Probe the ERP with a 1-row customer read and measure latency.
    pub async fn test_connectivity(&self) -> ConnectivityResult {
        let url = self.resource_url("Customer");

        let client = match Client::builder().timeout(CONNECTIVITY_TIMEOUT).build() {
            Ok(c) => c,
            Err(e) => {
                return ConnectivityResult {
                    success: false,
                    latency_ms: None,
                    error: Some(format!("Failed to create HTTP client: {e}")),
                };
            }
        };

        let start = Instant::now();

        let resp = match client
            .get(&url)
            .query(&[("fields", "[\"name\"]"), ("limit", "1")])
            .header("Authorization", format!("token {}", self.config.api_token))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return ConnectivityResult {
                    success: false,
                    latency_ms: None,
                    error: Some(friendly_error(&self.config.base_url, &e)),
                };
            }
        };

        let latency = start.elapsed().as_millis() as u64;
        let status = resp.status();

        if status.is_success() {
            info!(latency_ms = latency, "connectivity test passed");
            ConnectivityResult {
                success: true,
                latency_ms: Some(latency),
                error: None,
            }
        } else {
            ConnectivityResult {
                success: false,
                latency_ms: Some(latency),
                error: Some(status_error(status)),
            }
        }
    }
}

#[async_trait]
impl ErpGateway for RestGateway {
    async fn list_customers(&self, limit: u32) -> Result<Vec<CustomerRef>, ApiError> {
        let data = self
            .list("Customer", &["name", "customer_name"], limit)
            .await?;
        decode(data)
    }

    async fn list_items(&self, limit: u32) -> Result<Vec<ItemRef>, ApiError> {
        let data = self
            .list("Item", &["name", "item_name", "standard_rate"], limit)
            .await?;
        decode(data)
    }

    async fn find_customer(&self, customer_name: &str) -> Result<Option<RecordRef>, ApiError> {
        self.find_by_field("Customer", "customer_name", customer_name)
            .await
    }

    async fn find_item(&self, item_code: &str) -> Result<Option<RecordRef>, ApiError> {
        self.find_by_field("Item", "item_code", item_code).await
    }

    async fn create_customer(&self, customer_name: &str) -> Result<RecordRef, ApiError> {
        let created = self
            .create(
                "Customer",
                serde_json::json!({ "customer_name": customer_name }),
            )
            .await?;
        info!(customer = %created.name, "customer created");
        Ok(created)
    }

    async fn create_item(&self, item: &NewItem) -> Result<RecordRef, ApiError> {
        let created = self.create("Item", serde_json::json!(item)).await?;
        info!(item = %created.name, "item created");
        Ok(created)
    }

    async fn create_sales_order(
        &self,
        payload: &SalesOrderPayload,
    ) -> Result<RecordRef, ApiError> {
        let created = self
            .create(&self.config.sales_order_doctype, serde_json::json!(payload))
            .await?;
        info!(order = %created.name, customer = %payload.customer, "sales order created");
        Ok(created)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
