//! Runtime configuration for the order entry core.
//!
//! Everything injectable lives here: the ERP connection ([`ErpConfig`]) and
//! the screen capability flags ([`DraftOptions`]). Nothing reads global
//! state at call time; the embedding shell builds a config (or loads one
//! from the environment) and passes it in.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;

/// Default page size for reference-data list requests.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

// ---------------------------------------------------------------------------
// URL normalisation
// ---------------------------------------------------------------------------

/// Normalise the ERP server URL:
/// - strip trailing slashes
/// - strip a trailing `/api` or `/api/resource` segment
/// - ensure a scheme is present (https, or http for localhost)
pub fn normalize_base_url(url: &str) -> String {
    let mut url = url.trim().to_string();

    // Ensure scheme
    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    // Strip trailing slashes
    while url.ends_with('/') {
        url.pop();
    }

    // Strip a trailing /api or /api/resource; pasted server URLs often
    // include the resource prefix
    if url.ends_with("/api/resource") {
        url.truncate(url.len() - "/api/resource".len());
    }
    if url.ends_with("/api") {
        url.truncate(url.len() - 4);
    }

    // Strip trailing slashes again (in case "/api/" was present)
    while url.ends_with('/') {
        url.pop();
    }

    url
}

/// Keep only the last four characters of the token for log output.
fn mask_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "unset".to_string();
    }
    // A 4-char suffix of a 4-char token is the whole token.
    if trimmed.chars().count() <= 4 {
        return "***".to_string();
    }
    let suffix: String = trimmed
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<char>>()
        .into_iter()
        .rev()
        .collect();
    format!("***{suffix}")
}

// ---------------------------------------------------------------------------
// ERP connection config
// ---------------------------------------------------------------------------

/// Connection settings for the ERP resource API.
#[derive(Clone, PartialEq, Eq)]
pub struct ErpConfig {
    /// Server root, e.g. `https://erp.example.com`. Normalised on build.
    pub base_url: String,
    /// API token (`api_key:api_secret`), sent as `Authorization: token <...>`.
    /// Never logged; `Debug` masks it.
    pub api_token: String,
    /// DocType that order submissions POST to. Some deployments rename the
    /// doctype (e.g. "Sales Orders"), so it is configuration, not code.
    pub sales_order_doctype: String,
    /// When true the payload carries `docstatus: 1` and the server treats
    /// the order as submitted; otherwise it stays a server-side draft.
    pub submit_orders: bool,
    /// Page size for customer/item list requests.
    pub list_limit: u32,
}

impl ErpConfig {
    pub fn new(base_url: &str, api_token: &str) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            api_token: api_token.trim().to_string(),
            sales_order_doctype: "Sales Order".to_string(),
            submit_orders: false,
            list_limit: DEFAULT_LIST_LIMIT,
        }
    }

    /// Load connection settings from `ORDER_PAD_*` environment variables.
    ///
    /// `ORDER_PAD_URL` and `ORDER_PAD_TOKEN` are required.
    /// `ORDER_PAD_ORDER_DOCTYPE`, `ORDER_PAD_SUBMIT_ORDERS` ("1"/"true"/"yes")
    /// and `ORDER_PAD_LIST_LIMIT` override the defaults.
    pub fn from_env() -> Result<Self, ApiError> {
        let base_url = std::env::var("ORDER_PAD_URL")
            .map_err(|_| ApiError::Config("ORDER_PAD_URL is not set".to_string()))?;
        let api_token = std::env::var("ORDER_PAD_TOKEN")
            .map_err(|_| ApiError::Config("ORDER_PAD_TOKEN is not set".to_string()))?;

        // Check the raw values: normalization turns even an empty URL into
        // a scheme-only string.
        if base_url.trim().is_empty() {
            return Err(ApiError::Config("ORDER_PAD_URL is empty".to_string()));
        }
        if api_token.trim().is_empty() {
            return Err(ApiError::Config("ORDER_PAD_TOKEN is empty".to_string()));
        }

        let mut config = Self::new(&base_url, &api_token);

        if let Ok(doctype) = std::env::var("ORDER_PAD_ORDER_DOCTYPE") {
            let trimmed = doctype.trim();
            if !trimmed.is_empty() {
                config.sales_order_doctype = trimmed.to_string();
            }
        }
        if let Ok(flag) = std::env::var("ORDER_PAD_SUBMIT_ORDERS") {
            config.submit_orders = matches!(flag.trim(), "1" | "true" | "yes");
        }
        if let Ok(limit) = std::env::var("ORDER_PAD_LIST_LIMIT") {
            if let Ok(n) = limit.trim().parse::<u32>() {
                if n > 0 {
                    config.list_limit = n;
                }
            }
        }

        debug!(
            base_url = %config.base_url,
            doctype = %config.sales_order_doctype,
            "loaded ERP config from environment"
        );
        Ok(config)
    }
}

impl fmt::Debug for ErpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErpConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &mask_token(&self.api_token))
            .field("sales_order_doctype", &self.sales_order_doctype)
            .field("submit_orders", &self.submit_orders)
            .field("list_limit", &self.list_limit)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Screen capability flags
// ---------------------------------------------------------------------------

/// Capability flags selecting the order-screen variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftOptions {
    /// Allow more than one line item per order.
    pub allow_multiple_items: bool,
    /// Create missing Customer/Item records on the server before
    /// submitting, instead of failing the order.
    pub auto_create_missing_references: bool,
}

impl Default for DraftOptions {
    fn default() -> Self {
        Self {
            allow_multiple_items: true,
            auto_create_missing_references: true,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_normalize_adds_https_scheme() {
        assert_eq!(
            normalize_base_url("erp.example.com"),
            "https://erp.example.com"
        );
    }

    #[test]
    fn test_normalize_localhost_gets_http() {
        assert_eq!(
            normalize_base_url("localhost:8000"),
            "http://localhost:8000"
        );
        assert_eq!(
            normalize_base_url("127.0.0.1:8000"),
            "http://127.0.0.1:8000"
        );
    }

    #[test]
    fn test_normalize_strips_trailing_slash_and_api() {
        assert_eq!(
            normalize_base_url("https://erp.example.com/"),
            "https://erp.example.com"
        );
        assert_eq!(
            normalize_base_url("https://erp.example.com/api/"),
            "https://erp.example.com"
        );
        assert_eq!(
            normalize_base_url("https://erp.example.com/api/resource/"),
            "https://erp.example.com"
        );
    }

    #[test]
    fn test_normalize_keeps_existing_scheme() {
        assert_eq!(
            normalize_base_url("http://erp.internal:8080"),
            "http://erp.internal:8080"
        );
    }

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("abcd1234:secret99"), "***et99");
        assert_eq!(mask_token(""), "unset");
    }

    #[test]
    fn test_mask_token_hides_short_tokens_entirely() {
        // "***abcd" would reveal the whole thing.
        assert_eq!(mask_token("abcd"), "***");
        assert_eq!(mask_token("ab"), "***");
        assert_eq!(mask_token("abcde"), "***bcde");
    }

    #[test]
    fn test_debug_never_prints_token() {
        let config = ErpConfig::new("https://erp.example.com", "key123:verysecret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("verysecret"));
        assert!(debug.contains("***cret"));
    }

    #[test]
    fn test_new_applies_defaults() {
        let config = ErpConfig::new("erp.example.com/api/", " tok:sec ");
        assert_eq!(config.base_url, "https://erp.example.com");
        assert_eq!(config.api_token, "tok:sec");
        assert_eq!(config.sales_order_doctype, "Sales Order");
        assert!(!config.submit_orders);
        assert_eq!(config.list_limit, DEFAULT_LIST_LIMIT);
    }

    fn clear_env() {
        for key in [
            "ORDER_PAD_URL",
            "ORDER_PAD_TOKEN",
            "ORDER_PAD_ORDER_DOCTYPE",
            "ORDER_PAD_SUBMIT_ORDERS",
            "ORDER_PAD_LIST_LIMIT",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_requires_url_and_token() {
        clear_env();
        let err = ErpConfig::from_env().unwrap_err();
        assert_eq!(
            err,
            ApiError::Config("ORDER_PAD_URL is not set".to_string())
        );

        std::env::set_var("ORDER_PAD_URL", "erp.example.com");
        let err = ErpConfig::from_env().unwrap_err();
        assert_eq!(
            err,
            ApiError::Config("ORDER_PAD_TOKEN is not set".to_string())
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_empty_url_and_token() {
        // Set-but-empty must fail up front, not surface later as a
        // transport error against "https:".
        clear_env();
        std::env::set_var("ORDER_PAD_URL", "");
        std::env::set_var("ORDER_PAD_TOKEN", "key:secret");
        let err = ErpConfig::from_env().unwrap_err();
        assert_eq!(err, ApiError::Config("ORDER_PAD_URL is empty".to_string()));

        std::env::set_var("ORDER_PAD_URL", "   ");
        let err = ErpConfig::from_env().unwrap_err();
        assert_eq!(err, ApiError::Config("ORDER_PAD_URL is empty".to_string()));

        std::env::set_var("ORDER_PAD_URL", "erp.example.com");
        std::env::set_var("ORDER_PAD_TOKEN", "  ");
        let err = ErpConfig::from_env().unwrap_err();
        assert_eq!(
            err,
            ApiError::Config("ORDER_PAD_TOKEN is empty".to_string())
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_reads_overrides() {
        clear_env();
        std::env::set_var("ORDER_PAD_URL", "erp.example.com/api");
        std::env::set_var("ORDER_PAD_TOKEN", "key:secret");
        std::env::set_var("ORDER_PAD_ORDER_DOCTYPE", "Sales Orders");
        std::env::set_var("ORDER_PAD_SUBMIT_ORDERS", "true");
        std::env::set_var("ORDER_PAD_LIST_LIMIT", "25");

        let config = ErpConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://erp.example.com");
        assert_eq!(config.api_token, "key:secret");
        assert_eq!(config.sales_order_doctype, "Sales Orders");
        assert!(config.submit_orders);
        assert_eq!(config.list_limit, 25);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_ignores_invalid_limit() {
        clear_env();
        std::env::set_var("ORDER_PAD_URL", "erp.example.com");
        std::env::set_var("ORDER_PAD_TOKEN", "key:secret");
        std::env::set_var("ORDER_PAD_LIST_LIMIT", "zero");

        let config = ErpConfig::from_env().unwrap();
        assert_eq!(config.list_limit, DEFAULT_LIST_LIMIT);
        clear_env();
    }
}
