//! ERP gateway trait and wire types.
//!
//! Defines the [`ErpGateway`] trait that the order session talks to, along
//! with the request/response records exchanged with the ERP's resource
//! API. `api::RestGateway` is the HTTP implementation; tests swap in
//! in-process fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{CustomerRef, ItemRef};
use crate::error::ApiError;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One order line as the ERP expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesOrderItem {
    pub item_code: String,
    pub qty: f64,
    pub rate: f64,
}

/// The complete sales-order creation payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesOrderPayload {
    pub customer: String,
    /// ISO date (`YYYY-MM-DD`), no time component.
    pub transaction_date: String,
    pub delivery_date: String,
    pub items: Vec<SalesOrderItem>,
    /// `Some(1)` submits the order; `None` leaves it as a server-side draft.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstatus: Option<u8>,
}

/// Reference to a server-side document, as returned by finds and creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    /// The document id (Frappe calls every primary key `name`).
    pub name: String,
}

/// Minimal fields for creating a missing item on the fly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewItem {
    pub item_code: String,
    pub item_name: String,
    pub standard_rate: f64,
}

// ---------------------------------------------------------------------------
// Gateway trait
// ---------------------------------------------------------------------------

/// ERP collaborator contract: everything the order screen needs from the
/// backend. Object-safe so the session can hold a `&dyn ErpGateway` and
/// tests can substitute a deterministic fake.
#[async_trait]
pub trait ErpGateway: Send + Sync {
    /// List customers for the selection dropdown.
    async fn list_customers(&self, limit: u32) -> Result<Vec<CustomerRef>, ApiError>;

    /// List items (with standard rates) for the selection dropdown.
    async fn list_items(&self, limit: u32) -> Result<Vec<ItemRef>, ApiError>;

    /// Find a customer by its human-readable name. `Ok(None)` when absent.
    async fn find_customer(&self, customer_name: &str) -> Result<Option<RecordRef>, ApiError>;

    /// Find an item by its item code. `Ok(None)` when absent.
    async fn find_item(&self, item_code: &str) -> Result<Option<RecordRef>, ApiError>;

    /// Create a customer with minimal fields.
    async fn create_customer(&self, customer_name: &str) -> Result<RecordRef, ApiError>;

    /// Create an item with minimal fields.
    async fn create_item(&self, item: &NewItem) -> Result<RecordRef, ApiError>;

    /// POST the sales order.
    async fn create_sales_order(&self, payload: &SalesOrderPayload)
        -> Result<RecordRef, ApiError>;
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_json_field_names() {
        let payload = SalesOrderPayload {
            customer: "CUST-01".to_string(),
            transaction_date: "2026-08-26".to_string(),
            delivery_date: "2026-08-26".to_string(),
            items: vec![SalesOrderItem {
                item_code: "ITEM-01".to_string(),
                qty: 3.0,
                rate: 10.0,
            }],
            docstatus: Some(1),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "customer": "CUST-01",
                "transaction_date": "2026-08-26",
                "delivery_date": "2026-08-26",
                "items": [{ "item_code": "ITEM-01", "qty": 3.0, "rate": 10.0 }],
                "docstatus": 1
            })
        );
    }

    #[test]
    fn test_record_ref_decodes_extra_fields() {
        // Resource responses carry many more fields than the id; they must
        // not break decoding.
        let record: RecordRef = serde_json::from_str(
            r#"{ "name": "SAL-ORD-2026-00001", "customer": "CUST-01", "docstatus": 0 }"#,
        )
        .unwrap();
        assert_eq!(record.name, "SAL-ORD-2026-00001");
    }
}
