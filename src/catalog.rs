//! Reference data for the order form.
//!
//! Customers and items fetched read-only from the ERP, feeding the
//! selection dropdowns and the item auto-fill. The catalog is replaced
//! wholesale on a successful load and left untouched when a load fails.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ApiError;
use crate::gateway::ErpGateway;

// ---------------------------------------------------------------------------
// Reference records
// ---------------------------------------------------------------------------

/// A customer as listed by the ERP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRef {
    /// Server-side document id.
    pub name: String,
    /// Human-readable name shown in the dropdown.
    pub customer_name: String,
}

/// An item as listed by the ERP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRef {
    /// Server-side document id; doubles as the item code.
    pub name: String,
    pub item_name: String,
    /// Default selling rate; drives the rate auto-fill. Items without a
    /// configured rate come back as null.
    #[serde(default)]
    pub standard_rate: Option<f64>,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// In-memory reference data for one screen session.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    pub customers: Vec<CustomerRef>,
    pub items: Vec<ItemRef>,
}

impl ReferenceCatalog {
    /// Fetch fresh customer and item lists from the ERP.
    pub async fn load(gateway: &dyn ErpGateway, limit: u32) -> Result<Self, ApiError> {
        let customers = gateway.list_customers(limit).await?;
        let items = gateway.list_items(limit).await?;
        info!(
            customers = customers.len(),
            items = items.len(),
            "reference data loaded"
        );
        Ok(Self { customers, items })
    }

    /// Look up an item by its code.
    pub fn item_by_code(&self, code: &str) -> Option<&ItemRef> {
        let code = code.trim();
        self.items.iter().find(|i| i.name == code)
    }

    /// Look up a customer by document id.
    pub fn customer_by_id(&self, id: &str) -> Option<&CustomerRef> {
        let id = id.trim();
        self.customers.iter().find(|c| c.name == id)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
