//! Order entry session.
//!
//! [`OrderSession`] is the state behind one order entry screen: the draft
//! being edited, the customer/item reference catalog, and the capability
//! flags for this deployment. Submission runs the whole pipeline in order
//! (validate, resolve the customer, resolve the items, create the order)
//! and stops at the first failure, so a partial order never reaches the
//! ERP.
//!
//! **Rules:**
//! - The draft is cleared on a successful submission and kept untouched on
//!   any failure, so the operator corrects and retries
//! - Records created while resolving references are never rolled back; a
//!   retry finds them through the existence checks instead of creating
//!   duplicates

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::catalog::ReferenceCatalog;
use crate::config::{DraftOptions, ErpConfig};
use crate::draft::{LineField, LineItem, NormalizedLine, OrderDraft};
use crate::error::{ApiError, DraftError, SubmitError};
use crate::gateway::{ErpGateway, NewItem, RecordRef};

// ---------------------------------------------------------------------------
// Submission result
// ---------------------------------------------------------------------------

/// Outcome of one submission attempt, shaped for the confirmation dialog.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SubmissionResult {
    pub success: bool,
    /// Server-assigned order id, e.g. `SAL-ORD-2026-00042`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_name: Option<String>,
    /// Dialog text: confirmation on success, the failure reason otherwise.
    pub message: String,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One order entry screen's worth of state.
pub struct OrderSession {
    config: ErpConfig,
    options: DraftOptions,
    catalog: ReferenceCatalog,
    draft: OrderDraft,
}

impl OrderSession {
    /// Open a fresh session: empty catalog, blank form.
    pub fn new(config: ErpConfig, options: DraftOptions) -> Self {
        Self {
            config,
            options,
            catalog: ReferenceCatalog::default(),
            draft: OrderDraft::new(),
        }
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    pub fn catalog(&self) -> &ReferenceCatalog {
        &self.catalog
    }

    pub fn options(&self) -> DraftOptions {
        self.options
    }

    /// Live order total for the footer display.
    pub fn grand_total(&self) -> f64 {
        self.draft.grand_total()
    }

    // -----------------------------------------------------------------------
    // Form edits
    // -----------------------------------------------------------------------

    pub fn set_customer(&mut self, customer_id: &str) {
        self.draft.customer_id = customer_id.to_string();
    }

    /// Append an empty row. Rejected in single-item mode once a row exists.
    pub fn add_line_item(&mut self) -> Result<(), DraftError> {
        if !self.options.allow_multiple_items && !self.draft.lines.is_empty() {
            return Err(DraftError::SingleItemOnly);
        }
        self.draft.lines.push(LineItem::default());
        Ok(())
    }

    /// Remove the row at `index`. The form always keeps at least one row.
    pub fn remove_line_item(&mut self, index: usize) -> Result<(), DraftError> {
        let len = self.draft.lines.len();
        if index >= len {
            return Err(DraftError::OutOfRange { index, len });
        }
        if len == 1 {
            return Err(DraftError::LastRow);
        }
        self.draft.lines.remove(index);
        Ok(())
    }

    /// Write one field of one row.
    ///
    /// Entering a known item code fills the name (and the rate, when the
    /// catalog has one). The other fields are stored as-is, so a name or
    /// rate typed after the code wins over the auto-fill.
    pub fn update_line_item(
        &mut self,
        index: usize,
        field: LineField,
        value: &str,
    ) -> Result<(), DraftError> {
        let len = self.draft.lines.len();
        let line = self
            .draft
            .lines
            .get_mut(index)
            .ok_or(DraftError::OutOfRange { index, len })?;

        match field {
            LineField::ItemCode => {
                line.item_code = value.to_string();
                if let Some(item) = self.catalog.item_by_code(value) {
                    line.item_name = item.item_name.clone();
                    if let Some(rate) = item.standard_rate {
                        line.rate = rate.to_string();
                    }
                }
            }
            LineField::ItemName => line.item_name = value.to_string(),
            LineField::Qty => line.qty = value.to_string(),
            LineField::Rate => line.rate = value.to_string(),
        }
        Ok(())
    }

    /// Clear the form back to its initial state: no customer, one empty
    /// row. The reference catalog is kept.
    pub fn reset(&mut self) {
        self.draft = OrderDraft::new();
    }

    // -----------------------------------------------------------------------
    // Reference data
    // -----------------------------------------------------------------------

    /// Refresh customers and items from the ERP. On failure the previous
    /// catalog is kept, so the form stays usable with stale data.
    pub async fn load_catalog(&mut self, gateway: &dyn ErpGateway) -> Result<(), ApiError> {
        let catalog = ReferenceCatalog::load(gateway, self.config.list_limit).await?;
        self.catalog = catalog;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Run one submission attempt and shape the outcome for the
    /// confirmation dialog.
    pub async fn submit(&mut self, gateway: &dyn ErpGateway, date: NaiveDate) -> SubmissionResult {
        match self.try_submit(gateway, date).await {
            Ok(order) => SubmissionResult {
                success: true,
                message: format!("Order {} created", order.name),
                order_name: Some(order.name),
            },
            Err(err) => {
                warn!(error = %err, "order submission failed");
                SubmissionResult {
                    success: false,
                    order_name: None,
                    message: err.to_string(),
                }
            }
        }
    }

    /// The submission pipeline: validate, resolve the customer, resolve
    /// each distinct item, then create the sales order.
    ///
    /// Steps run strictly in this order and the first failure aborts the
    /// attempt. The draft is only cleared once the order is accepted.
    pub async fn try_submit(
        &mut self,
        gateway: &dyn ErpGateway,
        date: NaiveDate,
    ) -> Result<RecordRef, SubmitError> {
        let normalized = self.draft.validate()?;

        let customer = self
            .ensure_customer(gateway, &normalized.customer_id)
            .await?;

        let mut seen: Vec<&str> = Vec::new();
        for line in &normalized.lines {
            if seen.contains(&line.item_code.as_str()) {
                continue;
            }
            seen.push(&line.item_code);
            self.ensure_item(gateway, line).await?;
        }

        let mut payload = normalized.to_payload(date, self.config.submit_orders);
        payload.customer = customer.name;

        let order = gateway
            .create_sales_order(&payload)
            .await
            .map_err(|source| SubmitError::Submission { source })?;

        info!(order = %order.name, lines = payload.items.len(), "order submitted");
        self.reset();
        Ok(order)
    }

    /// Resolve the draft's customer to a server record, creating it when
    /// the deployment allows.
    async fn ensure_customer(
        &self,
        gateway: &dyn ErpGateway,
        customer_id: &str,
    ) -> Result<RecordRef, SubmitError> {
        let found = gateway
            .find_customer(customer_id)
            .await
            .map_err(reference_error("Customer", customer_id))?;
        if let Some(existing) = found {
            return Ok(existing);
        }
        if !self.options.auto_create_missing_references {
            return Err(SubmitError::MissingReference {
                entity: "Customer",
                name: customer_id.to_string(),
            });
        }
        info!(customer = %customer_id, "customer not found, creating");
        gateway
            .create_customer(customer_id)
            .await
            .map_err(reference_error("Customer", customer_id))
    }

    /// Resolve one item code to a server record. A missing item is created
    /// from the row itself: typed name (code when blank) and the typed
    /// rate as the standard rate.
    async fn ensure_item(
        &self,
        gateway: &dyn ErpGateway,
        line: &NormalizedLine,
    ) -> Result<RecordRef, SubmitError> {
        let found = gateway
            .find_item(&line.item_code)
            .await
            .map_err(reference_error("Item", &line.item_code))?;
        if let Some(existing) = found {
            return Ok(existing);
        }
        if !self.options.auto_create_missing_references {
            return Err(SubmitError::MissingReference {
                entity: "Item",
                name: line.item_code.clone(),
            });
        }
        info!(item = %line.item_code, "item not found, creating");
        let new_item = NewItem {
            item_code: line.item_code.clone(),
            item_name: if line.item_name.is_empty() {
                line.item_code.clone()
            } else {
                line.item_name.clone()
            },
            standard_rate: line.rate,
        };
        gateway
            .create_item(&new_item)
            .await
            .map_err(reference_error("Item", &line.item_code))
    }
}

fn reference_error<'a>(
    entity: &'static str,
    name: &'a str,
) -> impl FnOnce(ApiError) -> SubmitError + 'a {
    move |source| SubmitError::ReferenceCreation {
        entity,
        name: name.to_string(),
        source,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
