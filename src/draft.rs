//! Order draft state and validation.
//!
//! [`OrderDraft`] mirrors the entry form: the customer field plus one row
//! per line item, every field kept as the raw entered string. Totals are
//! recomputed from the strings on demand and never stored, and
//! [`OrderDraft::validate`] is the single path that turns a draft into
//! typed, submission-ready data.
//!
//! **Rules:**
//! - Display is permissive: a half-typed qty/rate contributes 0 to totals
//! - Submission is strict: every row needs item, qty and rate, and the
//!   numbers must be finite and non-negative

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::gateway::{SalesOrderItem, SalesOrderPayload};

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

/// Editable field of a line row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineField {
    ItemCode,
    ItemName,
    Qty,
    Rate,
}

/// One row of the order form. Values stay exactly as typed; parsing
/// happens in the total helpers and in `validate`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub item_code: String,
    pub item_name: String,
    pub qty: String,
    pub rate: String,
}

impl LineItem {
    /// Total for this row: qty × rate when both parse, otherwise 0.
    ///
    /// Feeds the live per-row display, so it never fails: half-typed
    /// input simply shows 0.
    pub fn line_total(&self) -> f64 {
        match (parse_amount(&self.qty), parse_amount(&self.rate)) {
            (Some(q), Some(r)) => q * r,
            _ => 0.0,
        }
    }
}

/// Parse a form field as a number. Trims whitespace and rejects
/// non-finite values, so "NaN" or "inf" typed into a field count as
/// not-a-number.
fn parse_amount(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

// ---------------------------------------------------------------------------
// Order draft
// ---------------------------------------------------------------------------

/// The in-progress order: customer + line rows.
///
/// `new()` matches a freshly opened form: no customer, one empty row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub customer_id: String,
    pub lines: Vec<LineItem>,
}

impl OrderDraft {
    pub fn new() -> Self {
        Self {
            customer_id: String::new(),
            lines: vec![LineItem::default()],
        }
    }

    /// Sum of all row totals. 0 for a draft with no rows.
    pub fn grand_total(&self) -> f64 {
        self.lines.iter().map(LineItem::line_total).sum()
    }

    /// Check every submit precondition and produce typed order data.
    ///
    /// Reports only the first unmet condition, matching how the form
    /// flags one problem at a time.
    pub fn validate(&self) -> Result<NormalizedDraft, ValidationError> {
        if self.customer_id.trim().is_empty() {
            return Err(ValidationError::MissingCustomer);
        }
        if self.lines.is_empty() {
            return Err(ValidationError::EmptyOrder);
        }

        let mut lines = Vec::with_capacity(self.lines.len());
        for (i, row) in self.lines.iter().enumerate() {
            let line = i + 1;
            if row.item_code.trim().is_empty() {
                return Err(ValidationError::MissingField { line, field: "item" });
            }
            if row.qty.trim().is_empty() {
                return Err(ValidationError::MissingField {
                    line,
                    field: "quantity",
                });
            }
            if row.rate.trim().is_empty() {
                return Err(ValidationError::MissingField { line, field: "rate" });
            }

            let qty = parse_amount(&row.qty).ok_or(ValidationError::NotANumber {
                line,
                field: "quantity",
            })?;
            let rate = parse_amount(&row.rate).ok_or(ValidationError::NotANumber {
                line,
                field: "rate",
            })?;
            if qty < 0.0 {
                return Err(ValidationError::Negative {
                    line,
                    field: "quantity",
                });
            }
            if rate < 0.0 {
                return Err(ValidationError::Negative { line, field: "rate" });
            }

            lines.push(NormalizedLine {
                item_code: row.item_code.trim().to_string(),
                item_name: row.item_name.trim().to_string(),
                qty,
                rate,
            });
        }

        Ok(NormalizedDraft {
            customer_id: self.customer_id.trim().to_string(),
            lines,
        })
    }
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Normalized (validated) draft
// ---------------------------------------------------------------------------

/// A validated draft: numbers parsed, strings trimmed. Only produced by
/// [`OrderDraft::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDraft {
    pub customer_id: String,
    pub lines: Vec<NormalizedLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedLine {
    pub item_code: String,
    /// Display name as entered. May be empty; falls back to the code when
    /// a missing item is auto-created.
    pub item_name: String,
    pub qty: f64,
    pub rate: f64,
}

impl NormalizedDraft {
    /// Map to the wire payload. `date` lands in both `transaction_date`
    /// and `delivery_date` (the screen has no separate delivery picker);
    /// `submitted` adds `docstatus: 1`.
    pub fn to_payload(&self, date: NaiveDate, submitted: bool) -> SalesOrderPayload {
        let date = date.format("%Y-%m-%d").to_string();
        SalesOrderPayload {
            customer: self.customer_id.clone(),
            transaction_date: date.clone(),
            delivery_date: date,
            items: self
                .lines
                .iter()
                .map(|l| SalesOrderItem {
                    item_code: l.item_code.clone(),
                    qty: l.qty,
                    rate: l.rate,
                })
                .collect(),
            docstatus: if submitted { Some(1) } else { None },
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
