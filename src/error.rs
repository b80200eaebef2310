//! Error types for the order entry core.
//!
//! Split by layer: [`DraftError`] for row edits, [`ValidationError`] for the
//! pre-submit checks, [`ApiError`] for the ERP HTTP boundary, and
//! [`SubmitError`] for the submission pipeline. `Display` text is shown to
//! the operator as-is, so messages stay human-readable and carry the
//! server's own words wherever a response body exists.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Draft editing
// ---------------------------------------------------------------------------

/// Failures of the row edit operations (add / remove / update).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("No line item at index {index} (order has {len})")]
    OutOfRange { index: usize, len: usize },
    /// The screen always keeps at least one editable row.
    #[error("Cannot remove the last line item")]
    LastRow,
    #[error("This order is limited to a single line item")]
    SingleItemOnly,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// First unmet submit precondition. `line` is 1-based for display.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a customer")]
    MissingCustomer,
    #[error("Add at least one item to the order")]
    EmptyOrder,
    #[error("Line {line}: please fill in {field}")]
    MissingField { line: usize, field: &'static str },
    #[error("Line {line}: {field} must be a number")]
    NotANumber { line: usize, field: &'static str },
    #[error("Line {line}: {field} cannot be negative")]
    Negative { line: usize, field: &'static str },
}

// ---------------------------------------------------------------------------
// ERP HTTP boundary
// ---------------------------------------------------------------------------

/// Errors from the ERP resource API client.
///
/// `Transport` and `Status` messages are pre-formatted for the operator;
/// `Status::detail` keeps whatever the server sent back, verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// A required configuration value is missing or unusable.
    #[error("{0}")]
    Config(String),
    /// Network or transport failure before any response arrived.
    #[error("{0}")]
    Transport(String),
    /// The server answered with a non-success status.
    #[error("{detail}")]
    Status { status: u16, detail: String },
    #[error("Invalid JSON from ERP server: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Submission pipeline
// ---------------------------------------------------------------------------

/// Failure of one submission attempt. Every variant is terminal for the
/// attempt: the draft is kept and the operator corrects and retries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    /// A referenced master record does not exist and auto-creation is
    /// turned off for this deployment.
    #[error("{entity} \"{name}\" does not exist in the ERP")]
    MissingReference { entity: &'static str, name: String },
    /// The existence check or creation of a master record failed.
    /// `entity` is the DocType ("Customer" or "Item").
    #[error("{entity} \"{name}\": {source}")]
    ReferenceCreation {
        entity: &'static str,
        name: String,
        source: ApiError,
    },
    #[error("Order submission failed: {source}")]
    Submission { source: ApiError },
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_error_display() {
        let err = DraftError::OutOfRange { index: 3, len: 2 };
        assert_eq!(err.to_string(), "No line item at index 3 (order has 2)");
        assert_eq!(
            DraftError::LastRow.to_string(),
            "Cannot remove the last line item"
        );
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::MissingField {
            line: 2,
            field: "quantity",
        };
        assert_eq!(err.to_string(), "Line 2: please fill in quantity");
        let err = ValidationError::NotANumber {
            line: 1,
            field: "rate",
        };
        assert_eq!(err.to_string(), "Line 1: rate must be a number");
    }

    #[test]
    fn test_status_error_keeps_server_detail() {
        let err = ApiError::Status {
            status: 417,
            detail: "Could not find Customer: Ghost (HTTP 417)".to_string(),
        };
        assert_eq!(err.to_string(), "Could not find Customer: Ghost (HTTP 417)");
    }

    #[test]
    fn test_submit_error_wraps_reference_failure() {
        let err = SubmitError::ReferenceCreation {
            entity: "Item",
            name: "ITEM-99".to_string(),
            source: ApiError::Transport("Cannot reach ERP server at https://erp.test".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Item \"ITEM-99\": Cannot reach ERP server at https://erp.test"
        );
    }

    #[test]
    fn test_missing_reference_display() {
        let err = SubmitError::MissingReference {
            entity: "Customer",
            name: "Ghost Kitchen".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Customer \"Ghost Kitchen\" does not exist in the ERP"
        );
    }

    #[test]
    fn test_submit_error_from_validation() {
        let err: SubmitError = ValidationError::MissingCustomer.into();
        assert_eq!(err.to_string(), "Please select a customer");
    }
}
