// ── Core error types ──
//
// User-facing errors from adminkit-core. Data services report failures
// as `ServiceError`; the `From<ServiceError>` impl translates them into
// domain-appropriate variants so consumers only ever match on `CoreError`.

use thiserror::Error;

use crate::service::ServiceError;

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Service errors ───────────────────────────────────────────────
    #[error("Service error: {message}")]
    Service { message: String },

    #[error("{item_type} not found: {identifier}")]
    NotFound {
        item_type: String,
        identifier: String,
    },

    #[error("Operation rejected: {message}")]
    Rejected { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Paging errors ────────────────────────────────────────────────
    #[error("Page {page} is out of range (1..={last_page})")]
    InvalidPage { page: u32, last_page: u32 },

    #[error("Page size must be at least 1, got {page_size}")]
    InvalidPageSize { page_size: u32 },

    // ── Action errors ────────────────────────────────────────────────
    #[error("A confirmed action is already executing")]
    GateBusy,

    #[error("Action '{action}' needs between {min} and {max} selected items, got {count}")]
    SelectionOutOfRange {
        action: String,
        count: usize,
        min: usize,
        max: usize,
    },

    #[error("Failed to delete {failed} of {total} items")]
    BatchDelete { failed: usize, total: usize },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from service-layer errors ─────────────────────────────

impl From<ServiceError> for CoreError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { id } => CoreError::NotFound {
                item_type: "Item".into(),
                identifier: id.to_string(),
            },
            ServiceError::Rejected { message } => CoreError::Rejected { message },
            ServiceError::Validation { field, message } => CoreError::ValidationFailed {
                message: format!("{field}: {message}"),
            },
            ServiceError::Unavailable { reason } => CoreError::Service {
                message: format!("service unavailable: {reason}"),
            },
            ServiceError::Storage(message) => CoreError::Service { message },
        }
    }
}
