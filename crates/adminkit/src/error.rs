//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use adminkit_config::ConfigError;
use adminkit_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const PARTIAL: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Data file ────────────────────────────────────────────────────
    #[error("No data file given")]
    #[diagnostic(
        code(adminkit::no_data),
        help("Pass --data <file.json> or set ADMINKIT_DATA.")
    )]
    NoData,

    #[error("Could not load records: {message}")]
    #[diagnostic(
        code(adminkit::load_failed),
        help("Check that the data file is a JSON array of records.")
    )]
    LoadFailed { message: String },

    #[error("Storage error: {message}")]
    #[diagnostic(code(adminkit::storage))]
    Storage { message: String },

    // ── Records ──────────────────────────────────────────────────────
    #[error("{item_type} '{identifier}' not found")]
    #[diagnostic(
        code(adminkit::not_found),
        help("Run: adminkit tree   to see every record id")
    )]
    NotFound {
        item_type: String,
        identifier: String,
    },

    #[error("Operation rejected: {message}")]
    #[diagnostic(code(adminkit::rejected))]
    Rejected { message: String },

    // ── Actions ──────────────────────────────────────────────────────
    #[error("{action} failed")]
    #[diagnostic(
        code(adminkit::action_failed),
        help("The reason was reported above.")
    )]
    ActionFailed { action: String },

    #[error("Deleted {succeeded} of {total} records; {failed} failed")]
    #[diagnostic(
        code(adminkit::partial_failure),
        help("Records that failed to delete are listed above and were left in place.")
    )]
    PartialFailure {
        succeeded: usize,
        failed: usize,
        total: usize,
    },

    #[error("Another confirmed action is still running")]
    #[diagnostic(code(adminkit::busy))]
    Busy,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(adminkit::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(adminkit::config),
        help("Check the config file and any ADMINKIT_* environment variables.")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(adminkit::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(adminkit::json), help("Pass a JSON object, e.g. --json '{{\"name\": \"x\"}}'"))]
    Json(#[from] serde_json::Error),

    #[error("YAML encoding failed: {0}")]
    #[diagnostic(code(adminkit::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } | Self::Busy => exit_code::CONFLICT,
            Self::PartialFailure { .. } => exit_code::PARTIAL,
            Self::NoData
            | Self::Validation { .. }
            | Self::Json(_)
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Service { message } | CoreError::Internal(message) => {
                CliError::Storage { message }
            }

            CoreError::NotFound {
                item_type,
                identifier,
            } => CliError::NotFound {
                item_type,
                identifier,
            },

            CoreError::Rejected { message } => CliError::Rejected { message },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::InvalidPage { page, last_page } => CliError::Validation {
                field: "page".into(),
                reason: format!("{page} is past the last page ({last_page})"),
            },

            CoreError::InvalidPageSize { page_size } => CliError::Validation {
                field: "page-size".into(),
                reason: format!("{page_size} is not a valid page size"),
            },

            CoreError::GateBusy => CliError::Busy,

            CoreError::SelectionOutOfRange {
                action, count, min, ..
            } => CliError::Validation {
                field: "ids".into(),
                reason: format!("'{action}' needs at least {min} ids, got {count}"),
            },

            CoreError::BatchDelete { failed, total } => CliError::PartialFailure {
                succeeded: total.saturating_sub(failed),
                failed,
                total,
            },
        }
    }
}
