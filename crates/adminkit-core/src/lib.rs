//! Screen-level data management for admin UIs.
//!
//! This crate owns the state and orchestration behind list and tree
//! screens, independent of any rendering layer:
//!
//! - **[`Orchestrator`]**: Facade over one [`DataService`]. Loads pages,
//!   runs create/update through the service, routes deletes through the
//!   confirmation gate, and publishes a [`ScreenState`] snapshot over a
//!   `tokio::sync::watch` channel after every change.
//!
//! - **[`PaginationCoordinator`]**: Page window plus debounced search.
//!   Each keystroke updates the displayed text immediately; the committed
//!   term (and the reload it triggers) waits for the debounce window.
//!
//! - **[`TreeIndex`]** / **[`SelectionEngine`]**: Parent/depth index over
//!   nested records, expand state, and multi-selection with optional
//!   ancestor propagation.
//!
//! - **[`ConfirmationGate`]**: `Idle -> Confirming -> Executing -> Idle`
//!   state machine that parks a destructive action until the user
//!   confirms, then reports the outcome through a [`Notifier`].
//!
//! - **[`command`]**: Row, bulk and global action descriptors plus the
//!   [`ActionDispatcher`] that resolves them into confirm/execute/refresh
//!   calls.

pub mod command;
pub mod config;
pub mod error;
pub mod gate;
pub mod model;
pub mod notify;
pub mod orchestrator;
pub mod pagination;
pub mod selection;
pub mod service;
pub mod store;
pub mod tree;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{
    ActionDescriptor, ActionDispatcher, ActionKind, ActionTarget, BulkAction, ConfirmText,
    DeleteRoute, DispatchOutcome, GlobalAction, RowAction,
};
pub use config::EngineConfig;
pub use error::CoreError;
pub use gate::{ConfirmOptions, ConfirmPrompt, ConfirmationGate, ExecuteOutcome, GateState};
pub use notify::{ChannelNotifier, Notification, NotificationKind, Notifier, TracingNotifier};
pub use orchestrator::{LoadOutcome, Orchestrator};
pub use pagination::PaginationCoordinator;
pub use selection::SelectionEngine;
pub use service::{DataService, ServiceError, TreeService};
pub use store::{BatchDeleteReport, ScreenState};
pub use tree::{TreeIndex, VisibleRow, find_ancestors, flatten};

pub use model::{ItemId, ListPage, ListQuery, LoadStatus, ModalState, PageState, Record, SearchState};
