// ── Injected data service contracts ──
//
// The engine never talks to a transport directly. Each screen is handed
// a `DataService` implementation; hierarchical screens additionally rely
// on the `TreeService` extension.

use std::future::Future;

use thiserror::Error;

use crate::model::{ItemId, ListPage, ListQuery, Record};

/// Failure reported by a data service implementation.
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("record {id} not found")]
    NotFound { id: ItemId },

    #[error("rejected: {message}")]
    Rejected { message: String },

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("storage error: {0}")]
    Storage(String),
}

/// CRUD backend for one screen.
///
/// Implementations must be cheap to share (`Send + Sync`); the orchestrator
/// holds them behind an `Arc` and may issue overlapping calls.
pub trait DataService: Send + Sync + 'static {
    type Item: Record;
    type Create: Send + 'static;
    type Update: Send + 'static;

    fn list(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = Result<ListPage<Self::Item>, ServiceError>> + Send;

    fn create(
        &self,
        data: Self::Create,
    ) -> impl Future<Output = Result<Self::Item, ServiceError>> + Send;

    fn update(
        &self,
        id: &ItemId,
        data: Self::Update,
    ) -> impl Future<Output = Result<Self::Item, ServiceError>> + Send;

    fn delete(&self, id: &ItemId) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

/// Listing variant for services whose records carry their children.
///
/// The default delegates to `list`, which is correct whenever `list`
/// already returns fully populated trees.
pub trait TreeService: DataService {
    fn list_with_children(
        &self,
        query: ListQuery,
    ) -> impl Future<Output = Result<ListPage<Self::Item>, ServiceError>> + Send {
        self.list(query)
    }
}
