use async_trait::async_trait;
use uuid::Uuid;

use crate::document::{Document, Filter, Patch};
use crate::error::StoreResult;

/// The narrow persistence interface the core consumes.
///
/// Every operation except [`find_by_id_any`](Self::find_by_id_any) is scoped
/// to *active* documents (`deleted_at` unset). Mutations are conditioned on
/// the document still being active at write time, so an update racing a soft
/// delete loses cleanly with `Ok(None)` instead of resurrecting the record.
#[async_trait]
pub trait EntityStore<T: Document>: Send + Sync {
    async fn insert(&self, doc: T) -> StoreResult<T>;

    async fn find_active_by_id(&self, id: Uuid) -> StoreResult<Option<T>>;

    /// Unfiltered lookup: returns soft-deleted documents too.
    async fn find_by_id_any(&self, id: Uuid) -> StoreResult<Option<T>>;

    async fn find_active(&self, filter: Filter) -> StoreResult<Vec<T>>;

    async fn exists_active(&self, filter: Filter) -> StoreResult<bool>;

    async fn count_active(&self, filter: Filter) -> StoreResult<u64>;

    /// Applies `patch` to the active document with the given id and returns
    /// the updated document, or `Ok(None)` when no active document matches.
    async fn update_active_by_id(&self, id: Uuid, patch: Patch) -> StoreResult<Option<T>>;

    /// Marks the active document deleted and returns it, or `Ok(None)` when
    /// no active document matches. Documents are never physically removed.
    async fn soft_delete_by_id(&self, id: Uuid) -> StoreResult<Option<T>>;
}
