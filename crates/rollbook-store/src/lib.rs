//! # Rollbook Store
//!
//! Document store interface and in-memory backend for Rollbook.
//!
//! The core consumes persistence through the narrow [`EntityStore`] trait:
//! insert, active-scoped lookups and counts, `$set`-style conditional partial
//! updates, and soft deletes. Soft-deleted documents (`deleted_at` set) are
//! invisible to every `*_active` operation but remain fetchable through
//! [`EntityStore::find_by_id_any`].
//!
//! [`MemoryStore`] is the bundled backend: documents are held as JSON
//! objects behind an async lock, so every operation is a suspension point
//! and no lock is held across them.
//!
//! # Example
//!
//! ```ignore
//! use rollbook_store::{EntityStore, Filter, MemoryStore, Patch};
//!
//! let store: MemoryStore<Student> = MemoryStore::new();
//! store.insert(student).await?;
//! let n = store.count_active(Filter::new().eq("classroom_id", classroom_id)).await?;
//! store.update_active_by_id(id, Patch::new().set("name", "Ada")).await?;
//! ```

pub mod document;
pub mod error;
pub mod memory;
pub mod store;

pub use document::{Document, Filter, Patch};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::EntityStore;
