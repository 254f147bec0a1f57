//! Local draft persistence
//!
//! - `serializer`: persistable copy of a draft with binary handles removed
//! - `snapshot`: canonical strings for "has anything changed"
//! - `backend`: key-value storage trait with file and in-memory backends
//! - `store`: [`DraftStore`], keyed create/read/delete of [`DraftRecord`]s

pub mod backend;
pub mod serializer;
pub mod snapshot;
pub mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend, StoreError};
pub use serializer::{serialize, SerializableDraft};
pub use snapshot::{has_changed, snapshot, Snapshot};
pub use store::{DraftRecord, DraftStore, DraftSummary, KEY_PREFIX};
