//! Scrutineer-State: persistence for the Scrutineer compliance workflow
//!
//! This crate handles all I/O behind the workflow: per-session documents
//! (task ledger plus suspended runs) and long-term memory.
//!
//! ## Key Components
//!
//! - `SessionStore` / `FsSessionStore`: one JSON document per session
//! - `MemoryService` / `SurrealMemoryService`: searchable run history in SurrealDB
//! - `fakes`: in-memory implementations for tests

mod error;
pub mod fakes;
pub mod fs_store;
mod migrations;
mod schema;
pub mod storage_traits;
pub mod surreal_memory;

pub use error::StorageError;
pub use fs_store::FsSessionStore;
pub use schema::MemoryRecord;
pub use storage_traits::{
    ContentDigest, MemoryEntry, MemoryEntryKind, MemoryQuery, MemoryService, SessionId,
    SessionStore, StorageResult,
};
pub use surreal_memory::SurrealMemoryService;
