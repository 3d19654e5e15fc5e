//! Persistence adapters: SQLite store, in-memory store, local audio storage.

pub mod object_store;
pub mod memory_repo;
pub mod sqlite_repo;

pub use object_store::FsObjectStore;
pub use memory_repo::MemoryRepo;
pub use sqlite_repo::SqliteRepo;
