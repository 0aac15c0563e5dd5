//! In-memory storage backend.

mod adapter;

pub use adapter::{InMemoryPersistenceAdapter, InMemoryTables};
