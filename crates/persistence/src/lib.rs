//! Persist voice skill attributes.
//!
//! Backends for the [`PersistenceAdapter`] contract from
//! `skill_persistence_core`, plus the environment settings used to build them.
//!
//! ```no_run
//! use skill_persistence::{DynamoDbPersistenceAdapter, PersistenceAdapter, RequestEnvelope};
//!
//! # async fn run() -> skill_persistence::Result<()> {
//! let adapter = DynamoDbPersistenceAdapter::from_env().await?;
//! let envelope = RequestEnvelope::for_user("amzn1.ask.account.ABC");
//!
//! let mut attributes = adapter.get_attributes(&envelope).await?.unwrap_or_default();
//! attributes.insert("visits".to_string(), serde_json::json!(1));
//! adapter.save_attributes(&envelope, &attributes).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod storage;

pub use skill_persistence_core::persistence::partition_keys;
pub use skill_persistence_core::{
    envelope, AdapterConfig, AttributeMap, EnsureTableOutcome, PartitionKeyGenerator,
    PersistenceAdapter, PersistenceError, RequestEnvelope, Result, TableDescriptor,
};

#[cfg(feature = "dynamodb")]
pub use storage::DynamoDbPersistenceAdapter;

#[cfg(feature = "inmemory")]
pub use storage::{InMemoryPersistenceAdapter, InMemoryTables};
