//! Core types for persisting skill attributes.
//!
//! Pure data and contracts only: the attribute map, the request envelope
//! model, adapter configuration, partition key generators and the
//! [`PersistenceAdapter`] trait. Backends live in the `skill_persistence`
//! crate.

pub mod envelope;
pub mod persistence;

pub use envelope::RequestEnvelope;
pub use persistence::{
    AdapterConfig, AttributeMap, EnsureTableOutcome, PartitionKeyGenerator, PersistenceAdapter,
    PersistenceError, Result, TableDescriptor,
};
