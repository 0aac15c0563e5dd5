//! Storage backend implementations.
//!
//! This module provides concrete implementations of the
//! `PersistenceAdapter` trait defined in `skill_persistence_core`. Backends
//! are selected at compile time via feature flags.
//!
//! # Feature Flags
//!
//! - `dynamodb` (default): AWS DynamoDB backend using `aws-sdk-dynamodb`
//! - `inmemory` (default): process-local backend for tests and local runs
//!
//! Build without the AWS SDK:
//! ```bash
//! cargo build -p skill_persistence --no-default-features --features inmemory
//! ```

#[cfg(not(any(feature = "dynamodb", feature = "inmemory")))]
compile_error!(
    "No storage backend selected. Enable 'dynamodb' or 'inmemory' feature. \
    Example: cargo build -p skill_persistence --features dynamodb"
);

#[cfg(feature = "dynamodb")]
pub mod dynamodb;

#[cfg(feature = "inmemory")]
pub mod inmemory;

#[cfg(feature = "dynamodb")]
pub use dynamodb::DynamoDbPersistenceAdapter;

#[cfg(feature = "inmemory")]
pub use inmemory::{InMemoryPersistenceAdapter, InMemoryTables};
