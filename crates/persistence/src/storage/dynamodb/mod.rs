//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of the persistence
//! adapter trait using `aws-sdk-dynamodb`.

mod adapter;
pub mod conversions;
mod error;
pub mod table;

#[cfg(test)]
mod testing;

pub use adapter::DynamoDbPersistenceAdapter;
pub use table::{ActivationPolicy, TableStatus};
