//! Partition key generation.
//!
//! A generator maps a request envelope to the key that identifies whose
//! attributes a call targets. Generators must be pure: the same envelope
//! always yields the same key.

use crate::envelope::RequestEnvelope;

use super::{PersistenceError, Result};

/// Derives a partition key from a request envelope.
pub trait PartitionKeyGenerator: Send + Sync {
    fn generate(&self, envelope: &RequestEnvelope) -> Result<String>;
}

impl<F> PartitionKeyGenerator for F
where
    F: Fn(&RequestEnvelope) -> Result<String> + Send + Sync,
{
    fn generate(&self, envelope: &RequestEnvelope) -> Result<String> {
        self(envelope)
    }
}

/// Keys attributes by the invoking user's id. This is the default.
pub fn user_id(envelope: &RequestEnvelope) -> Result<String> {
    non_empty(envelope.user_id(), "user ID")
}

/// Keys attributes by the invoking device's id.
pub fn device_id(envelope: &RequestEnvelope) -> Result<String> {
    non_empty(envelope.device_id(), "device ID")
}

fn non_empty(value: Option<&str>, what: &str) -> Result<String> {
    match value {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(PersistenceError::PartitionKey(format!(
            "Could not retrieve {} from request envelope to generate persistence ID",
            what
        ))),
    }
}
