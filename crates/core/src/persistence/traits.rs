use async_trait::async_trait;

use crate::envelope::RequestEnvelope;

use super::{AttributeMap, Result};

/// Stores a skill's persistent attributes, keyed by a partition key derived
/// from the request envelope.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Gets the attributes stored for the envelope's partition key.
    ///
    /// Returns `Ok(None)` when nothing has been saved for that key.
    async fn get_attributes(&self, envelope: &RequestEnvelope) -> Result<Option<AttributeMap>>;

    /// Saves attributes, replacing whatever was stored for the key.
    async fn save_attributes(
        &self,
        envelope: &RequestEnvelope,
        attributes: &AttributeMap,
    ) -> Result<()>;

    /// Deletes the attributes stored for the key. Deleting a key with no
    /// attributes succeeds.
    async fn delete_attributes(&self, envelope: &RequestEnvelope) -> Result<()>;
}
