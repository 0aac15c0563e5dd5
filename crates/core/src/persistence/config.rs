use std::fmt;
use std::sync::Arc;

use crate::envelope::RequestEnvelope;

use super::partition_keys::{self, PartitionKeyGenerator};
use super::{PersistenceError, Result, TableDescriptor, DEFAULT_AUTO_CREATE_TABLE};

/// Immutable adapter configuration.
///
/// Built once through [`AdapterConfig::new`] (which validates the table
/// descriptor) and then refined with the `with_*` methods.
#[derive(Clone)]
pub struct AdapterConfig {
    table: TableDescriptor,
    partition_key_generator: Arc<dyn PartitionKeyGenerator>,
    auto_create_table: bool,
}

impl AdapterConfig {
    /// Creates a configuration for `table_name` with every other option at
    /// its default.
    pub fn new(table_name: impl Into<String>) -> Result<Self> {
        Ok(Self::from_table(TableDescriptor::with_defaults(table_name)?))
    }

    /// Creates a configuration from an already validated descriptor.
    pub fn from_table(table: TableDescriptor) -> Self {
        Self {
            table,
            partition_key_generator: Arc::new(partition_keys::user_id),
            auto_create_table: DEFAULT_AUTO_CREATE_TABLE,
        }
    }

    /// Replaces the partition key and attributes key names.
    pub fn with_key_names(
        self,
        partition_key_name: impl Into<String>,
        attributes_key_name: impl Into<String>,
    ) -> Result<Self> {
        let table = TableDescriptor::new(
            self.table.table_name(),
            partition_key_name,
            attributes_key_name,
        )?;
        Ok(Self { table, ..self })
    }

    /// Replaces the partition key generator.
    pub fn with_partition_key_generator(
        self,
        generator: impl PartitionKeyGenerator + 'static,
    ) -> Self {
        Self {
            partition_key_generator: Arc::new(generator),
            ..self
        }
    }

    /// Sets whether adapter initialization creates the table when missing.
    pub fn with_auto_create_table(self, auto_create_table: bool) -> Self {
        Self {
            auto_create_table,
            ..self
        }
    }

    pub fn table(&self) -> &TableDescriptor {
        &self.table
    }

    pub fn auto_create_table(&self) -> bool {
        self.auto_create_table
    }

    /// Derives the partition key for `envelope`.
    pub fn partition_key(&self, envelope: &RequestEnvelope) -> Result<String> {
        let key = self.partition_key_generator.generate(envelope)?;
        if key.is_empty() {
            return Err(PersistenceError::PartitionKey(
                "Partition key generator returned an empty key".to_string(),
            ));
        }
        Ok(key)
    }
}

impl fmt::Debug for AdapterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("table", &self.table)
            .field("auto_create_table", &self.auto_create_table)
            .finish_non_exhaustive()
    }
}
