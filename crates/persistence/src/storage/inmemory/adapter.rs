//! In-memory persistence adapter.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use skill_persistence_core::{
    AdapterConfig, AttributeMap, EnsureTableOutcome, PersistenceAdapter, PersistenceError,
    RequestEnvelope, Result, TableDescriptor,
};

/// Items of one table, keyed by partition key. Each item holds the partition
/// key attribute and the attributes attribute, like a stored DynamoDB item.
type Table = HashMap<String, AttributeMap>;

/// A set of named in-memory tables.
///
/// Uses a HashMap wrapped in `Arc<RwLock<_>>` for thread-safe access. Clones
/// share the same tables. Data is lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTables {
    tables: Arc<RwLock<HashMap<String, Table>>>,
}

impl InMemoryTables {
    /// Creates an empty set of tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set of tables containing one empty table.
    pub fn with_table(table_name: impl Into<String>) -> Self {
        let mut tables = HashMap::new();
        tables.insert(table_name.into(), Table::new());
        Self {
            tables: Arc::new(RwLock::new(tables)),
        }
    }

    /// Creates `table_name` if it is missing.
    pub async fn create_table(&self, table_name: &str) -> EnsureTableOutcome {
        let mut tables = self.tables.write().await;
        if tables.contains_key(table_name) {
            return EnsureTableOutcome::AlreadyExists;
        }
        tables.insert(table_name.to_string(), Table::new());
        EnsureTableOutcome::Created
    }

    pub async fn has_table(&self, table_name: &str) -> bool {
        self.tables.read().await.contains_key(table_name)
    }

    /// Stores a raw item, bypassing the adapter's item layout.
    pub async fn put_item(
        &self,
        table_name: &str,
        partition_key: impl Into<String>,
        item: AttributeMap,
    ) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| missing_table(table_name))?;
        table.insert(partition_key.into(), item);
        Ok(())
    }

    /// Returns a copy of a raw item.
    pub async fn get_item(
        &self,
        table_name: &str,
        partition_key: &str,
    ) -> Result<Option<AttributeMap>> {
        let tables = self.tables.read().await;
        let table = tables
            .get(table_name)
            .ok_or_else(|| missing_table(table_name))?;
        Ok(table.get(partition_key).cloned())
    }

    async fn delete_item(&self, table_name: &str, partition_key: &str) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| missing_table(table_name))?;
        table.remove(partition_key);
        Ok(())
    }
}

fn missing_table(table_name: &str) -> PersistenceError {
    PersistenceError::TableNotFound {
        table_name: table_name.to_string(),
        source: None,
    }
}

/// In-memory attribute store for tests and local development.
///
/// Lays items out the same way the DynamoDB adapter does, so a stored item is
/// `{<partition key name>: key, <attributes key name>: {..}}`.
#[derive(Debug, Clone)]
pub struct InMemoryPersistenceAdapter {
    tables: InMemoryTables,
    config: AdapterConfig,
}

impl InMemoryPersistenceAdapter {
    /// Creates an adapter over `tables`. Does not create the table.
    pub fn new(tables: InMemoryTables, config: AdapterConfig) -> Self {
        Self { tables, config }
    }

    /// Creates an adapter and, when `auto_create_table` is set, makes sure its
    /// table exists.
    pub async fn initialize(tables: InMemoryTables, config: AdapterConfig) -> Result<Self> {
        let adapter = Self::new(tables, config);
        if adapter.config.auto_create_table() {
            adapter.ensure_table().await?;
        }
        Ok(adapter)
    }

    /// Creates the table if it doesn't exist.
    pub async fn ensure_table(&self) -> Result<EnsureTableOutcome> {
        let outcome = self.tables.create_table(self.table().table_name()).await;
        if outcome == EnsureTableOutcome::Created {
            tracing::info!(
                table = %self.table().table_name(),
                "Created in-memory attributes table"
            );
        }
        Ok(outcome)
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// The tables this adapter reads and writes.
    pub fn tables(&self) -> &InMemoryTables {
        &self.tables
    }

    fn table(&self) -> &TableDescriptor {
        self.config.table()
    }
}

#[async_trait]
impl PersistenceAdapter for InMemoryPersistenceAdapter {
    async fn get_attributes(&self, envelope: &RequestEnvelope) -> Result<Option<AttributeMap>> {
        let partition_key = self.config.partition_key(envelope)?;
        let table = self.table();

        let Some(item) = self
            .tables
            .get_item(table.table_name(), &partition_key)
            .await?
        else {
            return Ok(None);
        };

        match item.get(table.attributes_key_name()) {
            None => Ok(None),
            Some(Value::Object(attributes)) => Ok(Some(attributes.clone())),
            Some(_) => Err(PersistenceError::InvalidData(format!(
                "Attribute {} of item {} is not a map",
                table.attributes_key_name(),
                partition_key
            ))),
        }
    }

    async fn save_attributes(
        &self,
        envelope: &RequestEnvelope,
        attributes: &AttributeMap,
    ) -> Result<()> {
        let partition_key = self.config.partition_key(envelope)?;
        let table = self.table();

        let mut item = AttributeMap::new();
        item.insert(
            table.partition_key_name().to_string(),
            Value::String(partition_key.clone()),
        );
        item.insert(
            table.attributes_key_name().to_string(),
            Value::Object(attributes.clone()),
        );

        self.tables
            .put_item(table.table_name(), partition_key, item)
            .await
    }

    async fn delete_attributes(&self, envelope: &RequestEnvelope) -> Result<()> {
        let partition_key = self.config.partition_key(envelope)?;
        self.tables
            .delete_item(self.table().table_name(), &partition_key)
            .await
    }
}
