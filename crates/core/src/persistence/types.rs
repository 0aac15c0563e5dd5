use super::{PersistenceError, Result};

/// A skill's persisted attributes: string keys to JSON-like values.
pub type AttributeMap = serde_json::Map<String, serde_json::Value>;

/// Default name of the partition key attribute.
pub const DEFAULT_PARTITION_KEY_NAME: &str = "id";

/// Default name of the attribute holding the attribute map.
pub const DEFAULT_ATTRIBUTES_KEY_NAME: &str = "attributes";

/// Tables are not created unless asked to.
pub const DEFAULT_AUTO_CREATE_TABLE: bool = false;

/// Provisioned read capacity for auto-created tables.
pub const DEFAULT_READ_CAPACITY_UNITS: i64 = 5;

/// Provisioned write capacity for auto-created tables.
pub const DEFAULT_WRITE_CAPACITY_UNITS: i64 = 5;

/// Where attributes live: table name plus the two attribute names that
/// shape every stored item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    table_name: String,
    partition_key_name: String,
    attributes_key_name: String,
}

impl TableDescriptor {
    /// Creates a descriptor, validating that every name is non-empty and
    /// that the two attribute names differ.
    pub fn new(
        table_name: impl Into<String>,
        partition_key_name: impl Into<String>,
        attributes_key_name: impl Into<String>,
    ) -> Result<Self> {
        let table_name = table_name.into();
        let partition_key_name = partition_key_name.into();
        let attributes_key_name = attributes_key_name.into();

        if table_name.trim().is_empty() {
            return Err(PersistenceError::InvalidConfig(
                "table name must not be empty".to_string(),
            ));
        }
        if partition_key_name.trim().is_empty() {
            return Err(PersistenceError::InvalidConfig(
                "partition key name must not be empty".to_string(),
            ));
        }
        if attributes_key_name.trim().is_empty() {
            return Err(PersistenceError::InvalidConfig(
                "attributes key name must not be empty".to_string(),
            ));
        }
        if partition_key_name == attributes_key_name {
            return Err(PersistenceError::InvalidConfig(format!(
                "partition key name and attributes key name must differ (both are '{}')",
                partition_key_name
            )));
        }

        Ok(Self {
            table_name,
            partition_key_name,
            attributes_key_name,
        })
    }

    /// Creates a descriptor with the default attribute names.
    pub fn with_defaults(table_name: impl Into<String>) -> Result<Self> {
        Self::new(
            table_name,
            DEFAULT_PARTITION_KEY_NAME,
            DEFAULT_ATTRIBUTES_KEY_NAME,
        )
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn partition_key_name(&self) -> &str {
        &self.partition_key_name
    }

    pub fn attributes_key_name(&self) -> &str {
        &self.attributes_key_name
    }
}

/// What `ensure_table` found or did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureTableOutcome {
    /// The table was missing and has been created.
    Created,
    /// The table was already there (or another caller created it first).
    AlreadyExists,
}
