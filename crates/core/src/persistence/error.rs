use thiserror::Error;

/// Boxed underlying cause of a persistence failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while persisting skill attributes.
///
/// Every backend or configuration failure surfaces as this single type.
/// Absence of attributes is never an error; it is reported as `Ok(None)`.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    PartitionKey(String),

    #[error("Table {table_name} does not exist or is in the process of being created")]
    TableNotFound {
        table_name: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("{message}")]
    Backend {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Create table request failed for {table_name}")]
    TableCreation {
        table_name: String,
        #[source]
        source: BoxError,
    },

    #[error("Timeout waiting for table {table_name} to become active")]
    TableActivationTimeout { table_name: String },

    #[error("Table {table_name} is not usable (status: {status})")]
    TableUnavailable { table_name: String, status: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl PersistenceError {
    /// Wraps a backend failure with a human-readable message.
    pub fn backend(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Backend {
            message: message.into(),
            source: source.into(),
        }
    }

    /// A missing-table failure with the backend's own error as cause.
    pub fn table_not_found(table_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::TableNotFound {
            table_name: table_name.into(),
            source: Some(source.into()),
        }
    }

    /// A table creation failure other than "table already exists".
    pub fn table_creation(table_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::TableCreation {
            table_name: table_name.into(),
            source: source.into(),
        }
    }

    /// Returns true if the failure means the target table is missing.
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, Self::TableNotFound { .. })
    }
}

/// Result type for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
