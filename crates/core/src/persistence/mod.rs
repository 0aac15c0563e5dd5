mod config;
mod error;
pub mod partition_keys;
mod traits;
mod types;

pub use config::AdapterConfig;
pub use error::{BoxError, PersistenceError, Result};
pub use partition_keys::PartitionKeyGenerator;
pub use traits::PersistenceAdapter;
pub use types::{
    AttributeMap, EnsureTableOutcome, TableDescriptor, DEFAULT_ATTRIBUTES_KEY_NAME,
    DEFAULT_AUTO_CREATE_TABLE, DEFAULT_PARTITION_KEY_NAME, DEFAULT_READ_CAPACITY_UNITS,
    DEFAULT_WRITE_CAPACITY_UNITS,
};
