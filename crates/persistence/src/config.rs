//! Settings loaded from environment variables.

use std::env;

use skill_persistence_core::persistence::{
    DEFAULT_ATTRIBUTES_KEY_NAME, DEFAULT_AUTO_CREATE_TABLE, DEFAULT_PARTITION_KEY_NAME,
};
use skill_persistence_core::{AdapterConfig, PersistenceError, Result, TableDescriptor};

pub const TABLE_NAME_VAR: &str = "SKILL_ATTRIBUTES_TABLE";
pub const PARTITION_KEY_NAME_VAR: &str = "SKILL_ATTRIBUTES_PARTITION_KEY_NAME";
pub const ATTRIBUTES_KEY_NAME_VAR: &str = "SKILL_ATTRIBUTES_ATTRIBUTES_KEY_NAME";
pub const AUTO_CREATE_TABLE_VAR: &str = "SKILL_ATTRIBUTES_AUTO_CREATE_TABLE";
pub const ENDPOINT_URL_VAR: &str = "AWS_ENDPOINT_URL";
pub const REGION_VAR: &str = "AWS_REGION";

pub const DEFAULT_REGION: &str = "us-east-1";

/// AWS client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsConfig {
    /// Custom endpoint URL (for local DynamoDB).
    pub endpoint_url: Option<String>,
    /// AWS region.
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }
}

impl AwsConfig {
    /// Reads `AWS_ENDPOINT_URL` and `AWS_REGION` (default: "us-east-1").
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            endpoint_url: lookup(ENDPOINT_URL_VAR).filter(|url| !url.is_empty()),
            region: lookup(REGION_VAR).unwrap_or_else(|| DEFAULT_REGION.to_string()),
        }
    }

    /// Returns a display string for the target environment.
    pub fn target_display(&self) -> String {
        match &self.endpoint_url {
            Some(url) => format!("Local DynamoDB ({})", url),
            None => format!("AWS DynamoDB (region: {})", self.region),
        }
    }
}

/// Adapter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Table holding the attributes (required).
    pub table_name: String,
    /// Partition key attribute name (default: "id")
    pub partition_key_name: String,
    /// Attributes attribute name (default: "attributes")
    pub attributes_key_name: String,
    /// Create the table on startup when missing (default: false)
    pub auto_create_table: bool,
    pub aws: AwsConfig,
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// Environment variables:
    /// - `SKILL_ATTRIBUTES_TABLE` - Table name (required)
    /// - `SKILL_ATTRIBUTES_PARTITION_KEY_NAME` - Partition key name (default: "id")
    /// - `SKILL_ATTRIBUTES_ATTRIBUTES_KEY_NAME` - Attributes key name (default: "attributes")
    /// - `SKILL_ATTRIBUTES_AUTO_CREATE_TABLE` - "true"/"1" to create the table (default: false)
    /// - `AWS_ENDPOINT_URL` - Use local DynamoDB (e.g., http://localhost:8000)
    /// - `AWS_REGION` - AWS region (default: "us-east-1")
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through `lookup`, which maps variable names to values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let table_name = lookup(TABLE_NAME_VAR)
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                PersistenceError::InvalidConfig(format!("{} must be set", TABLE_NAME_VAR))
            })?;

        let auto_create_table = match lookup(AUTO_CREATE_TABLE_VAR) {
            Some(value) => parse_bool(AUTO_CREATE_TABLE_VAR, &value)?,
            None => DEFAULT_AUTO_CREATE_TABLE,
        };

        Ok(Self {
            table_name,
            partition_key_name: lookup(PARTITION_KEY_NAME_VAR)
                .unwrap_or_else(|| DEFAULT_PARTITION_KEY_NAME.to_string()),
            attributes_key_name: lookup(ATTRIBUTES_KEY_NAME_VAR)
                .unwrap_or_else(|| DEFAULT_ATTRIBUTES_KEY_NAME.to_string()),
            auto_create_table,
            aws: AwsConfig::from_lookup(&lookup),
        })
    }

    /// Validate the settings into an adapter configuration.
    pub fn adapter_config(&self) -> Result<AdapterConfig> {
        let table = TableDescriptor::new(
            self.table_name.as_str(),
            self.partition_key_name.as_str(),
            self.attributes_key_name.as_str(),
        )?;
        Ok(AdapterConfig::from_table(table).with_auto_create_table(self.auto_create_table))
    }
}

fn parse_bool(var: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" | "" => Ok(false),
        other => Err(PersistenceError::InvalidConfig(format!(
            "{} must be a boolean, got '{}'",
            var, other
        ))),
    }
}

/// Creates a DynamoDB client with the given configuration.
///
/// Credentials come from the SDK's default provider chain.
#[cfg(feature = "dynamodb")]
pub async fn create_client(config: &AwsConfig) -> aws_sdk_dynamodb::Client {
    let mut sdk_config_loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        sdk_config_loader = sdk_config_loader.endpoint_url(endpoint);
    }

    let sdk_config = sdk_config_loader.load().await;
    aws_sdk_dynamodb::Client::new(&sdk_config)
}
