//! Table provisioning.
//!
//! Planning is pure (spec, status, plan); the async functions at the bottom
//! are the imperative shell that talks to DynamoDB.

use std::fmt;
use std::time::Duration;

use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput, ScalarAttributeType,
    TableStatus as SdkTableStatus,
};
use aws_sdk_dynamodb::Client;

use skill_persistence_core::persistence::{
    DEFAULT_READ_CAPACITY_UNITS, DEFAULT_WRITE_CAPACITY_UNITS,
};
use skill_persistence_core::{EnsureTableOutcome, PersistenceError, Result, TableDescriptor};

use super::error::{
    map_create_table_error, map_describe_table_error, CreateTableFailure, DescribeTableFailure,
};

// ============================================================================
// Functional core
// ============================================================================

/// Schema of an attributes table: one string hash key, fixed throughput.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub table_name: String,
    pub partition_key_name: String,
    pub read_capacity_units: i64,
    pub write_capacity_units: i64,
}

impl TableSpec {
    /// The table the adapter expects for `table`.
    pub fn for_descriptor(table: &TableDescriptor) -> Self {
        Self {
            table_name: table.table_name().to_string(),
            partition_key_name: table.partition_key_name().to_string(),
            read_capacity_units: DEFAULT_READ_CAPACITY_UNITS,
            write_capacity_units: DEFAULT_WRITE_CAPACITY_UNITS,
        }
    }
}

/// Table status as far as provisioning cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableStatus {
    Active,
    Creating,
    Updating,
    Deleting,
    /// Archived, archiving, or without access to its encryption key.
    Unavailable,
}

impl TableStatus {
    /// Convert the SDK's status. A description without a status counts as active.
    pub fn from_sdk(status: Option<&SdkTableStatus>) -> Self {
        match status {
            Some(SdkTableStatus::Active) | None => TableStatus::Active,
            Some(SdkTableStatus::Creating) => TableStatus::Creating,
            Some(SdkTableStatus::Updating) => TableStatus::Updating,
            Some(SdkTableStatus::Deleting) => TableStatus::Deleting,
            Some(_) => TableStatus::Unavailable,
        }
    }

    /// Whether reads and writes can be served.
    pub fn is_usable(self) -> bool {
        matches!(self, TableStatus::Active | TableStatus::Updating)
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TableStatus::Active => "ACTIVE",
            TableStatus::Creating => "CREATING",
            TableStatus::Updating => "UPDATING",
            TableStatus::Deleting => "DELETING",
            TableStatus::Unavailable => "UNAVAILABLE",
        };
        f.write_str(s)
    }
}

/// What has to happen for the table to be usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TablePlan {
    /// Table doesn't exist, needs to be created.
    CreateTable { spec: TableSpec },
    /// Table exists and is still being created.
    AwaitActive,
    /// Table is ready, nothing to do.
    NoChanges,
    /// Table exists but cannot become usable.
    Unavailable { status: TableStatus },
}

/// Pure function: calculate what is needed to reach a usable table.
pub fn calculate_table_plan(current: Option<TableStatus>, desired: &TableSpec) -> TablePlan {
    match current {
        None => TablePlan::CreateTable {
            spec: desired.clone(),
        },
        Some(status) if status.is_usable() => TablePlan::NoChanges,
        Some(TableStatus::Creating) => TablePlan::AwaitActive,
        Some(status) => TablePlan::Unavailable { status },
    }
}

/// How long to wait for a new table to become active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationPolicy {
    pub max_attempts: u32,
    pub poll_interval: Duration,
}

impl Default for ActivationPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Key schema for `spec`: a single HASH key.
pub fn key_schema(spec: &TableSpec) -> Result<Vec<KeySchemaElement>> {
    let element = KeySchemaElement::builder()
        .attribute_name(&spec.partition_key_name)
        .key_type(KeyType::Hash)
        .build()
        .map_err(|e| PersistenceError::table_creation(&spec.table_name, e))?;
    Ok(vec![element])
}

/// Attribute definitions for `spec`: the hash key is a string.
pub fn attribute_definitions(spec: &TableSpec) -> Result<Vec<AttributeDefinition>> {
    let definition = AttributeDefinition::builder()
        .attribute_name(&spec.partition_key_name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .map_err(|e| PersistenceError::table_creation(&spec.table_name, e))?;
    Ok(vec![definition])
}

/// Fixed provisioned throughput for `spec`.
pub fn provisioned_throughput(spec: &TableSpec) -> Result<ProvisionedThroughput> {
    ProvisionedThroughput::builder()
        .read_capacity_units(spec.read_capacity_units)
        .write_capacity_units(spec.write_capacity_units)
        .build()
        .map_err(|e| PersistenceError::table_creation(&spec.table_name, e))
}

// ============================================================================
// Imperative shell
// ============================================================================

/// Make sure the table described by `table` exists and is usable, creating it
/// if missing.
pub async fn ensure_table(
    client: &Client,
    table: &TableDescriptor,
    policy: ActivationPolicy,
) -> Result<EnsureTableOutcome> {
    let desired = TableSpec::for_descriptor(table);
    let current = describe_table_status(client, &desired.table_name).await?;

    match calculate_table_plan(current, &desired) {
        TablePlan::NoChanges => Ok(EnsureTableOutcome::AlreadyExists),
        TablePlan::AwaitActive => {
            wait_for_table_active(client, &desired.table_name, policy).await?;
            Ok(EnsureTableOutcome::AlreadyExists)
        }
        TablePlan::CreateTable { spec } => {
            let outcome = create_table(client, &spec).await?;
            wait_for_table_active(client, &spec.table_name, policy).await?;
            Ok(outcome)
        }
        TablePlan::Unavailable { status } => Err(PersistenceError::TableUnavailable {
            table_name: desired.table_name,
            status: status.to_string(),
        }),
    }
}

/// Fetches the current table status, returns None if the table doesn't exist.
pub async fn describe_table_status(
    client: &Client,
    table_name: &str,
) -> Result<Option<TableStatus>> {
    match client.describe_table().table_name(table_name).send().await {
        Ok(response) => {
            let status = response.table().and_then(|table| table.table_status());
            Ok(Some(TableStatus::from_sdk(status)))
        }
        Err(err) => match map_describe_table_error(err) {
            DescribeTableFailure::NotFound => Ok(None),
            DescribeTableFailure::Failed(e) => Err(e),
        },
    }
}

async fn create_table(client: &Client, spec: &TableSpec) -> Result<EnsureTableOutcome> {
    let result = client
        .create_table()
        .table_name(&spec.table_name)
        .set_key_schema(Some(key_schema(spec)?))
        .set_attribute_definitions(Some(attribute_definitions(spec)?))
        .provisioned_throughput(provisioned_throughput(spec)?)
        .send()
        .await;

    match result {
        Ok(_) => {
            tracing::info!(
                table = %spec.table_name,
                partition_key = %spec.partition_key_name,
                "Created attributes table"
            );
            Ok(EnsureTableOutcome::Created)
        }
        Err(err) => match map_create_table_error(err, &spec.table_name) {
            CreateTableFailure::AlreadyExists => {
                tracing::debug!(table = %spec.table_name, "Table created concurrently");
                Ok(EnsureTableOutcome::AlreadyExists)
            }
            CreateTableFailure::Failed(e) => Err(e),
        },
    }
}

async fn wait_for_table_active(
    client: &Client,
    table_name: &str,
    policy: ActivationPolicy,
) -> Result<()> {
    for attempt in 0..policy.max_attempts {
        match describe_table_status(client, table_name).await? {
            Some(status) if status.is_usable() => return Ok(()),
            Some(TableStatus::Creating) | None => {
                tracing::debug!(table = %table_name, attempt, "Waiting for table");
            }
            Some(status) => {
                return Err(PersistenceError::TableUnavailable {
                    table_name: table_name.to_string(),
                    status: status.to_string(),
                });
            }
        }
        tokio::time::sleep(policy.poll_interval).await;
    }

    Err(PersistenceError::TableActivationTimeout {
        table_name: table_name.to_string(),
    })
}
