//! DynamoDB persistence adapter.
//!
//! Implements `PersistenceAdapter` from `skill_persistence_core` using DynamoDB.

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;

use skill_persistence_core::{
    AdapterConfig, AttributeMap, EnsureTableOutcome, PersistenceAdapter, RequestEnvelope, Result,
};

use super::conversions::{attributes_to_item, item_to_attributes, key_for};
use super::error::{map_delete_item_error, map_get_item_error, map_put_item_error};
use super::table::{self, ActivationPolicy};
use crate::config::{create_client, Settings};

/// DynamoDB-backed attribute store.
///
/// Holds an immutable configuration and a client handle; the client is
/// cheap to clone and safe to share between tasks.
#[derive(Debug, Clone)]
pub struct DynamoDbPersistenceAdapter {
    client: Client,
    config: AdapterConfig,
    activation: ActivationPolicy,
}

impl DynamoDbPersistenceAdapter {
    /// Creates an adapter. Performs no I/O.
    pub fn new(client: Client, config: AdapterConfig) -> Self {
        Self {
            client,
            config,
            activation: ActivationPolicy::default(),
        }
    }

    /// Creates an adapter and, when `auto_create_table` is set, makes sure
    /// its table exists before returning.
    pub async fn initialize(client: Client, config: AdapterConfig) -> Result<Self> {
        let adapter = Self::new(client, config);
        if adapter.config.auto_create_table() {
            adapter.ensure_table().await?;
        }
        Ok(adapter)
    }

    /// Creates an adapter from environment configuration.
    ///
    /// Uses the AWS SDK default credential chain; see [`Settings::from_env`]
    /// for the variables read.
    pub async fn from_env() -> Result<Self> {
        let settings = Settings::from_env()?;
        let client = create_client(&settings.aws).await;
        Self::initialize(client, settings.adapter_config()?).await
    }

    /// Overrides how long `ensure_table` waits for a new table.
    pub fn with_activation_policy(self, activation: ActivationPolicy) -> Self {
        Self { activation, ..self }
    }

    /// Creates the table if it doesn't exist and waits until it is active.
    pub async fn ensure_table(&self) -> Result<EnsureTableOutcome> {
        table::ensure_table(&self.client, self.config.table(), self.activation).await
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn table_name(&self) -> &str {
        self.config.table().table_name()
    }
}

#[async_trait]
impl PersistenceAdapter for DynamoDbPersistenceAdapter {
    async fn get_attributes(&self, envelope: &RequestEnvelope) -> Result<Option<AttributeMap>> {
        let partition_key = self.config.partition_key(envelope)?;
        tracing::debug!(table = %self.table_name(), %partition_key, "Getting attributes");

        let result = self
            .client
            .get_item()
            .table_name(self.table_name())
            .set_key(Some(key_for(self.config.table(), &partition_key)))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| {
                let err = map_get_item_error(e, self.table_name());
                tracing::warn!(table = %self.table_name(), error = %err, "GetItem failed");
                err
            })?;

        match result.item {
            Some(item) => item_to_attributes(self.config.table(), &item),
            None => Ok(None),
        }
    }

    async fn save_attributes(
        &self,
        envelope: &RequestEnvelope,
        attributes: &AttributeMap,
    ) -> Result<()> {
        let partition_key = self.config.partition_key(envelope)?;
        tracing::debug!(
            table = %self.table_name(),
            %partition_key,
            attributes = attributes.len(),
            "Saving attributes"
        );

        let item = attributes_to_item(self.config.table(), &partition_key, attributes);

        self.client
            .put_item()
            .table_name(self.table_name())
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| {
                let err = map_put_item_error(e, self.table_name());
                tracing::warn!(table = %self.table_name(), error = %err, "PutItem failed");
                err
            })?;

        Ok(())
    }

    async fn delete_attributes(&self, envelope: &RequestEnvelope) -> Result<()> {
        let partition_key = self.config.partition_key(envelope)?;
        tracing::debug!(table = %self.table_name(), %partition_key, "Deleting attributes");

        self.client
            .delete_item()
            .table_name(self.table_name())
            .set_key(Some(key_for(self.config.table(), &partition_key)))
            .send()
            .await
            .map_err(|e| {
                let err = map_delete_item_error(e, self.table_name());
                tracing::warn!(table = %self.table_name(), error = %err, "DeleteItem failed");
                err
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
    use aws_sdk_dynamodb::operation::delete_item::DeleteItemOutput;
    use aws_sdk_dynamodb::operation::get_item::{GetItemError, GetItemOutput};
    use aws_sdk_dynamodb::operation::put_item::PutItemOutput;
    use aws_sdk_dynamodb::types::error::ResourceNotFoundException;
    use aws_sdk_dynamodb::types::{AttributeValue, TableStatus as SdkTableStatus};
    use aws_smithy_mocks::{mock, mock_client, RuleMode};
    use serde_json::json;

    use super::*;
    use crate::storage::dynamodb::testing::{fast_policy, table_in};
    use skill_persistence_core::PersistenceError;

    const TABLE: &str = "SkillAttributes";
    const USER: &str = "amzn1.ask.account.ABC";

    fn offline_client() -> Client {
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("test", "test", None, None, "tests"))
            .endpoint_url("http://127.0.0.1:1")
            .build();
        Client::from_conf(config)
    }

    fn adapter(client: Client) -> DynamoDbPersistenceAdapter {
        DynamoDbPersistenceAdapter::new(client, AdapterConfig::new(TABLE).unwrap())
    }

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }

    fn user_key() -> HashMap<String, AttributeValue> {
        HashMap::from([("id".to_string(), s(USER))])
    }

    /// The item stored for `{"count": 3, "name": "x"}`.
    fn stored_item() -> HashMap<String, AttributeValue> {
        HashMap::from([
            ("id".to_string(), s(USER)),
            (
                "attributes".to_string(),
                AttributeValue::M(HashMap::from([
                    ("count".to_string(), AttributeValue::N("3".to_string())),
                    ("name".to_string(), s("x")),
                ])),
            ),
        ])
    }

    fn scenario_attributes() -> AttributeMap {
        match json!({"count": 3, "name": "x"}) {
            serde_json::Value::Object(map) => map,
            other => panic!("expected an object, got {}", other),
        }
    }

    #[tokio::test]
    async fn test_new_performs_no_io() {
        let config = AdapterConfig::new(TABLE)
            .unwrap()
            .with_auto_create_table(true);

        let adapter = DynamoDbPersistenceAdapter::new(offline_client(), config);

        assert_eq!(adapter.config().table().table_name(), TABLE);
        assert!(adapter.config().auto_create_table());
    }

    #[tokio::test]
    async fn test_initialize_without_auto_create_performs_no_io() {
        let config = AdapterConfig::new(TABLE).unwrap();

        let adapter = DynamoDbPersistenceAdapter::initialize(offline_client(), config)
            .await
            .unwrap();

        assert!(!adapter.config().auto_create_table());
    }

    #[tokio::test]
    async fn test_initialize_with_auto_create_checks_table() {
        let describe = mock!(Client::describe_table)
            .match_requests(|req| req.table_name() == Some(TABLE))
            .then_output(|| table_in(SdkTableStatus::Active));
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&describe]);
        let config = AdapterConfig::new(TABLE)
            .unwrap()
            .with_auto_create_table(true);

        DynamoDbPersistenceAdapter::initialize(client, config)
            .await
            .unwrap();

        assert_eq!(describe.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_missing_identity_fails_before_any_request() {
        let adapter = adapter(offline_client());
        let mut envelope = RequestEnvelope::for_user("unused");
        envelope.context.system.user = None;

        let result = adapter.get_attributes(&envelope).await;

        assert!(matches!(result, Err(PersistenceError::PartitionKey(_))));
    }

    #[tokio::test]
    async fn test_get_uses_consistent_read() {
        let get = mock!(Client::get_item)
            .match_requests(|req| {
                req.table_name() == Some(TABLE)
                    && req.consistent_read() == Some(true)
                    && req.key() == Some(&user_key())
            })
            .then_output(|| GetItemOutput::builder().set_item(Some(stored_item())).build());
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&get]);

        let loaded = adapter(client)
            .get_attributes(&RequestEnvelope::for_user(USER))
            .await
            .unwrap();

        assert_eq!(loaded, Some(scenario_attributes()));
        assert_eq!(get.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_get_without_item_returns_none() {
        let get = mock!(Client::get_item).then_output(|| GetItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&get]);

        let loaded = adapter(client)
            .get_attributes(&RequestEnvelope::for_user(USER))
            .await
            .unwrap();

        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_get_item_without_attributes_returns_none() {
        let get = mock!(Client::get_item)
            .then_output(|| GetItemOutput::builder().set_item(Some(user_key())).build());
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&get]);

        let loaded = adapter(client)
            .get_attributes(&RequestEnvelope::for_user(USER))
            .await
            .unwrap();

        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_get_missing_table() {
        let get = mock!(Client::get_item).then_error(|| {
            GetItemError::ResourceNotFoundException(
                ResourceNotFoundException::builder()
                    .message("Requested resource not found")
                    .build(),
            )
        });
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&get]);

        let result = adapter(client)
            .get_attributes(&RequestEnvelope::for_user(USER))
            .await;

        assert!(result.unwrap_err().is_table_not_found());
    }

    #[tokio::test]
    async fn test_save_puts_whole_item_unconditionally() {
        let put = mock!(Client::put_item)
            .match_requests(|req| {
                req.table_name() == Some(TABLE)
                    && req.item() == Some(&stored_item())
                    && req.condition_expression().is_none()
            })
            .then_output(|| PutItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&put]);

        adapter(client)
            .save_attributes(&RequestEnvelope::for_user(USER), &scenario_attributes())
            .await
            .unwrap();

        assert_eq!(put.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_delete_is_keyed_by_partition_key_only() {
        let get = mock!(Client::get_item).then_output(|| GetItemOutput::builder().build());
        let delete = mock!(Client::delete_item)
            .match_requests(|req| {
                req.table_name() == Some(TABLE)
                    && req.key() == Some(&user_key())
                    && req.condition_expression().is_none()
            })
            .then_output(|| DeleteItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&get, &delete]);

        adapter(client)
            .delete_attributes(&RequestEnvelope::for_user(USER))
            .await
            .unwrap();

        assert_eq!(delete.num_calls(), 1);
        assert_eq!(get.num_calls(), 0);
    }

    #[tokio::test]
    async fn test_save_get_delete_round_trip() {
        let put = mock!(Client::put_item)
            .match_requests(|req| req.item() == Some(&stored_item()))
            .then_output(|| PutItemOutput::builder().build());
        let get = mock!(Client::get_item)
            .match_requests(|req| req.key() == Some(&user_key()))
            .sequence()
            .output(|| GetItemOutput::builder().set_item(Some(stored_item())).build())
            .output(|| GetItemOutput::builder().build())
            .build();
        let delete = mock!(Client::delete_item)
            .match_requests(|req| req.key() == Some(&user_key()))
            .then_output(|| DeleteItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&put, &get, &delete]);
        let adapter = adapter(client);
        let envelope = RequestEnvelope::for_user(USER);

        adapter
            .save_attributes(&envelope, &scenario_attributes())
            .await
            .unwrap();
        let loaded = adapter.get_attributes(&envelope).await.unwrap();
        adapter.delete_attributes(&envelope).await.unwrap();
        let after_delete = adapter.get_attributes(&envelope).await.unwrap();

        assert_eq!(loaded, Some(scenario_attributes()));
        assert_eq!(after_delete, None);
        assert_eq!(put.num_calls(), 1);
        assert_eq!(get.num_calls(), 2);
        assert_eq!(delete.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_ensure_table_honours_activation_policy() {
        let describe = mock!(Client::describe_table)
            .sequence()
            .output(|| table_in(SdkTableStatus::Creating))
            .times(3)
            .build();
        let client = mock_client!(aws_sdk_dynamodb, RuleMode::MatchAny, [&describe]);
        let adapter = adapter(client).with_activation_policy(fast_policy(2));

        let result = adapter.ensure_table().await;

        assert!(matches!(
            result,
            Err(PersistenceError::TableActivationTimeout { .. })
        ));
        assert_eq!(describe.num_calls(), 3);
    }
}
