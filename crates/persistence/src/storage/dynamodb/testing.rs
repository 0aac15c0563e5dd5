//! Shared fixtures for tests that drive a mocked DynamoDB client.

use std::time::Duration;

use aws_sdk_dynamodb::operation::describe_table::{DescribeTableError, DescribeTableOutput};
use aws_sdk_dynamodb::types::error::ResourceNotFoundException;
use aws_sdk_dynamodb::types::{TableDescription, TableStatus as SdkTableStatus};

use super::table::ActivationPolicy;

/// Polls a few times without sleeping.
pub fn fast_policy(max_attempts: u32) -> ActivationPolicy {
    ActivationPolicy {
        max_attempts,
        poll_interval: Duration::ZERO,
    }
}

pub fn table_missing() -> DescribeTableError {
    DescribeTableError::ResourceNotFoundException(
        ResourceNotFoundException::builder()
            .message("Requested resource not found")
            .build(),
    )
}

pub fn table_in(status: SdkTableStatus) -> DescribeTableOutput {
    DescribeTableOutput::builder()
        .table(TableDescription::builder().table_status(status).build())
        .build()
}
