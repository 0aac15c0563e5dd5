//! DynamoDB error mapping.
//!
//! Maps AWS SDK errors to `PersistenceError` from `skill_persistence_core`.

use std::fmt::Debug;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::create_table::CreateTableError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use skill_persistence_core::PersistenceError;

/// Map a GetItem SDK error to PersistenceError.
pub fn map_get_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<GetItemError, R>,
    table_name: &str,
) -> PersistenceError {
    const FAILED: &str = "Failed to retrieve attributes from DynamoDB";

    match err.into_service_error() {
        GetItemError::ResourceNotFoundException(e) => {
            PersistenceError::table_not_found(table_name, e)
        }
        GetItemError::ProvisionedThroughputExceededException(e) => {
            PersistenceError::backend(format!("{}: throughput exceeded", FAILED), e)
        }
        GetItemError::RequestLimitExceeded(e) => {
            PersistenceError::backend(format!("{}: request limit exceeded", FAILED), e)
        }
        GetItemError::InternalServerError(e) => {
            PersistenceError::backend(format!("{}: internal server error", FAILED), e)
        }
        err => PersistenceError::backend(FAILED, err),
    }
}

/// Map a PutItem SDK error to PersistenceError.
pub fn map_put_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<PutItemError, R>,
    table_name: &str,
) -> PersistenceError {
    const FAILED: &str = "Failed to save attributes to DynamoDB";

    match err.into_service_error() {
        PutItemError::ResourceNotFoundException(e) => {
            PersistenceError::table_not_found(table_name, e)
        }
        PutItemError::ProvisionedThroughputExceededException(e) => {
            PersistenceError::backend(format!("{}: throughput exceeded", FAILED), e)
        }
        PutItemError::RequestLimitExceeded(e) => {
            PersistenceError::backend(format!("{}: request limit exceeded", FAILED), e)
        }
        PutItemError::ItemCollectionSizeLimitExceededException(e) => PersistenceError::backend(
            format!("{}: item collection size limit exceeded", FAILED),
            e,
        ),
        PutItemError::TransactionConflictException(e) => {
            PersistenceError::backend(format!("{}: transaction conflict", FAILED), e)
        }
        PutItemError::InternalServerError(e) => {
            PersistenceError::backend(format!("{}: internal server error", FAILED), e)
        }
        err => PersistenceError::backend(FAILED, err),
    }
}

/// Map a DeleteItem SDK error to PersistenceError.
pub fn map_delete_item_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DeleteItemError, R>,
    table_name: &str,
) -> PersistenceError {
    const FAILED: &str = "Failed to delete attributes from DynamoDB";

    match err.into_service_error() {
        DeleteItemError::ResourceNotFoundException(e) => {
            PersistenceError::table_not_found(table_name, e)
        }
        DeleteItemError::ProvisionedThroughputExceededException(e) => {
            PersistenceError::backend(format!("{}: throughput exceeded", FAILED), e)
        }
        DeleteItemError::RequestLimitExceeded(e) => {
            PersistenceError::backend(format!("{}: request limit exceeded", FAILED), e)
        }
        DeleteItemError::TransactionConflictException(e) => {
            PersistenceError::backend(format!("{}: transaction conflict", FAILED), e)
        }
        DeleteItemError::InternalServerError(e) => {
            PersistenceError::backend(format!("{}: internal server error", FAILED), e)
        }
        err => PersistenceError::backend(FAILED, err),
    }
}

/// Outcome of a failed DescribeTable call.
#[derive(Debug)]
pub enum DescribeTableFailure {
    /// The table does not exist.
    NotFound,
    Failed(PersistenceError),
}

/// Map a DescribeTable SDK error, separating a missing table from real failures.
pub fn map_describe_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<DescribeTableError, R>,
) -> DescribeTableFailure {
    match err.into_service_error() {
        DescribeTableError::ResourceNotFoundException(_) => DescribeTableFailure::NotFound,
        err => DescribeTableFailure::Failed(PersistenceError::backend(
            "Failed to describe DynamoDB table",
            err,
        )),
    }
}

/// Outcome of a failed CreateTable call.
#[derive(Debug)]
pub enum CreateTableFailure {
    /// Someone else created the table first.
    AlreadyExists,
    Failed(PersistenceError),
}

/// Map a CreateTable SDK error, separating "already exists" from real failures.
pub fn map_create_table_error<R: Debug + Send + Sync + 'static>(
    err: SdkError<CreateTableError, R>,
    table_name: &str,
) -> CreateTableFailure {
    match err.into_service_error() {
        CreateTableError::ResourceInUseException(_) => CreateTableFailure::AlreadyExists,
        err => CreateTableFailure::Failed(PersistenceError::table_creation(table_name, err)),
    }
}
