//! AWS SDK integration: S3 notification and Lambda policy adapters, caller
//! identity lookup.
//!
//! The reconciler only sees the two traits below, so tests can run it against
//! in-memory fakes.

pub(crate) mod lambda_client;
pub(crate) mod s3_client;
pub(crate) mod sts;

use async_trait::async_trait;
use thiserror::Error;

use crate::params::ApiParams;
use crate::types::NotificationConfiguration;

pub use lambda_client::LambdaPolicyClient;
pub use s3_client::S3NotificationClient;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("S3 client error: {0}")]
    S3Error(String),
    #[error("Lambda client error: {0}")]
    LambdaError(String),
    #[error("STS client error: {0}")]
    StsError(String),
    #[error("Policy document error: {0}")]
    PolicyError(String),
    #[error("AWS SDK error: {0}")]
    SdkError(String),
}

pub type AwsResult<T> = Result<T, AwsError>;

/// Read and whole-document write of a bucket's notification configuration.
#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn get_notification_configuration(
        &self,
        bucket: &str,
    ) -> AwsResult<NotificationConfiguration>;

    async fn put_notification_configuration(
        &self,
        bucket: &str,
        configuration: &NotificationConfiguration,
    ) -> AwsResult<()>;
}

/// Resource-policy operations on a Lambda function.
#[async_trait]
pub trait FunctionPolicyApi: Send + Sync {
    /// Raw policy JSON, or `None` when the function has no policy yet.
    async fn get_policy(&self, function: &str, qualifier: Option<&str>)
        -> AwsResult<Option<String>>;

    async fn add_permission(
        &self,
        function: &str,
        qualifier: Option<&str>,
        params: &ApiParams,
    ) -> AwsResult<()>;

    async fn remove_permission(
        &self,
        function: &str,
        qualifier: Option<&str>,
        statement_id: &str,
    ) -> AwsResult<()>;
}
