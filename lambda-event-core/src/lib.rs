//! This crate provides the core logic for wiring AWS event sources to Lambda
//! functions:
//! - S3 bucket notification reconciliation (add, update, remove by id)
//! - Invoke-permission statements kept in step with the notifications
//! - Order-independent comparison of configuration documents
//!

mod aws;
pub mod commands;
mod comparator;
mod context;
mod error;
mod params;
mod policy;
mod types;

#[cfg(test)]
pub mod test_utils;

// Re-exports for a small, focused public API
pub use aws::{
    AwsError, AwsResult, FunctionPolicyApi, LambdaPolicyClient, NotificationApi,
    S3NotificationClient,
};
pub use commands::{handler_for, preflight, EventSourceHandler, LambdaEventService};
pub use comparator::{canonicalize, equivalent, same_configuration, Canonical};
pub use context::{ConnectOptions, InvocationContext};
pub use error::{LambdaEventError, LambdaEventResult};
pub use params::{pascal_case, to_api_params, ApiParams};
pub use policy::{resolve_qualifier, PolicyManager};
pub use types::{
    EventBridgeConfiguration, EventFacts, EventSource, FilterRule, KeyFilter,
    LambdaFunctionConfiguration, NotificationConfiguration, NotificationFilter, PolicyStatement,
    QueueConfiguration, ReconcileOutcome, ReconcileRequest, SourceParams, State,
    TopicConfiguration,
};
