//! Data model for bucket notification documents, invoke-permission statements
//! and reconciliation requests/results.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::params::ApiParams;

/// Desired state of an event-source wiring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Present,
    Absent,
}

impl FromStr for State {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "present" => Ok(Self::Present),
            "absent" => Ok(Self::Absent),
            other => Err(format!(
                "invalid state '{other}', expected one of: present, absent"
            )),
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => f.write_str("present"),
            Self::Absent => f.write_str("absent"),
        }
    }
}

/// Kind of service that triggers the function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventSource {
    S3,
    Kinesis,
    DynamoDb,
    Sns,
}

impl FromStr for EventSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "kinesis" => Ok(Self::Kinesis),
            "dynamodb" => Ok(Self::DynamoDb),
            "sns" => Ok(Self::Sns),
            other => Err(format!(
                "invalid event source '{other}', expected one of: s3, Kinesis, DynamoDB, SNS"
            )),
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::S3 => "s3",
            Self::Kinesis => "Kinesis",
            Self::DynamoDb => "DynamoDB",
            Self::Sns => "SNS",
        };
        f.write_str(name)
    }
}

/// Bucket-wide notification document, as read from and written to S3.
///
/// Writes replace the whole document, so the non-Lambda kinds are carried
/// along unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationConfiguration {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topic_configurations: Vec<TopicConfiguration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub queue_configurations: Vec<QueueConfiguration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lambda_function_configurations: Vec<LambdaFunctionConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_bridge_configuration: Option<EventBridgeConfiguration>,
}

/// One event-source entry invoking a Lambda function. Identity is `id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LambdaFunctionConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub lambda_function_arn: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<NotificationFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub topic_arn: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<NotificationFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueueConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub queue_arn: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<NotificationFilter>,
}

/// Marker that EventBridge delivery is enabled on the bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventBridgeConfiguration {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyFilter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyFilter {
    #[serde(default)]
    pub filter_rules: Vec<FilterRule>,
}

/// Object-key filter rule; `name` is "Prefix" or "Suffix".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilterRule {
    pub name: String,
    pub value: String,
}

impl FilterRule {
    pub fn prefix(value: impl Into<String>) -> Self {
        Self {
            name: "Prefix".to_string(),
            value: value.into(),
        }
    }

    pub fn suffix(value: impl Into<String>) -> Self {
        Self {
            name: "Suffix".to_string(),
            value: value.into(),
        }
    }
}

/// Sub-parameters describing the event source, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceParams {
    pub id: Option<String>,
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub events: Vec<String>,
}

/// Invoke-permission statement on a function's resource policy.
///
/// Only `statement_id` is needed for removal; grants carry the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub statement_id: String,
    pub action: Option<String>,
    pub principal: Option<String>,
    pub source_arn: Option<String>,
    pub source_account: Option<String>,
}

impl PolicyStatement {
    pub fn with_id(statement_id: impl Into<String>) -> Self {
        Self {
            statement_id: statement_id.into(),
            ..Self::default()
        }
    }

    /// Grant allowing S3 to invoke the function for events on `bucket`.
    pub fn s3_invoke(statement_id: &str, bucket: &str, source_account: &str) -> Self {
        Self {
            statement_id: statement_id.to_string(),
            action: Some("lambda:InvokeFunction".to_string()),
            principal: Some("s3.amazonaws.com".to_string()),
            source_arn: Some(format!("arn:aws:s3:::{bucket}")),
            source_account: Some(source_account.to_string()),
        }
    }

    /// AddPermission payload; empty fields are dropped by the mapper.
    pub fn to_api_params(&self) -> ApiParams {
        let mut fields = Map::new();
        fields.insert(
            "statement_id".to_string(),
            Value::from(self.statement_id.clone()),
        );
        fields.insert("action".to_string(), Value::from(self.action.clone()));
        fields.insert("principal".to_string(), Value::from(self.principal.clone()));
        fields.insert(
            "source_arn".to_string(),
            Value::from(self.source_arn.clone()),
        );
        fields.insert(
            "source_account".to_string(),
            Value::from(self.source_account.clone()),
        );
        crate::params::to_api_params(&fields)
    }
}

/// One reconciliation call: desired state plus the source it applies to.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileRequest {
    pub state: State,
    pub event_source: EventSource,
    pub function_arn: String,
    /// Version number or alias addressing a specific function revision.
    pub qualifier: Option<String>,
    pub source_params: SourceParams,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFacts {
    pub lambda_s3_events: Vec<LambdaFunctionConfiguration>,
}

/// Result of a reconciliation: whether anything changed and the Lambda
/// configurations left on the bucket afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconcileOutcome {
    pub changed: bool,
    pub facts: EventFacts,
}
