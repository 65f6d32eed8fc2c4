//! In-memory fakes of the cloud API traits, recording every call made.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use crate::aws::{AwsError, AwsResult, FunctionPolicyApi, NotificationApi};
use crate::context::InvocationContext;
use crate::params::{param_str, ApiParams};
use crate::types::{
    FilterRule, KeyFilter, LambdaFunctionConfiguration, NotificationConfiguration,
    NotificationFilter,
};

pub const FUNCTION_ARN: &str = "arn:aws:lambda:us-east-1:123456789012:function:ingest";
pub const ACCOUNT_ID: &str = "123456789012";

#[derive(Default)]
pub struct FakeNotificationApi {
    document: Mutex<NotificationConfiguration>,
    puts: Mutex<Vec<(String, NotificationConfiguration)>>,
    gets: AtomicUsize,
    get_failure: Option<String>,
    put_failure: Option<String>,
}

impl FakeNotificationApi {
    pub fn with_document(document: NotificationConfiguration) -> Self {
        Self {
            document: Mutex::new(document),
            ..Self::default()
        }
    }

    pub fn failing_get(message: &str) -> Self {
        Self {
            get_failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_put(document: NotificationConfiguration, message: &str) -> Self {
        Self {
            document: Mutex::new(document),
            put_failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn document(&self) -> NotificationConfiguration {
        self.document.lock().unwrap().clone()
    }

    pub fn puts(&self) -> Vec<(String, NotificationConfiguration)> {
        self.puts.lock().unwrap().clone()
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationApi for FakeNotificationApi {
    async fn get_notification_configuration(
        &self,
        _bucket: &str,
    ) -> AwsResult<NotificationConfiguration> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.get_failure {
            return Err(AwsError::S3Error(message.clone()));
        }
        Ok(self.document())
    }

    async fn put_notification_configuration(
        &self,
        bucket: &str,
        configuration: &NotificationConfiguration,
    ) -> AwsResult<()> {
        if let Some(message) = &self.put_failure {
            return Err(AwsError::S3Error(message.clone()));
        }
        self.puts
            .lock()
            .unwrap()
            .push((bucket.to_string(), configuration.clone()));
        *self.document.lock().unwrap() = configuration.clone();
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PolicyCall {
    Add {
        qualifier: Option<String>,
        params: ApiParams,
    },
    Remove {
        qualifier: Option<String>,
        statement_id: String,
    },
}

/// Function policy held as a list of statement ids; `None` means no policy.
#[derive(Default)]
pub struct FakeFunctionPolicyApi {
    statements: Mutex<Option<Vec<String>>>,
    raw_policy: Option<String>,
    get_failure: Option<String>,
    calls: Mutex<Vec<PolicyCall>>,
}

impl FakeFunctionPolicyApi {
    pub fn with_statements(sids: &[&str]) -> Self {
        Self {
            statements: Mutex::new(Some(sids.iter().map(|s| s.to_string()).collect())),
            ..Self::default()
        }
    }

    pub fn with_raw_policy(raw: &str) -> Self {
        Self {
            raw_policy: Some(raw.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_get(message: &str) -> Self {
        Self {
            get_failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<PolicyCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn statement_ids(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone().unwrap_or_default()
    }
}

#[async_trait]
impl FunctionPolicyApi for FakeFunctionPolicyApi {
    async fn get_policy(
        &self,
        _function: &str,
        _qualifier: Option<&str>,
    ) -> AwsResult<Option<String>> {
        if let Some(message) = &self.get_failure {
            return Err(AwsError::LambdaError(message.clone()));
        }
        if let Some(raw) = &self.raw_policy {
            return Ok(Some(raw.clone()));
        }
        Ok(self.statements.lock().unwrap().as_ref().map(|sids| {
            let statements: Vec<_> = sids
                .iter()
                .map(|sid| json!({"Sid": sid, "Effect": "Allow", "Action": "lambda:InvokeFunction"}))
                .collect();
            json!({"Version": "2012-10-17", "Id": "default", "Statement": statements}).to_string()
        }))
    }

    async fn add_permission(
        &self,
        _function: &str,
        qualifier: Option<&str>,
        params: &ApiParams,
    ) -> AwsResult<()> {
        self.calls.lock().unwrap().push(PolicyCall::Add {
            qualifier: qualifier.map(str::to_string),
            params: params.clone(),
        });
        let sid = param_str(params, "StatementId").unwrap_or_default();
        self.statements
            .lock()
            .unwrap()
            .get_or_insert_with(Vec::new)
            .push(sid);
        Ok(())
    }

    async fn remove_permission(
        &self,
        _function: &str,
        qualifier: Option<&str>,
        statement_id: &str,
    ) -> AwsResult<()> {
        self.calls.lock().unwrap().push(PolicyCall::Remove {
            qualifier: qualifier.map(str::to_string),
            statement_id: statement_id.to_string(),
        });
        let mut statements = self.statements.lock().unwrap();
        let now_empty = match statements.as_mut() {
            Some(sids) => {
                sids.retain(|sid| sid != statement_id);
                sids.is_empty()
            }
            None => false,
        };
        if now_empty {
            *statements = None;
        }
        Ok(())
    }
}

pub fn context(
    notifications: &Arc<FakeNotificationApi>,
    policies: &Arc<FakeFunctionPolicyApi>,
    dry_run: bool,
) -> InvocationContext {
    InvocationContext::new(
        notifications.clone(),
        policies.clone(),
        ACCOUNT_ID.to_string(),
        dry_run,
    )
}

/// Lambda configuration as S3 would return it.
pub fn lambda_config(
    id: &str,
    prefix: Option<&str>,
    suffix: Option<&str>,
    events: &[&str],
) -> LambdaFunctionConfiguration {
    let mut filter_rules = Vec::new();
    if let Some(prefix) = prefix {
        filter_rules.push(FilterRule::prefix(prefix));
    }
    if let Some(suffix) = suffix {
        filter_rules.push(FilterRule::suffix(suffix));
    }
    LambdaFunctionConfiguration {
        id: Some(id.to_string()),
        lambda_function_arn: FUNCTION_ARN.to_string(),
        events: events.iter().map(|e| e.to_string()).collect(),
        filter: (!filter_rules.is_empty()).then(|| NotificationFilter {
            key: Some(KeyFilter { filter_rules }),
        }),
    }
}
