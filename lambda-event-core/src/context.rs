//! Per-invocation context: API clients, caller account and execution mode.

use std::sync::Arc;

use aws_sdk_lambda::Client as LambdaClient;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_sts::Client as StsClient;
use log::{debug, warn};

use crate::aws::sts::caller_account_id;
use crate::aws::{FunctionPolicyApi, LambdaPolicyClient, NotificationApi, S3NotificationClient};
use crate::error::LambdaEventResult;

/// Overrides applied on top of the default AWS configuration chain.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub region: Option<String>,
    pub profile: Option<String>,
}

/// Everything a handler needs to talk to AWS, built once per invocation.
pub struct InvocationContext {
    pub(crate) notifications: Arc<dyn NotificationApi>,
    pub(crate) policies: Arc<dyn FunctionPolicyApi>,
    account_id: String,
    dry_run: bool,
}

impl InvocationContext {
    pub fn new(
        notifications: Arc<dyn NotificationApi>,
        policies: Arc<dyn FunctionPolicyApi>,
        account_id: String,
        dry_run: bool,
    ) -> Self {
        Self {
            notifications,
            policies,
            account_id,
            dry_run,
        }
    }

    /// Load AWS configuration and build S3, Lambda and STS clients.
    ///
    /// The caller's account id is resolved through STS; if that fails the
    /// context carries an empty account id rather than aborting.
    pub async fn bootstrap(
        options: &ConnectOptions,
        dry_run: bool,
    ) -> LambdaEventResult<Self> {
        // Load AWS configuration using the standard credential provider chain.
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &options.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        if let Some(profile) = &options.profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;
        debug!("Using AWS region {:?}", config.region());

        let account_id = match caller_account_id(&StsClient::new(&config)).await {
            Ok(account_id) => account_id,
            Err(e) => {
                warn!("Unable to resolve caller account id, continuing without it: {e}");
                String::new()
            }
        };

        Ok(Self::new(
            Arc::new(S3NotificationClient::new(S3Client::new(&config))),
            Arc::new(LambdaPolicyClient::new(LambdaClient::new(&config))),
            account_id,
            dry_run,
        ))
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}
