//! S3 bucket notification reconciliation for Lambda event sources

use async_trait::async_trait;
use log::{debug, info};

use super::EventSourceHandler;
use crate::comparator::same_configuration;
use crate::context::InvocationContext;
use crate::error::{LambdaEventError, LambdaEventResult};
use crate::policy::PolicyManager;
use crate::types::{
    EventFacts, FilterRule, KeyFilter, LambdaFunctionConfiguration, NotificationConfiguration,
    NotificationFilter, PolicyStatement, ReconcileOutcome, ReconcileRequest, SourceParams, State,
};

/// Validated S3 source parameters.
struct S3Source<'a> {
    id: &'a str,
    bucket: &'a str,
    prefix: Option<&'a str>,
    suffix: Option<&'a str>,
    events: &'a [String],
}

impl<'a> S3Source<'a> {
    fn from_params(params: &'a SourceParams) -> LambdaEventResult<Self> {
        let id = required(params.id.as_deref()).ok_or_else(|| {
            LambdaEventError::validation(
                "Source parameter 'id' is required for S3 event notification.",
            )
        })?;
        let bucket = required(params.bucket.as_deref()).ok_or_else(|| {
            LambdaEventError::validation(
                "Source parameter 'bucket' is required for S3 event notification.",
            )
        })?;

        Ok(Self {
            id,
            bucket,
            prefix: required(params.prefix.as_deref()),
            suffix: required(params.suffix.as_deref()),
            events: &params.events,
        })
    }

    /// Configuration entry this source should have on the bucket. Filter
    /// rules exist only for the prefix/suffix actually supplied.
    fn desired_configuration(&self, function_arn: &str) -> LambdaFunctionConfiguration {
        let mut filter_rules = Vec::new();
        if let Some(prefix) = self.prefix {
            filter_rules.push(FilterRule::prefix(prefix));
        }
        if let Some(suffix) = self.suffix {
            filter_rules.push(FilterRule::suffix(suffix));
        }

        LambdaFunctionConfiguration {
            id: Some(self.id.to_string()),
            lambda_function_arn: function_arn.to_string(),
            events: self.events.to_vec(),
            filter: (!filter_rules.is_empty()).then(|| NotificationFilter {
                key: Some(KeyFilter { filter_rules }),
            }),
        }
    }
}

fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Adds, updates or removes one Lambda entry in a bucket's notification
/// configuration, keeping the matching invoke permission in step.
///
/// The whole document is read, edited and written back, so concurrent callers
/// targeting the same bucket must be serialized by the caller.
pub struct S3NotificationHandler;

#[async_trait]
impl EventSourceHandler for S3NotificationHandler {
    fn validate(&self, request: &ReconcileRequest) -> LambdaEventResult<()> {
        S3Source::from_params(&request.source_params).map(|_| ())
    }

    async fn reconcile(
        &self,
        ctx: &InvocationContext,
        request: &ReconcileRequest,
    ) -> LambdaEventResult<ReconcileOutcome> {
        let source = S3Source::from_params(&request.source_params)?;

        let mut document = ctx
            .notifications
            .get_notification_configuration(source.bucket)
            .await
            .map_err(LambdaEventError::aws(
                "Error retrieving s3 event notification configuration",
            ))?;

        let mut working = std::mem::take(&mut document.lambda_function_configurations);
        let matching = working
            .iter()
            .position(|config| config.id.as_deref() == Some(source.id))
            .map(|index| working.remove(index));
        debug!(
            "Event source {} is currently {} on bucket {}",
            source.id,
            if matching.is_some() { "present" } else { "absent" },
            source.bucket
        );

        let policies = PolicyManager::new(
            ctx.policies.as_ref(),
            &request.function_arn,
            request.qualifier.as_deref(),
            ctx.dry_run(),
        );

        let changed = match (request.state, matching) {
            (State::Present, Some(existing)) => {
                let desired = source.desired_configuration(&request.function_arn);
                if same_configuration(&existing, &desired) {
                    debug!("Event source {} is up to date", source.id);
                    working.push(existing);
                    document.lambda_function_configurations = working;
                    false
                } else {
                    working.push(desired);
                    document.lambda_function_configurations = working;
                    write_document(
                        ctx,
                        source.bucket,
                        &document,
                        "Error updating s3 event notification for lambda",
                    )
                    .await?;
                    true
                }
            }
            (State::Present, None) => {
                // S3 validates the destination on write, so the grant goes first.
                let statement =
                    PolicyStatement::s3_invoke(source.id, source.bucket, ctx.account_id());
                policies.reconcile_statement(&statement, true).await?;

                working.push(source.desired_configuration(&request.function_arn));
                document.lambda_function_configurations = working;
                write_document(
                    ctx,
                    source.bucket,
                    &document,
                    "Error creating s3 event notification for lambda",
                )
                .await?;
                true
            }
            (State::Absent, Some(_)) => {
                document.lambda_function_configurations = working;
                write_document(
                    ctx,
                    source.bucket,
                    &document,
                    "Error removing s3 source event configuration",
                )
                .await?;
                policies
                    .reconcile_statement(&PolicyStatement::with_id(source.id), false)
                    .await?;
                true
            }
            (State::Absent, None) => {
                document.lambda_function_configurations = working;
                false
            }
        };

        Ok(ReconcileOutcome {
            changed,
            facts: EventFacts {
                lambda_s3_events: document.lambda_function_configurations,
            },
        })
    }
}

async fn write_document(
    ctx: &InvocationContext,
    bucket: &str,
    document: &NotificationConfiguration,
    context: &'static str,
) -> LambdaEventResult<()> {
    let count = document.lambda_function_configurations.len();
    if ctx.dry_run() {
        info!("[dry-run] would write notification configuration for {bucket} with {count} Lambda configuration(s)");
        return Ok(());
    }

    info!("Writing notification configuration for {bucket} with {count} Lambda configuration(s)");
    ctx.notifications
        .put_notification_configuration(bucket, document)
        .await
        .map_err(LambdaEventError::aws(context))
}
