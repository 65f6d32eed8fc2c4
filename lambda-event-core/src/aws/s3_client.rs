//! AWS S3 client wrapper for bucket notification configuration

use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types as s3;
use aws_sdk_s3::Client as S3Client;
use log::debug;

use crate::aws::{AwsError, AwsResult, NotificationApi};
use crate::types::{
    EventBridgeConfiguration, FilterRule, KeyFilter, LambdaFunctionConfiguration,
    NotificationConfiguration, NotificationFilter, QueueConfiguration, TopicConfiguration,
};

pub struct S3NotificationClient {
    client: S3Client,
}

impl S3NotificationClient {
    pub fn new(client: S3Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NotificationApi for S3NotificationClient {
    async fn get_notification_configuration(
        &self,
        bucket: &str,
    ) -> AwsResult<NotificationConfiguration> {
        let output = self
            .client
            .get_bucket_notification_configuration()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| AwsError::S3Error(DisplayErrorContext(&e).to_string()))?;

        let configuration = NotificationConfiguration {
            topic_configurations: output
                .topic_configurations()
                .iter()
                .map(topic_from_sdk)
                .collect(),
            queue_configurations: output
                .queue_configurations()
                .iter()
                .map(queue_from_sdk)
                .collect(),
            lambda_function_configurations: output
                .lambda_function_configurations()
                .iter()
                .map(lambda_from_sdk)
                .collect(),
            event_bridge_configuration: output
                .event_bridge_configuration()
                .map(|_| EventBridgeConfiguration {}),
        };
        debug!(
            "Bucket {bucket} has {} Lambda notification configuration(s)",
            configuration.lambda_function_configurations.len()
        );
        Ok(configuration)
    }

    async fn put_notification_configuration(
        &self,
        bucket: &str,
        configuration: &NotificationConfiguration,
    ) -> AwsResult<()> {
        let document = to_sdk(configuration)?;
        self.client
            .put_bucket_notification_configuration()
            .bucket(bucket)
            .notification_configuration(document)
            .send()
            .await
            .map_err(|e| AwsError::S3Error(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

fn to_sdk(configuration: &NotificationConfiguration) -> AwsResult<s3::NotificationConfiguration> {
    let topics = configuration
        .topic_configurations
        .iter()
        .map(topic_to_sdk)
        .collect::<AwsResult<Vec<_>>>()?;
    let queues = configuration
        .queue_configurations
        .iter()
        .map(queue_to_sdk)
        .collect::<AwsResult<Vec<_>>>()?;
    let lambdas = configuration
        .lambda_function_configurations
        .iter()
        .map(lambda_to_sdk)
        .collect::<AwsResult<Vec<_>>>()?;

    Ok(s3::NotificationConfiguration::builder()
        .set_topic_configurations(non_empty(topics))
        .set_queue_configurations(non_empty(queues))
        .set_lambda_function_configurations(non_empty(lambdas))
        .set_event_bridge_configuration(
            configuration
                .event_bridge_configuration
                .as_ref()
                .map(|_| s3::EventBridgeConfiguration::builder().build()),
        )
        .build())
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn lambda_from_sdk(config: &s3::LambdaFunctionConfiguration) -> LambdaFunctionConfiguration {
    LambdaFunctionConfiguration {
        id: config.id().map(str::to_string),
        lambda_function_arn: config.lambda_function_arn().to_string(),
        events: events_from_sdk(config.events()),
        filter: filter_from_sdk(config.filter()),
    }
}

fn lambda_to_sdk(config: &LambdaFunctionConfiguration) -> AwsResult<s3::LambdaFunctionConfiguration> {
    s3::LambdaFunctionConfiguration::builder()
        .set_id(config.id.clone())
        .lambda_function_arn(&config.lambda_function_arn)
        .set_events(Some(events_to_sdk(&config.events)))
        .set_filter(filter_to_sdk(config.filter.as_ref()))
        .build()
        .map_err(|e| AwsError::SdkError(format!("Invalid Lambda function configuration: {e}")))
}

fn topic_from_sdk(config: &s3::TopicConfiguration) -> TopicConfiguration {
    TopicConfiguration {
        id: config.id().map(str::to_string),
        topic_arn: config.topic_arn().to_string(),
        events: events_from_sdk(config.events()),
        filter: filter_from_sdk(config.filter()),
    }
}

fn topic_to_sdk(config: &TopicConfiguration) -> AwsResult<s3::TopicConfiguration> {
    s3::TopicConfiguration::builder()
        .set_id(config.id.clone())
        .topic_arn(&config.topic_arn)
        .set_events(Some(events_to_sdk(&config.events)))
        .set_filter(filter_to_sdk(config.filter.as_ref()))
        .build()
        .map_err(|e| AwsError::SdkError(format!("Invalid topic configuration: {e}")))
}

fn queue_from_sdk(config: &s3::QueueConfiguration) -> QueueConfiguration {
    QueueConfiguration {
        id: config.id().map(str::to_string),
        queue_arn: config.queue_arn().to_string(),
        events: events_from_sdk(config.events()),
        filter: filter_from_sdk(config.filter()),
    }
}

fn queue_to_sdk(config: &QueueConfiguration) -> AwsResult<s3::QueueConfiguration> {
    s3::QueueConfiguration::builder()
        .set_id(config.id.clone())
        .queue_arn(&config.queue_arn)
        .set_events(Some(events_to_sdk(&config.events)))
        .set_filter(filter_to_sdk(config.filter.as_ref()))
        .build()
        .map_err(|e| AwsError::SdkError(format!("Invalid queue configuration: {e}")))
}

fn events_from_sdk(events: &[s3::Event]) -> Vec<String> {
    events.iter().map(|e| e.as_str().to_string()).collect()
}

fn events_to_sdk(events: &[String]) -> Vec<s3::Event> {
    events.iter().map(|e| s3::Event::from(e.as_str())).collect()
}

fn filter_from_sdk(filter: Option<&s3::NotificationConfigurationFilter>) -> Option<NotificationFilter> {
    filter.map(|f| NotificationFilter {
        key: f.key().map(|key| KeyFilter {
            filter_rules: key
                .filter_rules()
                .iter()
                .map(|rule| FilterRule {
                    name: rule.name().map(|n| n.as_str().to_string()).unwrap_or_default(),
                    value: rule.value().unwrap_or_default().to_string(),
                })
                .collect(),
        }),
    })
}

// FilterRuleName::from keeps unrecognised spellings such as "Prefix" verbatim.
fn filter_to_sdk(filter: Option<&NotificationFilter>) -> Option<s3::NotificationConfigurationFilter> {
    filter.map(|f| {
        s3::NotificationConfigurationFilter::builder()
            .set_key(f.key.as_ref().map(|key| {
                s3::S3KeyFilter::builder()
                    .set_filter_rules(Some(
                        key.filter_rules
                            .iter()
                            .map(|rule| {
                                s3::FilterRule::builder()
                                    .name(s3::FilterRuleName::from(rule.name.as_str()))
                                    .value(&rule.value)
                                    .build()
                            })
                            .collect(),
                    ))
                    .build()
            }))
            .build()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NotificationConfiguration {
        NotificationConfiguration {
            topic_configurations: vec![TopicConfiguration {
                id: Some("alerts".into()),
                topic_arn: "arn:aws:sns:us-east-1:123456789012:alerts".into(),
                events: vec!["s3:ObjectRemoved:*".into()],
                filter: None,
            }],
            queue_configurations: vec![],
            lambda_function_configurations: vec![LambdaFunctionConfiguration {
                id: Some("evt1".into()),
                lambda_function_arn: "arn:aws:lambda:us-east-1:123456789012:function:ingest"
                    .into(),
                events: vec!["s3:ObjectCreated:Put".into()],
                filter: Some(NotificationFilter {
                    key: Some(KeyFilter {
                        filter_rules: vec![FilterRule::prefix("twitter"), FilterRule::suffix("log")],
                    }),
                }),
            }],
            event_bridge_configuration: Some(EventBridgeConfiguration {}),
        }
    }

    #[test]
    fn test_document_survives_sdk_conversion() {
        let document = to_sdk(&sample()).expect("should convert");

        assert_eq!(document.topic_configurations().len(), 1);
        assert!(document.queue_configurations().is_empty());
        assert!(document.event_bridge_configuration().is_some());

        let lambda = lambda_from_sdk(&document.lambda_function_configurations()[0]);
        assert_eq!(lambda, sample().lambda_function_configurations[0]);
    }

    #[test]
    fn test_empty_document_sets_no_lists() {
        let document = to_sdk(&NotificationConfiguration::default()).expect("should convert");
        assert!(document.lambda_function_configurations.is_none());
        assert!(document.topic_configurations.is_none());
        assert!(document.queue_configurations.is_none());
    }
}
