//! Crate-level error type returned by every reconciliation entry point.

use crate::aws::AwsError;
use crate::types::EventSource;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LambdaEventError {
    /// Input rejected before any AWS call was attempted.
    #[error("{0}")]
    Validation(String),

    #[error("Event source '{0}' is not supported; only s3 event notifications are implemented")]
    UnsupportedEventSource(EventSource),

    /// A cloud API call failed. `context` names the step that was being performed.
    #[error("{context}: {source}")]
    Aws {
        context: &'static str,
        #[source]
        source: AwsError,
    },
}

impl LambdaEventError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn aws(context: &'static str) -> impl FnOnce(AwsError) -> Self {
        move |source| Self::Aws { context, source }
    }

    /// True for failures raised before any AWS call was attempted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::UnsupportedEventSource(_)
        )
    }
}

pub type LambdaEventResult<T> = Result<T, LambdaEventError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aws_error_keeps_underlying_message() {
        let err = LambdaEventError::aws("Error retrieving function policy")(AwsError::LambdaError(
            "AccessDeniedException: not allowed".to_string(),
        ));
        let msg = err.to_string();
        assert!(msg.starts_with("Error retrieving function policy: "));
        assert!(msg.contains("AccessDeniedException: not allowed"));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_validation_classification() {
        assert!(LambdaEventError::validation("missing id").is_validation());
        assert!(LambdaEventError::UnsupportedEventSource(EventSource::Sns).is_validation());
    }
}
