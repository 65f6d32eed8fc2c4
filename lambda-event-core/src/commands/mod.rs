//! Commands module - event-source handlers and the service layer that
//! dispatches to them

mod s3;
pub(crate) mod service;

use async_trait::async_trait;

use crate::context::InvocationContext;
use crate::error::{LambdaEventError, LambdaEventResult};
use crate::types::{EventSource, ReconcileOutcome, ReconcileRequest};

pub use s3::S3NotificationHandler;
pub use service::LambdaEventService;

/// Converges one kind of event source to the requested state.
#[async_trait]
pub trait EventSourceHandler: Send + Sync {
    /// Reject requests this handler cannot act on, without calling AWS.
    fn validate(&self, request: &ReconcileRequest) -> LambdaEventResult<()>;

    async fn reconcile(
        &self,
        ctx: &InvocationContext,
        request: &ReconcileRequest,
    ) -> LambdaEventResult<ReconcileOutcome>;
}

static HANDLERS: &[(EventSource, &dyn EventSourceHandler)] =
    &[(EventSource::S3, &S3NotificationHandler)];

pub fn handler_for(source: EventSource) -> LambdaEventResult<&'static dyn EventSourceHandler> {
    HANDLERS
        .iter()
        .find(|(kind, _)| *kind == source)
        .map(|(_, handler)| *handler)
        .ok_or(LambdaEventError::UnsupportedEventSource(source))
}

/// Validate a request and resolve its handler. Nothing here touches AWS, so
/// callers can run it before building any client.
pub fn preflight(request: &ReconcileRequest) -> LambdaEventResult<&'static dyn EventSourceHandler> {
    if request.function_arn.trim().is_empty() {
        return Err(LambdaEventError::validation(
            "Error: exactly one target service ARN is required.",
        ));
    }
    let handler = handler_for(request.event_source)?;
    handler.validate(request)?;
    Ok(handler)
}
