//! Lambda Event Service Layer
//!
//! This module provides the main service interface that encapsulates the
//! reconciliation logic. The service holds the per-invocation context and
//! dispatches each request to the handler registered for its event source.

use log::info;

use crate::context::{ConnectOptions, InvocationContext};
use crate::error::LambdaEventResult;
use crate::types::{ReconcileOutcome, ReconcileRequest};

/// Main service struct that holds AWS clients and runs reconciliations
pub struct LambdaEventService {
    context: InvocationContext,
}

impl LambdaEventService {
    /// Create a new service instance with AWS clients
    ///
    /// The configuration is loaded using the default credential provider chain,
    /// with the region and profile overrides from `options` applied.
    pub async fn new(options: &ConnectOptions, dry_run: bool) -> LambdaEventResult<Self> {
        Ok(Self::with_context(
            InvocationContext::bootstrap(options, dry_run).await?,
        ))
    }

    pub fn with_context(context: InvocationContext) -> Self {
        Self { context }
    }

    /// Converge the requested event source to its desired state.
    pub async fn reconcile(&self, request: &ReconcileRequest) -> LambdaEventResult<ReconcileOutcome> {
        let handler = super::preflight(request)?;
        info!(
            "Reconciling {} event source for {} to state {}{}",
            request.event_source,
            request.function_arn,
            request.state,
            if self.context.dry_run() { " (dry-run)" } else { "" }
        );
        let outcome = handler.reconcile(&self.context, request).await?;
        info!("Reconciliation finished, changed={}", outcome.changed);
        Ok(outcome)
    }
}
