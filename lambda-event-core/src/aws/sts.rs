use aws_sdk_sts::error::DisplayErrorContext;
use aws_sdk_sts::Client as StsClient;

use crate::aws::{AwsError, AwsResult};

/// Account id of the credentials in use, via GetCallerIdentity.
pub(crate) async fn caller_account_id(client: &StsClient) -> AwsResult<String> {
    let identity = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| AwsError::StsError(DisplayErrorContext(&e).to_string()))?;

    identity
        .account()
        .map(str::to_string)
        .ok_or_else(|| AwsError::StsError("caller identity has no account id".to_string()))
}
