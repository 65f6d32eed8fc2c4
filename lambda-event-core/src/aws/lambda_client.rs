//! AWS Lambda client wrapper for resource-policy operations

use async_trait::async_trait;
use aws_sdk_lambda::error::{DisplayErrorContext, SdkError};
use aws_sdk_lambda::operation::get_policy::GetPolicyError;
use aws_sdk_lambda::Client as LambdaClient;
use log::debug;

use crate::aws::{AwsError, AwsResult, FunctionPolicyApi};
use crate::params::{param_str, ApiParams};

pub struct LambdaPolicyClient {
    client: LambdaClient,
}

impl LambdaPolicyClient {
    pub fn new(client: LambdaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FunctionPolicyApi for LambdaPolicyClient {
    async fn get_policy(
        &self,
        function: &str,
        qualifier: Option<&str>,
    ) -> AwsResult<Option<String>> {
        let result = self
            .client
            .get_policy()
            .function_name(function)
            .set_qualifier(qualifier.map(str::to_string))
            .send()
            .await;

        match result {
            Ok(output) => Ok(Some(output.policy().unwrap_or("{}").to_string())),
            Err(err) if policy_doesnt_exist_error(&err) => {
                debug!("No resource policy attached to {function}");
                Ok(None)
            }
            Err(err) => Err(AwsError::LambdaError(
                DisplayErrorContext(&err).to_string(),
            )),
        }
    }

    async fn add_permission(
        &self,
        function: &str,
        qualifier: Option<&str>,
        params: &ApiParams,
    ) -> AwsResult<()> {
        self.client
            .add_permission()
            .function_name(function)
            .set_qualifier(qualifier.map(str::to_string))
            .set_statement_id(param_str(params, "StatementId"))
            .set_action(param_str(params, "Action"))
            .set_principal(param_str(params, "Principal"))
            .set_source_arn(param_str(params, "SourceArn"))
            .set_source_account(param_str(params, "SourceAccount"))
            .set_event_source_token(param_str(params, "EventSourceToken"))
            .send()
            .await
            .map_err(|e| AwsError::LambdaError(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn remove_permission(
        &self,
        function: &str,
        qualifier: Option<&str>,
        statement_id: &str,
    ) -> AwsResult<()> {
        self.client
            .remove_permission()
            .function_name(function)
            .set_qualifier(qualifier.map(str::to_string))
            .statement_id(statement_id)
            .send()
            .await
            .map_err(|e| AwsError::LambdaError(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

fn policy_doesnt_exist_error(err: &SdkError<GetPolicyError>) -> bool {
    match err {
        SdkError::ServiceError(e) => e.err().is_resource_not_found_exception(),
        _ => false,
    }
}
