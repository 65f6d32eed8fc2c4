//! Invoke-permission statements on a function's resource policy.

use log::{debug, info};
use serde::Deserialize;

use crate::aws::{AwsError, FunctionPolicyApi};
use crate::error::{LambdaEventError, LambdaEventResult};
use crate::types::PolicyStatement;

/// Qualifier addressing a function revision: a positive version wins over an
/// alias; neither means the unqualified function.
pub fn resolve_qualifier(version: Option<i64>, alias: Option<&str>) -> Option<String> {
    match (version, alias) {
        (Some(version), _) if version > 0 => Some(version.to_string()),
        (_, Some(alias)) if !alias.is_empty() => Some(alias.to_string()),
        _ => None,
    }
}

#[derive(Debug, Default, Deserialize)]
struct FunctionPolicy {
    #[serde(rename = "Statement", default)]
    statement: Vec<PolicyGrant>,
}

#[derive(Debug, Deserialize)]
struct PolicyGrant {
    #[serde(rename = "Sid", default)]
    sid: Option<String>,
}

/// Adds and removes statements on one function's policy. Mutating calls are
/// suppressed under dry-run but still reported as changes.
pub struct PolicyManager<'a> {
    api: &'a dyn FunctionPolicyApi,
    function_arn: &'a str,
    qualifier: Option<&'a str>,
    dry_run: bool,
}

impl<'a> PolicyManager<'a> {
    pub fn new(
        api: &'a dyn FunctionPolicyApi,
        function_arn: &'a str,
        qualifier: Option<&'a str>,
        dry_run: bool,
    ) -> Self {
        Self {
            api,
            function_arn,
            qualifier,
            dry_run,
        }
    }

    /// Whether the policy holds a statement with this `Sid`. A function with no
    /// policy has no statements.
    pub async fn statement_exists(&self, statement_id: &str) -> LambdaEventResult<bool> {
        let context = "Error retrieving function policy";
        let Some(raw) = self
            .api
            .get_policy(self.function_arn, self.qualifier)
            .await
            .map_err(LambdaEventError::aws(context))?
        else {
            return Ok(false);
        };

        let policy: FunctionPolicy = serde_json::from_str(&raw).map_err(|e| {
            LambdaEventError::aws(context)(AwsError::PolicyError(format!(
                "Failed to parse policy document JSON: {e}"
            )))
        })?;

        let present = policy
            .statement
            .iter()
            .any(|grant| grant.sid.as_deref() == Some(statement_id));
        debug!(
            "Statement {statement_id} {} on {}",
            if present { "present" } else { "absent" },
            self.function_arn
        );
        Ok(present)
    }

    pub async fn add_statement(&self, statement: &PolicyStatement) -> LambdaEventResult<()> {
        if self.dry_run {
            info!(
                "[dry-run] would add permission {} to {}",
                statement.statement_id, self.function_arn
            );
            return Ok(());
        }

        info!(
            "Adding permission {} to {}",
            statement.statement_id, self.function_arn
        );
        self.api
            .add_permission(self.function_arn, self.qualifier, &statement.to_api_params())
            .await
            .map_err(LambdaEventError::aws("Error adding permission to policy"))
    }

    pub async fn remove_statement(&self, statement_id: &str) -> LambdaEventResult<()> {
        if self.dry_run {
            info!(
                "[dry-run] would remove permission {statement_id} from {}",
                self.function_arn
            );
            return Ok(());
        }

        info!(
            "Removing permission {statement_id} from {}",
            self.function_arn
        );
        self.api
            .remove_permission(self.function_arn, self.qualifier, statement_id)
            .await
            .map_err(LambdaEventError::aws("Error removing permission from policy"))
    }

    /// Converge one statement to `present`. Returns whether a mutating call was
    /// made (or, under dry-run, would have been).
    pub async fn reconcile_statement(
        &self,
        statement: &PolicyStatement,
        present: bool,
    ) -> LambdaEventResult<bool> {
        let exists = self.statement_exists(&statement.statement_id).await?;
        match (present, exists) {
            (true, false) => self.add_statement(statement).await.map(|()| true),
            (false, true) => self
                .remove_statement(&statement.statement_id)
                .await
                .map(|()| true),
            _ => Ok(false),
        }
    }
}
