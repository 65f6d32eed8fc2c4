use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use lambda_event_core::{
    preflight, resolve_qualifier, ConnectOptions, EventSource, LambdaEventService,
    ReconcileOutcome, ReconcileRequest, SourceParams, State,
};
use log::{debug, error};
use serde::Serialize;
use std::process::ExitCode;

/// Creates, updates or deletes Lambda event-source wiring (S3 bucket
/// notifications) together with the matching invoke permission.
#[derive(Parser, Debug)]
#[command(
    name = "lambda-event",
    about = "Converge S3 event notifications and Lambda invoke permissions to a desired state",
    disable_version_flag = true
)]
struct Cli {
    /// Desired state of the event-source wiring (present or absent)
    #[arg(long, default_value = "present")]
    state: State,

    /// Source of the events that trigger the function (s3, Kinesis, DynamoDB, SNS)
    #[arg(long)]
    event_source: EventSource,

    /// Name or ARN of the Lambda function
    #[arg(
        long,
        visible_aliases = ["function-name", "function-arn", "lambda-arn"]
    )]
    lambda_function_arn: Option<String>,

    /// Function alias to address; mutually exclusive with --version
    #[arg(long, conflicts_with = "version")]
    alias: Option<String>,

    /// Function version to address; mutually exclusive with --alias
    #[arg(long)]
    version: Option<i64>,

    /// Source parameters as a JSON object: {"id", "bucket", "prefix", "suffix", "events"}
    #[arg(long, value_name = "JSON")]
    source_params: Option<String>,

    /// Unique id of the event-source configuration
    #[arg(long)]
    id: Option<String>,

    /// Name of the source bucket
    #[arg(long)]
    bucket: Option<String>,

    /// Object key prefix filter (e.g. images/)
    #[arg(long)]
    prefix: Option<String>,

    /// Object key suffix filter (e.g. log)
    #[arg(long)]
    suffix: Option<String>,

    /// Event types, repeated or comma-separated (e.g. s3:ObjectCreated:Put)
    #[arg(long, value_delimiter = ',')]
    events: Vec<String>,

    /// Report the changes that would be made without making them
    #[arg(long, visible_alias = "check-mode")]
    check: bool,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    /// AWS region override
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// AWS shared-config profile to use
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Source parameters from --source-params, overridden by individual flags.
    fn source_params(&self) -> Result<SourceParams> {
        let mut params = match &self.source_params {
            Some(json) => serde_json::from_str::<SourceParams>(json)
                .context("Invalid --source-params, expected a JSON object")?,
            None => SourceParams::default(),
        };

        if let Some(id) = &self.id {
            params.id = Some(id.clone());
        }
        if let Some(bucket) = &self.bucket {
            params.bucket = Some(bucket.clone());
        }
        if let Some(prefix) = &self.prefix {
            params.prefix = Some(prefix.clone());
        }
        if let Some(suffix) = &self.suffix {
            params.suffix = Some(suffix.clone());
        }
        if !self.events.is_empty() {
            params.events = self.events.clone();
        }
        Ok(params)
    }

    fn to_request(&self) -> Result<ReconcileRequest> {
        Ok(ReconcileRequest {
            state: self.state,
            event_source: self.event_source,
            function_arn: self.lambda_function_arn.clone().unwrap_or_default(),
            qualifier: resolve_qualifier(self.version, self.alias.as_deref()),
            source_params: self.source_params()?,
        })
    }
}

#[derive(Serialize)]
struct Failure {
    failed: bool,
    msg: String,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("Failed to serialize result")?;
    println!("{json}");
    Ok(())
}

async fn run(cli: &Cli) -> Result<ReconcileOutcome> {
    let request = cli.to_request()?;
    debug!("Request: {request:?}");

    // Reject bad input before any AWS client is built.
    preflight(&request)?;

    let options = ConnectOptions {
        region: cli.region.clone(),
        profile: cli.profile.clone(),
    };
    let service = LambdaEventService::new(&options, cli.check)
        .await
        .context("Failed to initialize service")?;

    Ok(service.reconcile(&request).await?)
}

/// Print the outcome, or the failure document, and pick the exit status.
fn report(result: Result<ReconcileOutcome>, pretty: bool) -> ExitCode {
    match result {
        Ok(outcome) => match print_json(&outcome, pretty) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e:#}");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!("{e:#}");
            let failure = Failure {
                failed: true,
                msg: format!("{e:#}"),
            };
            if let Err(e) = print_json(&failure, pretty) {
                eprintln!("{e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = run(&cli).await;
    report(result, cli.pretty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_json_source_params() {
        let cli = Cli::parse_from([
            "lambda-event",
            "--event-source",
            "S3",
            "--function-name",
            "ingestData",
            "--alias",
            "Dev",
            "--source-params",
            r#"{"id": "lambda-s3-myBucket-create-data-log", "bucket": "buzz-scanner", "prefix": "twitter", "events": ["s3:ObjectCreated:Put"]}"#,
            "--suffix",
            "log",
            "--bucket",
            "other-bucket",
        ]);

        let request = cli.to_request().unwrap();
        assert_eq!(request.state, State::Present);
        assert_eq!(request.event_source, EventSource::S3);
        assert_eq!(request.function_arn, "ingestData");
        assert_eq!(request.qualifier.as_deref(), Some("Dev"));
        let params = request.source_params;
        assert_eq!(params.id.as_deref(), Some("lambda-s3-myBucket-create-data-log"));
        assert_eq!(params.bucket.as_deref(), Some("other-bucket"));
        assert_eq!(params.prefix.as_deref(), Some("twitter"));
        assert_eq!(params.suffix.as_deref(), Some("log"));
        assert_eq!(params.events, vec!["s3:ObjectCreated:Put".to_string()]);
    }

    #[test]
    fn test_events_are_comma_separated() {
        let cli = Cli::parse_from([
            "lambda-event",
            "--state",
            "absent",
            "--event-source",
            "s3",
            "--lambda-function-arn",
            "arn:aws:lambda:us-east-1:123456789012:function:ingest",
            "--version",
            "4",
            "--id",
            "evt1",
            "--bucket",
            "my-bucket",
            "--events",
            "s3:ObjectCreated:Put,s3:ObjectRemoved:*",
        ]);

        let request = cli.to_request().unwrap();
        assert_eq!(request.state, State::Absent);
        assert_eq!(request.qualifier.as_deref(), Some("4"));
        assert_eq!(request.source_params.events.len(), 2);
        assert!(preflight(&request).is_ok());
    }

    #[test]
    fn test_report_exit_status() {
        let outcome = ReconcileOutcome::default();
        assert_eq!(report(Ok(outcome), false), ExitCode::SUCCESS);
        assert_eq!(
            report(Err(anyhow::anyhow!("Error: bucket is required")), false),
            ExitCode::FAILURE
        );
    }

    #[test]
    fn test_invalid_source_params_json() {
        let cli = Cli::parse_from([
            "lambda-event",
            "--event-source",
            "s3",
            "--source-params",
            "[1, 2]",
        ]);
        let err = cli.to_request().unwrap_err();
        assert!(err.to_string().contains("Invalid --source-params"));
    }
}
