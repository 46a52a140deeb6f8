//! athena-info: list Athena catalogs, databases, tables or work groups as JSON

use athena_info::{query, AwsClients, AwsError, InfoError, InfoParams, Listing, RetryPolicy};
use clap::Parser;
use serde_json::{json, Value};
use std::process::ExitCode;
use tracing::{debug, error};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Name of the Athena catalog
    #[arg(long, visible_alias = "catalog-name")]
    name: Option<String>,

    /// Fetch all databases of the catalog given by --name
    #[arg(long)]
    list_databases: bool,

    /// Fetch all tables and their metadata for --database-name
    #[arg(long)]
    list_database_tables: bool,

    /// Fetch all Athena work groups
    #[arg(long)]
    list_work_groups: bool,

    /// Name of the Athena database
    #[arg(long)]
    database_name: Option<String>,

    /// AWS profile
    #[arg(long, env = "AWS_PROFILE", default_value = "default")]
    profile: String,

    /// AWS region (defaults to AWS_REGION, AWS_DEFAULT_REGION, then the profile)
    #[arg(long)]
    region: Option<String>,

    /// Custom endpoint (LocalStack etc.)
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Log level, used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print single-line JSON
    #[arg(long)]
    compact: bool,
}

impl Args {
    fn params(&self) -> InfoParams {
        InfoParams {
            name: self.name.clone(),
            database_name: self.database_name.clone(),
            list_databases: self.list_databases,
            list_database_tables: self.list_database_tables,
            list_work_groups: self.list_work_groups,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    let (output, code) = match run(&args) {
        Ok(listing) => (success_output(&listing), ExitCode::SUCCESS),
        Err(err) => {
            error!("{:#}", err);
            (failure_output(&err), ExitCode::FAILURE)
        }
    };

    let rendered = if args.compact {
        serde_json::to_string(&output)
    } else {
        serde_json::to_string_pretty(&output)
    };
    match rendered {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("Failed to render output: {}", e);
            return ExitCode::FAILURE;
        }
    }
    code
}

/// Initialize logging on stderr; stdout carries the JSON result
fn init_logging(log_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> anyhow::Result<Listing> {
    // Parameter rules are checked before credentials are touched
    let mode = args.params().validate()?;
    debug!("Mode: {:?}", mode);

    let clients = AwsClients::new(
        &args.profile,
        args.region.as_deref(),
        args.endpoint_url.clone(),
    )?;

    Ok(query(&clients, &mode, &RetryPolicy::default())?)
}

fn success_output(listing: &Listing) -> Value {
    let mut output = json!({ "changed": false });
    output[listing.key()] = Value::Array(listing.records().to_vec());
    output
}

fn failure_output(err: &anyhow::Error) -> Value {
    let mut output = json!({
        "failed": true,
        "changed": false,
        "msg": format!("{:#}", err),
    });

    if let Some(InfoError::Service(aws)) = err.downcast_ref::<InfoError>() {
        output["error"] = json!({
            "code": aws.code(),
            "message": service_message(aws),
        });
        output["response_metadata"] = json!({ "http_status_code": aws.status() });
    }

    output
}

fn service_message(err: &AwsError) -> String {
    match err {
        AwsError::Service { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_name_alias() {
        let args = Args::try_parse_from([
            "athena-info",
            "--catalog-name",
            "AwsDataCatalog",
            "--list-databases",
        ])
        .unwrap();

        let params = args.params();
        assert_eq!(params.name.as_deref(), Some("AwsDataCatalog"));
        assert!(params.list_databases);
    }

    #[test]
    fn test_conflicting_flags_parse_and_fail_validation() {
        let args = Args::try_parse_from([
            "athena-info",
            "--list-databases",
            "--list-work-groups",
        ])
        .unwrap();

        let err = run(&args).unwrap_err();
        let output = failure_output(&err);
        assert_eq!(output["failed"], true);
        assert_eq!(
            output["msg"],
            "parameters are mutually exclusive: list_databases|list_database_tables|list_work_groups"
        );
        assert!(output.get("error").is_none());
    }

    #[test]
    fn test_success_output_has_one_listing_key() {
        let listing = Listing::Catalogs(vec![json!({"catalog_name": "AwsDataCatalog", "type": "GLUE"})]);
        assert_eq!(
            success_output(&listing),
            json!({
                "changed": false,
                "catalogs": [{"catalog_name": "AwsDataCatalog", "type": "GLUE"}]
            })
        );
    }

    #[test]
    fn test_service_failure_output() {
        let err: anyhow::Error = InfoError::Service(AwsError::Service {
            status: 400,
            code: "InvalidRequestException".to_string(),
            message: "Catalog nope was not found".to_string(),
        })
        .into();

        let output = failure_output(&err);
        assert_eq!(
            output["msg"],
            "Failed to fetch aws athena details: InvalidRequestException (400): Catalog nope was not found"
        );
        assert_eq!(output["error"]["code"], "InvalidRequestException");
        assert_eq!(output["error"]["message"], "Catalog nope was not found");
        assert_eq!(output["response_metadata"]["http_status_code"], 400);
        assert!(output.get("catalogs").is_none());
    }
}
