//! Query dispatcher
//!
//! Validates parameters, selects the Athena list operation for the active mode,
//! drives its pagination and collects the normalized records.

use super::error::InfoError;
use super::normalize::normalize_record;
use super::operation::Operation;
use super::params::{InfoParams, Mode};
use super::retry::{with_backoff, RetryPolicy};
use super::service::CatalogService;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info};

/// The records of one invocation, keyed by mode when serialized
/// (`{"catalogs": [...]}`, `{"databases": [...]}`, ...)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Listing {
    Catalogs(Vec<Value>),
    Databases(Vec<Value>),
    Tables(Vec<Value>),
    WorkGroups(Vec<Value>),
}

impl Listing {
    fn new(mode: &Mode, records: Vec<Value>) -> Self {
        match mode {
            Mode::Catalogs => Listing::Catalogs(records),
            Mode::Databases { .. } => Listing::Databases(records),
            Mode::Tables { .. } => Listing::Tables(records),
            Mode::WorkGroups => Listing::WorkGroups(records),
        }
    }

    /// Output key of this listing
    pub fn key(&self) -> &'static str {
        match self {
            Listing::Catalogs(_) => "catalogs",
            Listing::Databases(_) => "databases",
            Listing::Tables(_) => "tables",
            Listing::WorkGroups(_) => "work_groups",
        }
    }

    pub fn records(&self) -> &[Value] {
        match self {
            Listing::Catalogs(r)
            | Listing::Databases(r)
            | Listing::Tables(r)
            | Listing::WorkGroups(r) => r,
        }
    }
}

/// Validate `params` and run the selected listing
pub fn run<S>(service: &S, params: &InfoParams, policy: &RetryPolicy) -> Result<Listing, InfoError>
where
    S: CatalogService + ?Sized,
{
    let mode = params.validate()?;
    query(service, &mode, policy)
}

/// Run the listing for an already validated mode
pub fn query<S>(service: &S, mode: &Mode, policy: &RetryPolicy) -> Result<Listing, InfoError>
where
    S: CatalogService + ?Sized,
{
    let operation = mode.operation();
    let records = fetch_all(service, operation, &mode.request(), policy)?;
    info!("{} returned {} records", operation.action, records.len());
    Ok(Listing::new(mode, records))
}

/// Fetch every page of `operation` and flatten the normalized records in page order
pub fn fetch_all<S>(
    service: &S,
    operation: &Operation,
    request: &Value,
    policy: &RetryPolicy,
) -> Result<Vec<Value>, InfoError>
where
    S: CatalogService + ?Sized,
{
    let malformed = |reason: String| InfoError::MalformedResponse {
        action: operation.action,
        reason,
    };

    let mut records = Vec::new();
    let mut next_token: Option<String> = None;
    let mut seen_tokens: HashSet<String> = HashSet::new();
    let mut page = 0usize;

    loop {
        let mut body = request.clone();
        if let (Some(pagination), Some(token)) = (&operation.pagination, &next_token) {
            let fields = body
                .as_object_mut()
                .ok_or_else(|| malformed("request body is not an object".to_string()))?;
            fields.insert(
                pagination.input_token.to_string(),
                Value::String(token.clone()),
            );
        }

        let response = with_backoff(policy, operation.action, || {
            service.call(operation.action, &body)
        })?;
        page += 1;

        match response.pointer(operation.response_root) {
            Some(Value::Array(items)) => {
                debug!(
                    "{} page {}: {} records",
                    operation.action,
                    page,
                    items.len()
                );
                records.extend(items.iter().map(normalize_record));
            }
            // JSON services may leave an empty list out entirely
            None | Some(Value::Null) => {
                debug!("{} page {}: no {}", operation.action, page, operation.response_root);
            }
            Some(other) => {
                return Err(malformed(format!(
                    "{} is not a list: {}",
                    operation.response_root, other
                )));
            }
        }

        let Some(pagination) = &operation.pagination else {
            break;
        };
        let token = response
            .pointer(pagination.output_token)
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        match token {
            None => break,
            Some(t) if !seen_tokens.insert(t.clone()) => {
                return Err(malformed(format!("pagination token repeated on page {}", page)));
            }
            Some(t) => next_token = Some(t),
        }
    }

    Ok(records)
}
