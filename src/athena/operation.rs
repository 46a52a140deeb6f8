//! Athena list operations
//!
//! Each mode maps to one JSON-protocol action. The table below describes how to
//! build the request, where the records live in the response and how the
//! continuation token is threaded between pages.

use super::params::Mode;
use serde_json::{json, Value};

/// Continuation-token wiring for a paginated action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Request field that carries the token of the previous page
    pub input_token: &'static str,
    /// JSON pointer to the token in the response
    pub output_token: &'static str,
}

/// Athena uses the same token names for every list call
const NEXT_TOKEN: PaginationConfig = PaginationConfig {
    input_token: "NextToken",
    output_token: "/NextToken",
};

/// Configuration for a single API operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Action name, sent as `X-Amz-Target: AmazonAthena.<action>`
    pub action: &'static str,
    /// JSON pointer to the record list in each response page
    pub response_root: &'static str,
    /// `None` means one call with no continuation
    pub pagination: Option<PaginationConfig>,
}

pub const LIST_DATA_CATALOGS: Operation = Operation {
    action: "ListDataCatalogs",
    response_root: "/DataCatalogsSummary",
    pagination: Some(NEXT_TOKEN),
};

pub const LIST_DATABASES: Operation = Operation {
    action: "ListDatabases",
    response_root: "/DatabaseList",
    pagination: Some(NEXT_TOKEN),
};

pub const LIST_TABLE_METADATA: Operation = Operation {
    action: "ListTableMetadata",
    response_root: "/TableMetadataList",
    pagination: Some(NEXT_TOKEN),
};

pub const LIST_WORK_GROUPS: Operation = Operation {
    action: "ListWorkGroups",
    response_root: "/WorkGroups",
    pagination: Some(NEXT_TOKEN),
};

impl Mode {
    pub fn operation(&self) -> &'static Operation {
        match self {
            Mode::Catalogs => &LIST_DATA_CATALOGS,
            Mode::Databases { .. } => &LIST_DATABASES,
            Mode::Tables { .. } => &LIST_TABLE_METADATA,
            Mode::WorkGroups => &LIST_WORK_GROUPS,
        }
    }

    /// Request body of the first page
    pub fn request(&self) -> Value {
        match self {
            Mode::Catalogs | Mode::WorkGroups => json!({}),
            Mode::Databases { catalog } => json!({ "CatalogName": catalog }),
            Mode::Tables { catalog, database } => json!({
                "CatalogName": catalog,
                "DatabaseName": database,
            }),
        }
    }
}
