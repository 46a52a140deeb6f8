//! Read-only metadata queries against AWS Athena
//!
//! Lists data catalogs, databases, table metadata or work groups through a
//! lightweight SigV4-signed HTTP client, and returns the records with
//! snake_case keys.

pub mod athena;
pub mod aws;

pub use athena::{
    fetch_all, normalize, query, run, CatalogService, InfoError, InfoParams, Listing, Mode,
    RetryPolicy,
};
pub use aws::{AwsClients, AwsError};
