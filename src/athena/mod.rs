//! Athena metadata queries
//!
//! One invocation lists exactly one of: data catalogs (default), the databases
//! of a catalog, the tables of a database, or work groups.
//!
//! - [`params`] - parameters and the validation rules that select a [`Mode`]
//! - [`operation`] - the Athena action, response root and pagination per mode
//! - [`dispatch`] - drives the paginated calls and builds the [`Listing`]
//! - [`normalize`] - snake_case keys and RFC 3339 timestamps
//! - [`retry`] - bounded exponential backoff around each page request

pub mod dispatch;
pub mod error;
pub mod normalize;
pub mod operation;
pub mod params;
pub mod retry;
pub mod service;

pub use dispatch::{fetch_all, query, run, Listing};
pub use error::InfoError;
pub use operation::{Operation, PaginationConfig};
pub use params::{InfoParams, Mode};
pub use retry::RetryPolicy;
pub use service::CatalogService;
