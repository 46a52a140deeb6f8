//! AWS Client - Lightweight HTTP-based client
//!
//! Uses SigV4 signing with direct HTTP calls instead of heavy SDK

use anyhow::{anyhow, Result};
use tracing::debug;

use super::credentials::{load_credentials, resolve_region};
use super::http::AwsHttpClient;

/// Container for the AWS HTTP client of one invocation
pub struct AwsClients {
    pub http: AwsHttpClient,
}

impl AwsClients {
    /// Create AWS client for a given profile.
    ///
    /// An explicit `region` wins; otherwise it is resolved from the environment
    /// and then from the profile's config section.
    pub fn new(profile: &str, region: Option<&str>, endpoint_url: Option<String>) -> Result<Self> {
        let region = match region {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => resolve_region(profile).ok_or_else(|| {
                anyhow!(
                    "No region configured for profile '{}'. Pass --region or set AWS_REGION",
                    profile
                )
            })?,
        };
        debug!("Using profile '{}' in region {}", profile, region);

        let credentials = load_credentials(profile)?;
        let http = AwsHttpClient::new(credentials, &region, endpoint_url)?;

        Ok(Self { http })
    }
}
