//! Lightweight AWS HTTP Client with SigV4 signing
//!
//! Speaks the AWS JSON protocol over a blocking HTTP client

use aws_sigv4::http_request::{sign, SignableBody, SignableRequest, SigningSettings};
use aws_sigv4::sign::v4::SigningParams;
use aws_smithy_runtime_api::client::identity::Identity;
use reqwest::blocking::Client;
use std::time::{Duration, SystemTime};
use tracing::{debug, trace, warn};

use super::credentials::Credentials;
use super::error::AwsError;

const EUSC_PREFIX: &str = "eusc-";

/// Per-request timeout for catalog calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Mask sensitive credential values for logging
fn mask_credential(value: &str) -> String {
    if value.len() <= 8 {
        "*".repeat(value.len())
    } else {
        format!("{}...{}", &value[..4], &value[value.len() - 4..])
    }
}

/// First `max` characters of a response body, for log lines
fn log_excerpt(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// AWS Service definition
#[derive(Debug, Clone)]
pub struct ServiceDefinition {
    /// Service signing name (e.g., "athena")
    pub signing_name: &'static str,
    /// Service endpoint prefix
    pub endpoint_prefix: &'static str,
    /// API version (e.g., "2017-05-18" for Athena)
    pub api_version: &'static str,
    /// Target prefix for the X-Amz-Target header
    pub target_prefix: &'static str,
    /// JSON protocol version for the Content-Type header
    pub json_version: &'static str,
}

/// Service definitions for the JSON-protocol services this client talks to
pub fn get_service(name: &str) -> Option<ServiceDefinition> {
    match name {
        "athena" => Some(ServiceDefinition {
            signing_name: "athena",
            endpoint_prefix: "athena",
            api_version: "2017-05-18",
            target_prefix: "AmazonAthena",
            json_version: "1.1",
        }),
        _ => None,
    }
}

/// AWS HTTP Client
pub struct AwsHttpClient {
    http_client: Client,
    credentials: Credentials,
    region: String,
    endpoint_url: Option<String>,
}

impl AwsHttpClient {
    /// Create a new AWS HTTP client
    pub fn new(
        credentials: Credentials,
        region: &str,
        endpoint_url: Option<String>,
    ) -> Result<Self, AwsError> {
        debug!(
            "Creating AWS HTTP client for region: {}, access_key: {}, endpoint_url: {:?}",
            region,
            mask_credential(&credentials.access_key_id),
            endpoint_url
        );
        let http_client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            credentials,
            region: region.to_string(),
            endpoint_url,
        })
    }

    /// Get the endpoint URL for a service
    fn get_endpoint(&self, service: &ServiceDefinition) -> String {
        // A custom endpoint applies to every service (LocalStack, etc.)
        if let Some(ref endpoint) = self.endpoint_url {
            return endpoint.trim_end_matches('/').to_string();
        }

        format!(
            "https://{}.{}.{}",
            service.endpoint_prefix,
            self.region,
            Self::endpoint_domain(&self.region)
        )
    }

    /// Determine the endpoint domain for a region (standard vs. sovereign)
    fn endpoint_domain(region: &str) -> &'static str {
        if region.starts_with(EUSC_PREFIX) {
            "amazonaws.eu"
        } else {
            "amazonaws.com"
        }
    }

    /// Make a JSON protocol request and return the raw response body
    pub fn json_request(
        &self,
        service_name: &str,
        target: &str,
        body: &str,
    ) -> Result<String, AwsError> {
        debug!("JSON request: service={}, target={}", service_name, target);
        trace!("JSON body: {}", body);

        let service = get_service(service_name)
            .ok_or_else(|| AwsError::InvalidEndpoint(format!("Unknown service: {}", service_name)))?;

        let endpoint = self.get_endpoint(&service);
        let url = format!("{}/", endpoint);
        debug!("Endpoint: {} (api version {})", endpoint, service.api_version);

        let headers = vec![
            (
                "x-amz-target".to_string(),
                format!("{}.{}", service.target_prefix, target),
            ),
            (
                "content-type".to_string(),
                format!("application/x-amz-json-{}", service.json_version),
            ),
        ];

        self.signed_post(&service, &url, body, headers)
    }

    /// Sign and send a POST request
    fn signed_post(
        &self,
        service: &ServiceDefinition,
        url: &str,
        body: &str,
        extra_headers: Vec<(String, String)>,
    ) -> Result<String, AwsError> {
        let parsed_url = url::Url::parse(url)
            .map_err(|e| AwsError::InvalidEndpoint(format!("{}: {}", url, e)))?;
        let host = match (parsed_url.host_str(), parsed_url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => return Err(AwsError::InvalidEndpoint(url.to_string())),
        };
        let path_and_query = if let Some(query) = parsed_url.query() {
            format!("{}?{}", parsed_url.path(), query)
        } else {
            parsed_url.path().to_string()
        };

        let mut headers = vec![("host".to_string(), host)];
        headers.extend(extra_headers.iter().cloned());

        // Create identity for signing
        let creds = aws_credential_types::Credentials::new(
            &self.credentials.access_key_id,
            &self.credentials.secret_access_key,
            self.credentials.session_token.clone(),
            None,
            "athena-info",
        );
        let identity: Identity = creds.into();

        let signing_params = SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(service.signing_name)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| AwsError::Signing(e.to_string()))?
            .into();

        let signable_request = SignableRequest::new(
            "POST",
            &path_and_query,
            headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            SignableBody::Bytes(body.as_bytes()),
        )
        .map_err(|e| AwsError::Signing(e.to_string()))?;

        let (signing_instructions, _signature) = sign(signable_request, &signing_params)
            .map_err(|e| AwsError::Signing(e.to_string()))?
            .into_parts();

        let mut request = self.http_client.post(url);

        // Apply signing headers
        for (name, value) in signing_instructions.headers() {
            request = request.header(name.to_string(), value.to_string());
        }

        for (k, v) in &extra_headers {
            request = request.header(k.as_str(), v.as_str());
        }

        request = request.body(body.to_string());

        trace!("Sending POST request to {}", url);
        let response = request.send()?;
        let status = response.status();
        let error_type = response
            .headers()
            .get("x-amzn-errortype")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let text = response.text()?;

        debug!("Response status: {}", status);
        trace!(
            "Response body (first 2000 chars): {}",
            log_excerpt(&text, 2000)
        );

        if !status.is_success() {
            warn!(
                "AWS request failed: status={}, body={}",
                status,
                log_excerpt(&text, 500)
            );
            return Err(AwsError::from_json_response(
                status.as_u16(),
                error_type.as_deref(),
                &text,
            ));
        }

        Ok(text)
    }
}
