//! Errors surfaced by the AWS transport layer

use serde_json::Value;
use thiserror::Error;

/// Error codes AWS uses for throttling and transient server-side failures
const RETRYABLE_CODES: &[&str] = &[
    "RequestLimitExceeded",
    "Unavailable",
    "ServiceUnavailable",
    "InternalFailure",
    "InternalError",
    "InternalServerException",
    "TooManyRequestsException",
    "Throttling",
    "ThrottlingException",
];

#[derive(Debug, Error)]
pub enum AwsError {
    /// The request never produced an HTTP response (connect, timeout, body read)
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// The service answered with a non-2xx status
    #[error("{code} ({status}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("failed to sign request: {0}")]
    Signing(String),

    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("failed to decode response body: {0}")]
    Decode(serde_json::Error),
}

// Manual conversions: the inner error is part of the message, not a `source`
impl From<reqwest::Error> for AwsError {
    fn from(err: reqwest::Error) -> Self {
        AwsError::Transport(err)
    }
}

impl From<serde_json::Error> for AwsError {
    fn from(err: serde_json::Error) -> Self {
        AwsError::Decode(err)
    }
}

impl AwsError {
    /// Whether the same request may succeed if sent again after a delay
    pub fn is_retryable(&self) -> bool {
        match self {
            AwsError::Transport(_) => true,
            AwsError::Service { status, code, .. } => {
                *status >= 500 || RETRYABLE_CODES.contains(&code.as_str())
            }
            AwsError::Signing(_) | AwsError::InvalidEndpoint(_) | AwsError::Decode(_) => false,
        }
    }

    /// Service error code, if the service returned one
    pub fn code(&self) -> Option<&str> {
        match self {
            AwsError::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            AwsError::Service { status, .. } => Some(*status),
            AwsError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Build a service error from a JSON-protocol error response.
    ///
    /// Bodies look like `{"__type": "com.amazonaws...#InvalidRequestException", "Message": "..."}`.
    /// The `x-amzn-ErrorType` header is used when the body carries no type.
    pub fn from_json_response(status: u16, error_type_header: Option<&str>, body: &str) -> Self {
        let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);

        let raw_code = parsed
            .get("__type")
            .and_then(|v| v.as_str())
            .or(error_type_header)
            .unwrap_or("UnknownError");

        let message = parsed
            .get("message")
            .or_else(|| parsed.get("Message"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| body.chars().take(500).collect());

        AwsError::Service {
            status,
            code: sanitize_error_code(raw_code),
            message,
        }
    }
}

/// Strip the namespace prefix (`aws.protocol#Code`) and header suffix (`Code:http://...`)
fn sanitize_error_code(raw: &str) -> String {
    let without_suffix = raw.split(':').next().unwrap_or(raw);
    without_suffix
        .rsplit('#')
        .next()
        .unwrap_or(without_suffix)
        .trim()
        .to_string()
}
