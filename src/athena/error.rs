use crate::aws::AwsError;
use thiserror::Error;

/// Failure of a single metadata query
#[derive(Debug, Error)]
pub enum InfoError {
    /// More than one parameter of an exclusive group was given
    #[error("parameters are mutually exclusive: {}", .fields.join("|"))]
    MutuallyExclusive { fields: Vec<&'static str> },

    /// A mode flag was set without the parameters it needs
    #[error("{flag} is True but all of the following are missing: {}", .missing.join(", "))]
    MissingRequired {
        flag: &'static str,
        missing: Vec<&'static str>,
    },

    /// The service call failed, after retries where the failure was transient
    #[error("Failed to fetch aws athena details: {0}")]
    Service(AwsError),

    #[error("Failed to fetch aws athena details: unexpected {action} response: {reason}")]
    MalformedResponse {
        action: &'static str,
        reason: String,
    },
}

// Not a `source`: the service error is already part of the message
impl From<AwsError> for InfoError {
    fn from(err: AwsError) -> Self {
        InfoError::Service(err)
    }
}

impl InfoError {
    /// True when the error was raised before any network call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            InfoError::MutuallyExclusive { .. } | InfoError::MissingRequired { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_message_carries_diagnostic() {
        let err = InfoError::from(AwsError::Service {
            status: 400,
            code: "InvalidRequestException".to_string(),
            message: "Database nope does not exist".to_string(),
        });

        assert_eq!(
            err.to_string(),
            "Failed to fetch aws athena details: InvalidRequestException (400): Database nope does not exist"
        );
        assert!(std::error::Error::source(&err).is_none());
        assert!(!err.is_validation());
    }
}
