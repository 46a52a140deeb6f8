use crate::aws::{AwsClients, AwsError};
use serde_json::Value;

/// A handle that can perform one Athena JSON-protocol call
///
/// The dispatcher only needs request/response; implementors own transport,
/// signing and endpoint selection.
pub trait CatalogService {
    fn call(&self, action: &str, request: &Value) -> Result<Value, AwsError>;
}

impl CatalogService for AwsClients {
    fn call(&self, action: &str, request: &Value) -> Result<Value, AwsError> {
        let body = serde_json::to_string(request)?;
        let text = self.http.json_request("athena", action, &body)?;
        if text.trim().is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        Ok(serde_json::from_str(&text)?)
    }
}
