//! Record normalization
//!
//! Renames keys from the wire's CamelCase to snake_case and renders wire
//! timestamps (epoch seconds) as RFC 3339 strings. Both transforms are pure
//! and idempotent.

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::sync::OnceLock;

/// Wire fields carrying epoch-second timestamps
const TIMESTAMP_FIELDS: &[&str] = &["CreateTime", "LastAccessTime", "CreationTime"];

struct Patterns {
    /// Pluralized abbreviation at the end, e.g. `TargetGroupARNs`
    plural_abbreviation: Regex,
    first_cap: Regex,
    all_cap: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        plural_abbreviation: Regex::new(r"[A-Z]{3,}s$").expect("static regex"),
        first_cap: Regex::new(r"(.)([A-Z][a-z]+)").expect("static regex"),
        all_cap: Regex::new(r"([a-z0-9])([A-Z]+)").expect("static regex"),
    })
}

/// Convert one key to snake_case
///
/// `CatalogName` -> `catalog_name`, `TargetGroupARNs` -> `target_group_arns`,
/// `EXTERNAL` -> `external`. Lowercase input comes back unchanged.
pub fn camel_to_snake(name: &str) -> String {
    let p = patterns();

    let s1 = p
        .plural_abbreviation
        .replace(name, |caps: &Captures| format!("_{}", caps[0].to_lowercase()));
    // Drop an underscore the plural rule put in front of the whole name
    let s1 = if s1.starts_with('_') && !name.starts_with('_') {
        s1[1..].to_string()
    } else {
        s1.into_owned()
    };

    let s2 = p.first_cap.replace_all(&s1, "${1}_${2}");
    p.all_cap.replace_all(&s2, "${1}_${2}").to_lowercase()
}

/// Rename every key of every nested object to snake_case
pub fn camel_value_to_snake(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (camel_to_snake(k), camel_value_to_snake(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(camel_value_to_snake).collect()),
        other => other.clone(),
    }
}

/// Replace numeric timestamp fields with RFC 3339 strings in UTC
pub fn render_timestamps(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let rendered = match v.as_f64() {
                        Some(secs) if TIMESTAMP_FIELDS.contains(&k.as_str()) => {
                            epoch_to_rfc3339(secs).map(Value::String)
                        }
                        _ => None,
                    };
                    (k.clone(), rendered.unwrap_or_else(|| render_timestamps(v)))
                })
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(render_timestamps).collect()),
        other => other.clone(),
    }
}

/// Epoch seconds (fraction allowed) to RFC 3339, keeping microsecond precision
fn epoch_to_rfc3339(secs: f64) -> Option<String> {
    if !secs.is_finite() {
        return None;
    }
    let micros = (secs * 1_000_000.0).round() as i64;
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::<Utc>::from_timestamp(micros.div_euclid(1_000_000), nanos).map(|dt| dt.to_rfc3339())
}

/// Full normalization of one wire record
pub fn normalize_record(record: &Value) -> Value {
    camel_value_to_snake(&render_timestamps(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_to_snake() {
        assert_eq!(camel_to_snake("CatalogName"), "catalog_name");
        assert_eq!(camel_to_snake("Type"), "type");
        assert_eq!(camel_to_snake("LastAccessTime"), "last_access_time");
        assert_eq!(camel_to_snake("TargetGroupARNs"), "target_group_arns");
        assert_eq!(camel_to_snake("EXTERNAL"), "external");
        assert_eq!(camel_to_snake("S3OutputLocation"), "s3_output_location");
        assert_eq!(camel_to_snake("projection.enabled"), "projection.enabled");
    }

    #[test]
    fn test_snake_case_is_unchanged() {
        for key in ["catalog_name", "created_by", "type", "_private", "a1_b2"] {
            assert_eq!(camel_to_snake(key), key);
        }
    }

    #[test]
    fn test_nested_records_are_renamed() {
        let raw = json!({
            "Name": "elb_logs",
            "TableType": "EXTERNAL_TABLE",
            "Columns": [{"Name": "request_timestamp", "Type": "string"}],
            "PartitionKeys": [],
            "Parameters": {"EXTERNAL": "TRUE", "classification": "csv"},
            "Nested": [[{"InnerKey": 1}]]
        });

        assert_eq!(
            camel_value_to_snake(&raw),
            json!({
                "name": "elb_logs",
                "table_type": "EXTERNAL_TABLE",
                "columns": [{"name": "request_timestamp", "type": "string"}],
                "partition_keys": [],
                "parameters": {"external": "TRUE", "classification": "csv"},
                "nested": [[{"inner_key": 1}]]
            })
        );
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raw = json!({
            "CatalogName": "AwsDataCatalog",
            "Parameters": {"CreatedBy": "Athena"},
            "CreateTime": 1608414578.0
        });
        let once = normalize_record(&raw);
        assert_eq!(normalize_record(&once), once);
    }

    #[test]
    fn test_timestamps_render_as_rfc3339() {
        let raw = json!({
            "Name": "primary",
            "CreationTime": 1608413971.222,
            "CreateTime": 1608414578,
            "Description": ""
        });

        assert_eq!(
            normalize_record(&raw),
            json!({
                "name": "primary",
                "creation_time": "2020-12-19T21:39:31.222+00:00",
                "create_time": "2020-12-19T21:49:38+00:00",
                "description": ""
            })
        );
    }

    #[test]
    fn test_non_timestamp_numbers_are_kept() {
        let raw = json!({"Parameters": {"numRows": 12}});
        assert_eq!(render_timestamps(&raw), raw);
    }
}
