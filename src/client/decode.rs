//! Decoding of comparison responses.
//!
//! The backend answers every comparison endpoint with an object keyed by
//! project, but the per-project value differs between endpoints: a list of
//! row objects, a `{category: count}` map, or an `{"authors": [...]}` block.
//! All of them are normalized to [`MetricSeries`].

use crate::error::FetchError;
use crate::models::{ComparisonPayload, MetricKind, MetricRow, MetricSeries, ProjectKey};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Decode a raw response body.
pub fn decode_body(kind: MetricKind, body: &str) -> Result<ComparisonPayload, FetchError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Malformed(format!("invalid JSON: {}", e)))?;
    decode_payload(kind, &value)
}

/// Decode a parsed response into per-project metric series.
///
/// Project entries of an unexpected shape are dropped; the aggregator then
/// reports them as missing.
pub fn decode_payload(kind: MetricKind, value: &Value) -> Result<ComparisonPayload, FetchError> {
    let object = value.as_object().ok_or_else(|| {
        FetchError::Malformed(format!(
            "expected an object keyed by project, got {}",
            json_type(value)
        ))
    })?;

    let mut payload = ComparisonPayload::default();

    for (raw_key, entry) in object {
        let Some(key) = ProjectKey::new(raw_key) else {
            debug!("Skipping blank project key in {} response", kind);
            continue;
        };

        match decode_project(kind, entry) {
            Some(series) => payload.insert(key, series),
            None => warn!(
                "Ignoring {} entry for project {}: unexpected {}",
                kind,
                key,
                json_type(entry)
            ),
        }
    }

    Ok(payload)
}

fn decode_project(kind: MetricKind, entry: &Value) -> Option<MetricSeries> {
    match entry {
        // Projects without rows come back as null
        Value::Null => Some(MetricSeries::default()),
        Value::Array(rows) => Some(decode_rows(kind, rows)),
        Value::Object(map) => match map.get("authors") {
            Some(Value::Array(rows)) if kind == MetricKind::TimeSpent => {
                Some(decode_rows(kind, rows))
            }
            Some(Value::Null) if kind == MetricKind::TimeSpent => Some(MetricSeries::default()),
            _ => Some(decode_counts(map)),
        },
        _ => None,
    }
}

fn decode_rows(kind: MetricKind, rows: &[Value]) -> MetricSeries {
    let decoded: Vec<MetricRow> = rows.iter().filter_map(|r| row_from_json(kind, r)).collect();

    if decoded.len() < rows.len() {
        debug!(
            "Skipped {} malformed {} rows",
            rows.len() - decoded.len(),
            kind
        );
    }

    MetricSeries::new(decoded)
}

fn row_from_json(kind: MetricKind, json: &Value) -> Option<MetricRow> {
    let category = json[kind.category_field()]
        .as_str()
        .or_else(|| json["category"].as_str())?;
    let value = as_count(&json[kind.value_field()]).or_else(|| as_count(&json["value"]))?;

    Some(MetricRow::new(category, value))
}

fn decode_counts(map: &Map<String, Value>) -> MetricSeries {
    MetricSeries::new(
        map.iter()
            .filter_map(|(category, value)| Some(MetricRow::new(category.as_str(), as_count(value)?)))
            .collect(),
    )
}

/// Non-negative integer, accepting whole or rounded floats.
fn as_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    // u64::MAX as f64 is 2^64, one past the largest representable count
    match value.as_f64().map(f64::round) {
        Some(f) if f.is_finite() && f >= 0.0 && f < u64::MAX as f64 => Some(f as u64),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> ProjectKey {
        ProjectKey::new(s).unwrap()
    }

    fn value(series: &MetricSeries, category: &str) -> Option<u64> {
        series
            .rows
            .iter()
            .find(|r| r.category == category)
            .map(|r| r.value)
    }

    #[test]
    fn test_decode_time_open_rows() {
        let payload = decode_body(
            MetricKind::TimeOpen,
            include_str!("../../fixtures/compare_time_open.json"),
        )
        .unwrap();

        let alpha = payload.get(&key("ALPHA")).unwrap();
        assert_eq!(alpha.rows.len(), 4);
        assert_eq!(alpha.rows[0], MetricRow::new("0-1", 10));
        assert_eq!(alpha.rows[3], MetricRow::new("30+", 4));
        assert_eq!(payload.get(&key("BETA")).unwrap().rows.len(), 3);
    }

    #[test]
    fn test_decode_status_map_keeps_order() {
        let payload = decode_body(
            MetricKind::StatusDistribution,
            include_str!("../../fixtures/compare_status.json"),
        )
        .unwrap();

        let alpha = payload.get(&key("ALPHA")).unwrap();
        let categories: Vec<&str> = alpha.rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(categories, vec!["Closed", "In Progress", "Open"]);
        assert_eq!(value(alpha, "Open"), Some(7));
    }

    #[test]
    fn test_decode_time_spent_authors_block() {
        let payload = decode_body(
            MetricKind::TimeSpent,
            include_str!("../../fixtures/compare_time_spent.json"),
        )
        .unwrap();

        let beta = payload.get(&key("BETA")).unwrap();
        assert_eq!(beta.rows[0], MetricRow::new("Mike Johnson", 5400));
        assert_eq!(value(beta, "Jane Smith"), Some(1800));
    }

    #[test]
    fn test_decode_priority_mixed_shapes() {
        let payload = decode_body(
            MetricKind::Priority,
            include_str!("../../fixtures/compare_priority.json"),
        )
        .unwrap();

        assert_eq!(value(payload.get(&key("ALPHA")).unwrap(), "Medium"), Some(8));
        assert_eq!(value(payload.get(&key("BETA")).unwrap(), "Low"), Some(5));
    }

    #[test]
    fn test_decode_skips_malformed_rows() {
        let body = r#"{"A": [{"range": "0-1", "count": 2}, {"range": "1-2"}, {"count": 4}, 17]}"#;
        let payload = decode_body(MetricKind::TimeOpen, body).unwrap();
        assert_eq!(payload.get(&key("A")).unwrap().rows, vec![MetricRow::new("0-1", 2)]);
    }

    #[test]
    fn test_decode_null_entry_is_empty_series() {
        let payload = decode_body(MetricKind::TimeOpen, r#"{"A": null}"#).unwrap();
        assert!(payload.get(&key("A")).unwrap().is_empty());
        assert!(payload.is_empty());
    }

    #[test]
    fn test_decode_rejects_non_object() {
        assert!(matches!(
            decode_body(MetricKind::Priority, "[1, 2, 3]"),
            Err(FetchError::Malformed(_))
        ));
        assert!(matches!(
            decode_body(MetricKind::Priority, "not json"),
            Err(FetchError::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_drops_wrong_shaped_project() {
        let payload = decode_body(
            MetricKind::StatusDistribution,
            r#"{"A": "oops", "B": {"Open": 1}}"#,
        )
        .unwrap();
        assert!(payload.get(&key("A")).is_none());
        assert!(payload.get(&key("B")).is_some());
    }

    #[test]
    fn test_as_count_rounds_floats() {
        assert_eq!(as_count(&serde_json::json!(3)), Some(3));
        assert_eq!(as_count(&serde_json::json!(2.6)), Some(3));
        assert_eq!(as_count(&serde_json::json!(-1)), None);
        assert_eq!(as_count(&serde_json::json!("5")), None);
    }

    #[test]
    fn test_as_count_rejects_out_of_range_floats() {
        assert_eq!(as_count(&serde_json::json!(1e30)), None);
        assert_eq!(as_count(&serde_json::json!(u64::MAX)), Some(u64::MAX));

        let body = r#"{"A": [{"range": "0-1", "count": 1e30}, {"range": "1-2", "count": 4}]}"#;
        let payload = decode_body(MetricKind::TimeOpen, body).unwrap();
        assert_eq!(payload.get(&key("A")).unwrap().rows, vec![MetricRow::new("1-2", 4)]);
    }
}
