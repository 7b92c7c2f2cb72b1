//! Field/type and data-quality checks for telemetry records.
//!
//! Shared by the factory-order validator (embedded `telemetry_stub`) and by
//! [`validate_telemetry_export`] for exported batch files. Every message is
//! prefixed with a record label (`telemetry_stub`, `Record 3`).

use serde_json::{Map, Value};

use super::report::{DataQualityRules, ValidationResult};

pub const TELEMETRY_FIELDS: [&str; 5] =
    ["batch_id", "ritual", "units_processed", "status", "duration_ms"];

const STRING_FIELDS: [&str; 3] = ["batch_id", "ritual", "status"];
const INTEGER_FIELDS: [&str; 2] = ["units_processed", "duration_ms"];

fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

/// Required fields and their types
pub fn check_record_schema(record: &Map<String, Value>, label: &str, errors: &mut Vec<String>) {
    let mut missing: Vec<&str> = TELEMETRY_FIELDS
        .iter()
        .copied()
        .filter(|field| !record.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        errors.push(format!("{label}: Missing fields {missing:?}"));
    }

    for field in STRING_FIELDS {
        if record.get(field).is_some_and(|v| !v.is_string()) {
            errors.push(format!("{label}: {field} must be string"));
        }
    }
    for field in INTEGER_FIELDS {
        if record.get(field).is_some_and(|v| !is_integer(v)) {
            errors.push(format!("{label}: {field} must be integer"));
        }
    }
}

/// Thresholds and enumerations.
///
/// Only fields that are present with the right type are checked; absence
/// and type mismatches are schema findings.
pub fn check_record_dq(
    record: &Map<String, Value>,
    label: &str,
    rules: &DataQualityRules,
    errors: &mut Vec<String>,
) {
    if let Some(Value::String(batch_id)) = record.get("batch_id") {
        if batch_id.trim().is_empty() {
            errors.push(format!("{label}: batch_id is empty"));
        }
    }

    if let Some(Value::String(ritual)) = record.get("ritual") {
        if ritual.trim().is_empty() {
            errors.push(format!("{label}: ritual is empty"));
        } else if !rules.ritual_allowed(ritual) {
            errors.push(format!(
                "{label}: ritual '{ritual}' not in {:?}",
                rules.allowed_rituals
            ));
        }
    }

    if let Some(Value::String(status)) = record.get("status") {
        if !rules.status_allowed(status) {
            errors.push(format!(
                "{label}: status '{status}' not in {:?}",
                rules.allowed_statuses
            ));
        }
    }

    if let Some(units) = record.get("units_processed").and_then(Value::as_i64) {
        if units < 0 {
            errors.push(format!("{label}: units_processed {units} is negative"));
        }
    }

    if let Some(duration) = record.get("duration_ms").filter(|v| is_integer(v)) {
        let in_range = duration
            .as_i64()
            .is_some_and(|ms| rules.duration_in_range(ms));
        if !in_range {
            errors.push(format!(
                "{label}: duration_ms {duration} outside range [{}, {}]",
                rules.duration_min_ms, rules.duration_max_ms
            ));
        }
    }
}

/// Schema findings for a batch of exported telemetry records
pub fn validate_telemetry_schema(records: &[Value]) -> Vec<String> {
    let mut errors = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let label = format!("Record {idx}");
        match record.as_object() {
            Some(fields) => check_record_schema(fields, &label, &mut errors),
            None => errors.push(format!("{label}: must be an object")),
        }
    }
    errors
}

/// Data-quality findings for a batch of exported telemetry records
pub fn validate_telemetry_dq(records: &[Value], rules: &DataQualityRules) -> Vec<String> {
    let mut errors = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        if let Some(fields) = record.as_object() {
            check_record_dq(fields, &format!("Record {idx}"), rules, &mut errors);
        }
    }
    errors
}

/// Check an export of the form `{"batches": [record, ...]}`.
///
/// An empty batch list is a data-quality finding.
pub fn validate_telemetry_export(export: &Value, rules: &DataQualityRules) -> ValidationResult {
    let Some(batches) = export.get("batches").and_then(Value::as_array) else {
        return ValidationResult::from_errors(
            vec!["Export must be an object with a 'batches' list".to_string()],
            Vec::new(),
        );
    };

    let mut dq_errors = Vec::new();
    if batches.is_empty() {
        dq_errors.push("Dataset is empty".to_string());
    }
    dq_errors.extend(validate_telemetry_dq(batches, rules));
    ValidationResult::from_errors(validate_telemetry_schema(batches), dq_errors)
}
