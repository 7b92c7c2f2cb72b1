//! Exchange payload schemas (`signal-ack@1.0`, `field-report@1.0`).
//!
//! Unlike factory orders these checks stop at the first problem: the
//! exchange tooling only needs a valid/invalid verdict per file.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

pub const SCHEMA_SIGNAL_ACK: &str = "signal-ack@1.0";
pub const SCHEMA_FIELD_REPORT: &str = "field-report@1.0";

/// Exchange payload kinds understood by the validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeSchema {
    SignalAck,
    FieldReport,
}

impl ExchangeSchema {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            SCHEMA_SIGNAL_ACK => Some(Self::SignalAck),
            SCHEMA_FIELD_REPORT => Some(Self::FieldReport),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SignalAck => SCHEMA_SIGNAL_ACK,
            Self::FieldReport => SCHEMA_FIELD_REPORT,
        }
    }

    pub fn required_keys(&self) -> &'static [&'static str] {
        match self {
            Self::SignalAck => &[
                "ack_id",
                "referenced_id",
                "sender",
                "receiver",
                "timestamp_sent",
                "status",
            ],
            Self::FieldReport => &[
                "report_id",
                "origin",
                "relates_to",
                "timestamp_submitted",
                "status",
                "summary",
            ],
        }
    }

    pub fn timestamp_field(&self) -> &'static str {
        match self {
            Self::SignalAck => "timestamp_sent",
            Self::FieldReport => "timestamp_submitted",
        }
    }
}

impl std::fmt::Display for ExchangeSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First problem found in an exchange payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeSchemaError {
    #[error("Payload must be a JSON object")]
    NotAnObject,

    #[error("Missing schema identifier")]
    MissingSchema,

    #[error("Unsupported schema '{0}'")]
    Unsupported(String),

    /// Sorted key names
    #[error("Missing keys: {0:?}")]
    MissingKeys(Vec<String>),

    #[error("{field} is not a valid ISO-8601 timestamp")]
    InvalidTimestamp { field: String },
}

/// Check an exchange payload and return its schema kind
pub fn validate_exchange_payload(payload: &Value) -> Result<ExchangeSchema, ExchangeSchemaError> {
    let fields = payload.as_object().ok_or(ExchangeSchemaError::NotAnObject)?;

    let schema = match fields.get("schema") {
        None => return Err(ExchangeSchemaError::MissingSchema),
        Some(value) if is_blank(value) => return Err(ExchangeSchemaError::MissingSchema),
        Some(Value::String(tag)) => ExchangeSchema::from_tag(tag)
            .ok_or_else(|| ExchangeSchemaError::Unsupported(tag.clone()))?,
        Some(other) => return Err(ExchangeSchemaError::Unsupported(other.to_string())),
    };

    let mut missing: Vec<String> = schema
        .required_keys()
        .iter()
        .filter(|key| !fields.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(ExchangeSchemaError::MissingKeys(missing));
    }

    let field = schema.timestamp_field();
    let valid = fields
        .get(field)
        .and_then(Value::as_str)
        .is_some_and(is_iso8601);
    if !valid {
        return Err(ExchangeSchemaError::InvalidTimestamp {
            field: field.to_string(),
        });
    }

    Ok(schema)
}

/// Null, false, zero, or an empty string/list/object
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// RFC 3339 (with `Z` or an offset), a naive date-time with or without
/// seconds, or a bare date. The date/time separator may be `T` or a space.
pub fn is_iso8601(value: &str) -> bool {
    let normalized = match (value.get(..10), value.get(11..)) {
        (Some(date), Some(time)) if value.as_bytes()[10] == b' ' => format!("{date}T{time}"),
        _ => value.to_string(),
    };
    DateTime::parse_from_rfc3339(&normalized).is_ok()
        || NAIVE_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).is_ok())
        || NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").is_ok()
}
