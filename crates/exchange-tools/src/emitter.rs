//! Factory-order emitter.
//!
//! Turns translator output into a validated `factory-order@1.0` file,
//! optionally stamping exchange fields (order id, issuer, target, ...).

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use translator::order::FACTORY_ORDER_SCHEMA;
use translator::{Translator, ValidationResult};

/// Optional fields stamped onto an order before validation
#[derive(Debug, Clone, Default)]
pub struct OrderOverrides {
    pub order_id: Option<String>,
    pub issued_by: Option<String>,
    pub target: Option<String>,
    pub priority: Option<String>,
    pub timestamp_issued: Option<String>,
    pub summary: Option<String>,
    /// Written to `metadata.narrator_profile`
    pub narrator_profile: Option<String>,
    /// `KEY=VALUE` assignments; VALUE is parsed as JSON when possible
    pub extra_fields: Vec<String>,
}

/// The order failed validation; carries every finding.
#[derive(Error, Debug)]
#[error("{}", render_findings(.0))]
pub struct OrderRejected(pub ValidationResult);

fn render_findings(result: &ValidationResult) -> String {
    let mut lines = vec![format!("Factory order {}", result.summary())];
    if !result.schema_errors.is_empty() {
        lines.push("Schema errors:".to_string());
        lines.extend(result.schema_errors.iter().map(|e| format!("  - {e}")));
    }
    if !result.dq_errors.is_empty() {
        lines.push("Data-quality errors:".to_string());
        lines.extend(result.dq_errors.iter().map(|e| format!("  - {e}")));
    }
    lines.join("\n")
}

/// What `emit` produced
#[derive(Debug, Clone)]
pub struct EmitOutcome {
    pub order: Value,
    /// None on dry run
    pub written: Option<PathBuf>,
}

/// The order inside translator output: a round-trip record's `payload`, or
/// the document itself.
pub fn extract_order(data: Value) -> Result<Map<String, Value>> {
    match data {
        Value::Object(mut fields) => match fields.remove("payload") {
            Some(Value::Object(payload)) => Ok(payload),
            Some(other) => {
                fields.insert("payload".to_string(), other);
                Ok(fields)
            }
            None => Ok(fields),
        },
        _ => bail!("Translator payload must be a JSON object"),
    }
}

pub fn load_translator_payload(path: &Path) -> Result<Map<String, Value>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read translator payload {}", path.display()))?;
    let data: Value = serde_json::from_str(&source)
        .with_context(|| format!("Translator payload {} is invalid JSON", path.display()))?;
    extract_order(data)
}

pub fn parse_extra_field(token: &str) -> Result<(String, Value)> {
    let Some((raw_key, raw_value)) = token.split_once('=') else {
        bail!("extra-field entries must be in KEY=VALUE form");
    };
    let key = raw_key.trim();
    if key.is_empty() {
        bail!("extra-field key cannot be empty");
    }
    let value = serde_json::from_str(raw_value)
        .unwrap_or_else(|_| Value::String(raw_value.to_string()));
    Ok((key.to_string(), value))
}

pub fn apply_overrides(order: &mut Map<String, Value>, overrides: &OrderOverrides) -> Result<()> {
    let fields = [
        ("order_id", &overrides.order_id),
        ("issued_by", &overrides.issued_by),
        ("target", &overrides.target),
        ("priority", &overrides.priority),
        ("timestamp_issued", &overrides.timestamp_issued),
        ("summary", &overrides.summary),
    ];
    for (key, value) in fields {
        if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
            order.insert(key.to_string(), Value::String(value.to_string()));
        }
    }

    if let Some(narrator) = overrides.narrator_profile.as_deref().filter(|v| !v.is_empty()) {
        let metadata = order
            .entry("metadata")
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(metadata) = metadata.as_object_mut() else {
            bail!("metadata must be an object to set narrator_profile");
        };
        metadata.insert(
            "narrator_profile".to_string(),
            Value::String(narrator.to_string()),
        );
    }

    for token in &overrides.extra_fields {
        let (key, value) = parse_extra_field(token)?;
        order.insert(key, value);
    }
    Ok(())
}

/// Default the schema tag, apply overrides and validate.
pub fn prepare_order(
    mut order: Map<String, Value>,
    overrides: &OrderOverrides,
    translator: &Translator,
) -> Result<Value> {
    order
        .entry("schema")
        .or_insert_with(|| Value::String(FACTORY_ORDER_SCHEMA.to_string()));
    apply_overrides(&mut order, overrides)?;

    let order = Value::Object(order);
    let result = translator.validate(&order);
    if !result.accepted {
        return Err(OrderRejected(result).into());
    }
    Ok(order)
}

/// Load, prepare and (unless `dry_run`) write an order.
pub fn emit(
    source: &Path,
    destination: &Path,
    overrides: &OrderOverrides,
    translator: &Translator,
    dry_run: bool,
) -> Result<EmitOutcome> {
    let order = prepare_order(load_translator_payload(source)?, overrides, translator)?;
    if dry_run {
        return Ok(EmitOutcome {
            order,
            written: None,
        });
    }

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let rendered = serde_json::to_string_pretty(&order).context("Failed to render order")?;
    std::fs::write(destination, rendered)
        .with_context(|| format!("Failed to write factory order {}", destination.display()))?;
    info!(path = %destination.display(), "Wrote factory order");

    Ok(EmitOutcome {
        order,
        written: Some(destination.to_path_buf()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BUILTIN_LEXICON;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use translator::{GlyphIndex, OrderSynthesizer};

    fn translator() -> Translator {
        Translator::new(
            GlyphIndex::from_json_str(BUILTIN_LEXICON).unwrap(),
            OrderSynthesizer::default(),
        )
    }

    fn round_trip_value(translator: &Translator) -> Value {
        let now = Utc.with_ymd_and_hms(2025, 11, 26, 6, 1, 9).unwrap();
        let trip = translator
            .translate_at(&["ally", "shield", "target"], now)
            .unwrap();
        serde_json::to_value(trip).unwrap()
    }

    #[test]
    fn test_extract_order_prefers_payload() {
        let translator = translator();
        let data = round_trip_value(&translator);
        let order = extract_order(data.clone()).unwrap();
        assert_eq!(Value::Object(order), data["payload"]);

        let bare = extract_order(json!({"schema": "factory-order@1.0"})).unwrap();
        assert!(bare.contains_key("schema"));
        assert!(extract_order(json!([1, 2])).is_err());
    }

    #[test]
    fn test_parse_extra_field() {
        assert_eq!(
            parse_extra_field("priority_score=3").unwrap(),
            ("priority_score".to_string(), json!(3))
        );
        assert_eq!(
            parse_extra_field("tags=[\"a\",\"b\"]").unwrap(),
            ("tags".to_string(), json!(["a", "b"]))
        );
        assert_eq!(
            parse_extra_field(" note =plain text").unwrap(),
            ("note".to_string(), json!("plain text"))
        );
        assert!(parse_extra_field("novalue").is_err());
        assert!(parse_extra_field("=3").is_err());
    }

    #[test]
    fn test_overrides_applied() {
        let translator = translator();
        let order = extract_order(round_trip_value(&translator)).unwrap();
        let overrides = OrderOverrides {
            order_id: Some("order-2025-11-26-061".into()),
            issued_by: Some("toysoldiers_ai_0".into()),
            narrator_profile: Some("drill_sergeant".into()),
            extra_fields: vec!["attempt=2".into()],
            ..Default::default()
        };
        let order = prepare_order(order, &overrides, &translator).unwrap();
        assert_eq!(order["order_id"], "order-2025-11-26-061");
        assert_eq!(order["issued_by"], "toysoldiers_ai_0");
        assert_eq!(order["metadata"]["narrator_profile"], "drill_sergeant");
        assert_eq!(order["attempt"], 2);
        assert!(order.get("priority").is_none());
    }

    #[test]
    fn test_schema_defaulted() {
        let translator = translator();
        let mut order = extract_order(round_trip_value(&translator)).unwrap();
        order.remove("schema");
        let order = prepare_order(order, &OrderOverrides::default(), &translator).unwrap();
        assert_eq!(order["schema"], "factory-order@1.0");
    }

    #[test]
    fn test_summary_override_is_rejected_with_findings() {
        let translator = translator();
        let order = extract_order(round_trip_value(&translator)).unwrap();
        let overrides = OrderOverrides {
            summary: Some("Ally shields everyone".into()),
            ..Default::default()
        };
        let err = prepare_order(order, &overrides, &translator).unwrap_err();
        let rejected = err.downcast_ref::<OrderRejected>().unwrap();
        assert_eq!(rejected.0.dq_errors.len(), 1);
        let message = err.to_string();
        assert!(message.contains("Data-quality errors:"));
        assert!(message.contains("  - Narration summary mismatch"));
    }

    #[test]
    fn test_emit_writes_and_dry_run_does_not() {
        let translator = translator();
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("spike.json");
        std::fs::write(&source, round_trip_value(&translator).to_string()).unwrap();

        let preview = dir.path().join("preview").join("order.json");
        let outcome = emit(&source, &preview, &OrderOverrides::default(), &translator, true).unwrap();
        assert!(outcome.written.is_none());
        assert!(!preview.exists());

        let destination = dir.path().join("outbox").join("order.json");
        let outcome =
            emit(&source, &destination, &OrderOverrides::default(), &translator, false).unwrap();
        assert_eq!(outcome.written.as_deref(), Some(destination.as_path()));
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&destination).unwrap()).unwrap();
        assert_eq!(written, outcome.order);
    }
}
