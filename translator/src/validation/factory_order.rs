//! Factory-order validator: schema pass, data-quality pass, round-trip
//! narration check.
//!
//! Works on raw JSON so payloads read back from storage can be checked no
//! matter how damaged they are. Both passes always run to completion.

use serde_json::{Map, Value};
use tracing::debug;

use super::report::{DataQualityRules, ValidationResult};
use super::telemetry::{check_record_dq, check_record_schema};
use crate::error::TranslatorResult;
use crate::lexicon::{Glyph, GlyphIndex};
use crate::order::{build_summary, FactoryOrder, FACTORY_ORDER_SCHEMA};

const STUB_LABEL: &str = "telemetry_stub";

/// Intent glyphs that resolved during the schema pass
#[derive(Debug, Default)]
struct ResolvedIntent<'g> {
    actor: Option<&'g Glyph>,
    action: Option<&'g Glyph>,
    target: Option<&'g Glyph>,
    outcome: Option<&'g Glyph>,
}

impl ResolvedIntent<'_> {
    /// Expected narration, when actor and action both resolved
    fn narration(&self) -> Option<String> {
        match (self.actor, self.action) {
            (Some(actor), Some(action)) => {
                Some(build_summary(actor, action, self.target, self.outcome))
            }
            _ => None,
        }
    }
}

/// Validates `factory-order@1.0` payloads against a lexicon
#[derive(Debug, Clone)]
pub struct OrderValidator<'g> {
    index: &'g GlyphIndex,
    rules: DataQualityRules,
}

impl<'g> OrderValidator<'g> {
    pub fn new(index: &'g GlyphIndex) -> Self {
        Self {
            index,
            rules: DataQualityRules::default(),
        }
    }

    pub fn with_rules(mut self, rules: DataQualityRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn rules(&self) -> &DataQualityRules {
        &self.rules
    }

    /// Validate a typed order
    pub fn validate_order(&self, order: &FactoryOrder) -> TranslatorResult<ValidationResult> {
        let value = serde_json::to_value(order)?;
        Ok(self.validate(&value))
    }

    /// Validate an arbitrary JSON payload, reporting every finding
    pub fn validate(&self, order: &Value) -> ValidationResult {
        let mut schema_errors = Vec::new();
        let mut dq_errors = Vec::new();

        let Some(fields) = order.as_object() else {
            schema_errors.push("Order must be a JSON object".to_string());
            return ValidationResult::from_errors(schema_errors, dq_errors);
        };

        if fields.get("schema").and_then(Value::as_str) != Some(FACTORY_ORDER_SCHEMA) {
            schema_errors.push(format!("Order schema must be '{FACTORY_ORDER_SCHEMA}'"));
        }

        let summary = match fields.get("summary") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => {
                schema_errors.push("Order summary must be a non-empty string".to_string());
                None
            }
        };

        match fields.get("glyph_chain") {
            Some(Value::Array(items)) if !items.is_empty() => {
                for (idx, item) in items.iter().enumerate() {
                    if !item.as_str().is_some_and(|s| !s.trim().is_empty()) {
                        schema_errors.push(format!("glyph_chain[{idx}] must be a non-empty string"));
                    }
                }
            }
            _ => schema_errors.push("glyph_chain must be a non-empty list".to_string()),
        }

        let resolved = match fields.get("intent") {
            Some(Value::Object(intent)) => self.check_intent(intent, &mut schema_errors),
            _ => {
                schema_errors.push("intent must be an object".to_string());
                ResolvedIntent::default()
            }
        };

        match fields.get(STUB_LABEL) {
            Some(Value::Object(stub)) => {
                check_record_schema(stub, STUB_LABEL, &mut schema_errors);
                check_record_dq(stub, STUB_LABEL, &self.rules, &mut dq_errors);
            }
            _ => schema_errors.push(format!("{STUB_LABEL} must be an object")),
        }

        if let (Some(expected), Some(summary)) = (resolved.narration(), summary) {
            if expected != summary {
                dq_errors.push(format!(
                    "Narration summary mismatch: expected '{expected}', got '{summary}'"
                ));
            }
        }

        let result = ValidationResult::from_errors(schema_errors, dq_errors);
        debug!(
            schema_errors = result.schema_errors.len(),
            dq_errors = result.dq_errors.len(),
            accepted = result.accepted,
            "Validated factory order"
        );
        result
    }

    fn check_intent(
        &self,
        intent: &Map<String, Value>,
        errors: &mut Vec<String>,
    ) -> ResolvedIntent<'g> {
        let resolved = ResolvedIntent {
            actor: self.reference(intent, "actor", true, errors),
            action: self.reference(intent, "action", true, errors),
            target: self.reference(intent, "target", false, errors),
            outcome: self.reference(intent, "outcome", false, errors),
        };

        match intent.get("qualifiers") {
            None => {}
            Some(Value::Array(qualifiers)) => {
                for (idx, qualifier) in qualifiers.iter().enumerate() {
                    match qualifier {
                        Value::String(id) if self.index.get_by_id(id).is_some() => {}
                        Value::String(_) => errors.push(format!(
                            "intent.qualifiers[{idx}] must reference a known glyph id"
                        )),
                        _ => errors.push(format!("intent.qualifiers[{idx}] must be a string")),
                    }
                }
            }
            Some(_) => errors.push("intent.qualifiers must be a list".to_string()),
        }

        resolved
    }

    /// Resolve one intent reference; null/absent is legal unless `required`
    fn reference(
        &self,
        intent: &Map<String, Value>,
        key: &str,
        required: bool,
        errors: &mut Vec<String>,
    ) -> Option<&'g Glyph> {
        match intent.get(key) {
            None | Some(Value::Null) => {
                if required {
                    errors.push(format!("intent.{key} must reference a known glyph id"));
                }
                None
            }
            Some(Value::String(id)) => {
                let glyph = self.index.get_by_id(id);
                if glyph.is_none() {
                    errors.push(if required {
                        format!("intent.{key} must reference a known glyph id")
                    } else {
                        format!("intent.{key} must reference a known glyph id or be null")
                    });
                }
                glyph
            }
            Some(_) => {
                errors.push(format!("intent.{key} must be a string or null"));
                None
            }
        }
    }
}

/// Check the optional `narration` block of a stored order.
///
/// `narration.line`, when it is a non-blank string, must match the non-blank
/// `summary` once both are trimmed. A missing block is accepted.
pub fn check_narration_line(order: &Value) -> ValidationResult {
    let mut schema_errors = Vec::new();
    let mut dq_errors = Vec::new();

    match order.get("narration") {
        None | Some(Value::Null) => {}
        Some(Value::Object(narration)) => match narration.get("line") {
            None | Some(Value::Null) => {}
            Some(Value::String(line)) => {
                let summary = order.get("summary").and_then(Value::as_str).map(str::trim);
                let line = line.trim();
                if let Some(summary) = summary.filter(|s| !s.is_empty()) {
                    if !line.is_empty() && summary != line {
                        dq_errors.push(
                            "Summary and narration.line mismatch even after normalization"
                                .to_string(),
                        );
                    }
                }
            }
            Some(_) => {
                schema_errors.push("narration.line must be a string when provided".to_string())
            }
        },
        Some(_) => schema_errors.push("narration must be an object when provided".to_string()),
    }

    ValidationResult::from_errors(schema_errors, dq_errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn index() -> GlyphIndex {
        GlyphIndex::from_value(&json!({
            "nouns": [{"id": "ally", "emoji": "🤝"}, {"id": "target", "emoji": "🎯"}],
            "verbs": [{"id": "shield", "emoji": "🛡️"}],
            "qualifiers": [{"id": "tempo", "emoji": "⏱️"}],
            "outcomes": [{"id": "victory", "emoji": "🏆"}]
        }))
        .unwrap()
    }

    fn valid_order() -> Value {
        json!({
            "schema": "factory-order@1.0",
            "summary": "Ally shields the Target → Victory",
            "glyph_chain": ["🤝", "🛡️", "🎯", "⏱️", "🏆"],
            "intent": {
                "actor": "ally",
                "action": "shield",
                "target": "target",
                "qualifiers": ["tempo"],
                "outcome": "victory"
            },
            "telemetry_stub": {
                "batch_id": "ally-shield-120000",
                "ritual": "purge",
                "units_processed": 5,
                "status": "success",
                "duration_ms": 1250
            }
        })
    }

    #[test]
    fn test_valid_order_accepted() {
        let index = index();
        let result = OrderValidator::new(&index).validate(&valid_order());
        assert!(result.accepted, "unexpected findings: {result:?}");
    }

    #[test]
    fn test_schema_and_dq_errors_aggregate() {
        let index = index();
        let mut order = valid_order();
        order.as_object_mut().unwrap().remove("summary");
        order["telemetry_stub"]["ritual"] = json!("invalid_value");

        let result = OrderValidator::new(&index).validate(&order);
        assert!(!result.accepted);
        assert_eq!(
            result.schema_errors,
            vec!["Order summary must be a non-empty string"]
        );
        assert_eq!(result.dq_errors.len(), 1);
        assert!(result.dq_errors[0].contains("ritual 'invalid_value'"));
    }

    #[test]
    fn test_summary_mismatch_is_single_dq_error() {
        let index = index();
        let mut order = valid_order();
        order["summary"] = json!("Ally shields the front → Victory");

        let result = OrderValidator::new(&index).validate(&order);
        assert!(result.schema_errors.is_empty());
        assert_eq!(
            result.dq_errors,
            vec![
                "Narration summary mismatch: expected 'Ally shields the Target → Victory', \
                 got 'Ally shields the front → Victory'"
            ]
        );
        assert!(!result.accepted);
    }

    #[test]
    fn test_unknown_references() {
        let index = index();
        let mut order = valid_order();
        order["intent"]["actor"] = json!("ghost");
        order["intent"]["target"] = json!("nowhere");
        order["intent"]["qualifiers"] = json!(["tempo", "mystery", 4]);

        let result = OrderValidator::new(&index).validate(&order);
        assert!(result
            .schema_errors
            .contains(&"intent.actor must reference a known glyph id".to_string()));
        assert!(result
            .schema_errors
            .contains(&"intent.target must reference a known glyph id or be null".to_string()));
        assert!(result
            .schema_errors
            .contains(&"intent.qualifiers[1] must reference a known glyph id".to_string()));
        assert!(result
            .schema_errors
            .contains(&"intent.qualifiers[2] must be a string".to_string()));
        // Incomplete intent: no narration comparison
        assert!(result.dq_errors.is_empty());
    }

    #[test]
    fn test_null_optional_references_are_legal() {
        let index = index();
        let mut order = valid_order();
        order["intent"]["target"] = Value::Null;
        order["intent"]["outcome"] = Value::Null;
        order["intent"].as_object_mut().unwrap().remove("qualifiers");
        order["summary"] = json!("Ally shields the front → Result");

        let result = OrderValidator::new(&index).validate(&order);
        assert!(result.accepted, "unexpected findings: {result:?}");
    }

    #[test]
    fn test_wrong_types_report_blocking_error_only() {
        let index = index();
        let mut order = valid_order();
        order["intent"]["action"] = json!(12);
        order["intent"]["qualifiers"] = json!("tempo");
        order["telemetry_stub"]["ritual"] = json!(3);

        let result = OrderValidator::new(&index).validate(&order);
        assert!(result
            .schema_errors
            .contains(&"intent.action must be a string or null".to_string()));
        assert!(result
            .schema_errors
            .contains(&"intent.qualifiers must be a list".to_string()));
        assert!(result
            .schema_errors
            .contains(&"telemetry_stub: ritual must be string".to_string()));
        assert!(result.dq_errors.is_empty());
    }

    #[test]
    fn test_badly_malformed_payload_reports_everything() {
        let index = index();
        let order = json!({
            "schema": "factory-order@0.9",
            "glyph_chain": [],
            "intent": "ally shield",
            "telemetry_stub": []
        });
        let result = OrderValidator::new(&index).validate(&order);
        assert_eq!(
            result.schema_errors,
            vec![
                "Order schema must be 'factory-order@1.0'",
                "Order summary must be a non-empty string",
                "glyph_chain must be a non-empty list",
                "intent must be an object",
                "telemetry_stub must be an object",
            ]
        );
        assert!(result.dq_errors.is_empty());
    }

    #[test]
    fn test_glyph_chain_entries() {
        let index = index();
        let mut order = valid_order();
        order["glyph_chain"] = json!(["🤝", "", 7]);
        let result = OrderValidator::new(&index).validate(&order);
        assert_eq!(
            result.schema_errors,
            vec![
                "glyph_chain[1] must be a non-empty string",
                "glyph_chain[2] must be a non-empty string",
            ]
        );
    }

    #[test]
    fn test_non_object_payload() {
        let index = index();
        let result = OrderValidator::new(&index).validate(&json!(["not", "an", "order"]));
        assert_eq!(result.schema_errors, vec!["Order must be a JSON object"]);
    }

    #[test]
    fn test_custom_rules() {
        let index = index();
        let mut rules = DataQualityRules::default();
        rules.duration_max_ms = 1000;
        let result = OrderValidator::new(&index)
            .with_rules(rules)
            .validate(&valid_order());
        assert_eq!(
            result.dq_errors,
            vec!["telemetry_stub: duration_ms 1250 outside range [0, 1000]"]
        );
    }

    #[test]
    fn test_narration_line_matches_after_trim() {
        let mut order = valid_order();
        assert!(check_narration_line(&order).accepted);

        let summary = order["summary"].as_str().unwrap().to_string();
        order["narration"] = json!({"line": format!("  {summary}\n")});
        assert!(check_narration_line(&order).accepted);

        order["narration"] = json!({"line": "   "});
        assert!(check_narration_line(&order).accepted);
    }

    #[test]
    fn test_narration_line_mismatch_and_types() {
        let mut order = valid_order();
        order["narration"] = json!({"line": "Someone else entirely"});
        let result = check_narration_line(&order);
        assert!(result.schema_errors.is_empty());
        assert_eq!(
            result.dq_errors,
            vec!["Summary and narration.line mismatch even after normalization"]
        );

        order["narration"] = json!({"line": 7});
        assert_eq!(
            check_narration_line(&order).schema_errors,
            vec!["narration.line must be a string when provided"]
        );

        order["narration"] = json!("Ally shields the Target");
        assert_eq!(
            check_narration_line(&order).schema_errors,
            vec!["narration must be an object when provided"]
        );
    }
}
