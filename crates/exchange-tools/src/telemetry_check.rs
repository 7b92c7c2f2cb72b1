//! Checks of exported telemetry batch files (`{"batches": [...]}`).

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::debug;
use translator::validation::{validate_telemetry_export, DataQualityRules};
use translator::ValidationResult;

/// Load an export and run the record schema and data-quality checks over it
pub fn check_export(path: &Path, rules: &DataQualityRules) -> Result<ValidationResult> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let export: Value = serde_json::from_str(&source)
        .with_context(|| format!("{} is invalid JSON", path.display()))?;
    let result = validate_telemetry_export(&export, rules);
    debug!(path = %path.display(), result = %result.summary(), "Checked telemetry export");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(ritual: &str) -> Value {
        json!({
            "batch_id": "ally-shield-060000",
            "ritual": ritual,
            "units_processed": 3,
            "status": "success",
            "duration_ms": 1000
        })
    }

    #[test]
    fn test_clean_and_failing_exports() {
        let dir = tempfile::tempdir().unwrap();
        let rules = DataQualityRules::default();

        let clean = dir.path().join("clean.json");
        std::fs::write(&clean, json!({"batches": [record("purge"), record("drill")]}).to_string())
            .unwrap();
        assert!(check_export(&clean, &rules).unwrap().accepted);

        let failing = dir.path().join("failing.json");
        std::fs::write(&failing, json!({"batches": [record("juggle")]}).to_string()).unwrap();
        let result = check_export(&failing, &rules).unwrap();
        assert!(!result.accepted);
        assert!(result.dq_errors[0].starts_with("Record 0: ritual 'juggle' not in"));
    }

    #[test]
    fn test_unreadable_export_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let rules = DataQualityRules::default();
        assert!(check_export(&dir.path().join("absent.json"), &rules).is_err());

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{").unwrap();
        let err = check_export(&broken, &rules).unwrap_err();
        assert!(err.to_string().contains("is invalid JSON"));
    }
}
