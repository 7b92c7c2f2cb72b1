//! Validation Result — structured findings from a validation run
//!
//! Findings are data, never errors: a result always carries every
//! structural (schema) and semantic (data-quality) violation found.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub const ALLOWED_RITUALS: [&str; 5] = ["forge", "drill", "parade", "purge", "promote"];
pub const ALLOWED_STATUSES: [&str; 3] = ["success", "warning", "error"];
pub const DURATION_MIN_MS: i64 = 0;
/// Five minutes
pub const DURATION_MAX_MS: i64 = 300_000;

/// Outcome of validating one payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Structural violations (presence, types, references)
    pub schema_errors: Vec<String>,
    /// Semantic violations (thresholds, enumerations, narration consistency)
    pub dq_errors: Vec<String>,
    /// True iff both lists are empty
    pub accepted: bool,
}

impl ValidationResult {
    pub fn from_errors(schema_errors: Vec<String>, dq_errors: Vec<String>) -> Self {
        let accepted = schema_errors.is_empty() && dq_errors.is_empty();
        Self {
            schema_errors,
            dq_errors,
            accepted,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted
    }

    pub fn error_count(&self) -> usize {
        self.schema_errors.len() + self.dq_errors.len()
    }

    /// Fold another result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        self.schema_errors.extend(other.schema_errors);
        self.dq_errors.extend(other.dq_errors);
        self.accepted = self.schema_errors.is_empty() && self.dq_errors.is_empty();
    }

    /// One-line summary for logs
    pub fn summary(&self) -> String {
        if self.accepted {
            "accepted".to_string()
        } else {
            format!(
                "rejected: {} schema error(s), {} data-quality error(s)",
                self.schema_errors.len(),
                self.dq_errors.len()
            )
        }
    }
}

/// Data-quality thresholds applied to telemetry records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityRules {
    pub allowed_rituals: BTreeSet<String>,
    pub allowed_statuses: BTreeSet<String>,
    pub duration_min_ms: i64,
    pub duration_max_ms: i64,
}

impl Default for DataQualityRules {
    fn default() -> Self {
        Self {
            allowed_rituals: ALLOWED_RITUALS.iter().map(|s| s.to_string()).collect(),
            allowed_statuses: ALLOWED_STATUSES.iter().map(|s| s.to_string()).collect(),
            duration_min_ms: DURATION_MIN_MS,
            duration_max_ms: DURATION_MAX_MS,
        }
    }
}

impl DataQualityRules {
    pub fn ritual_allowed(&self, ritual: &str) -> bool {
        self.allowed_rituals.contains(ritual)
    }

    pub fn status_allowed(&self, status: &str) -> bool {
        self.allowed_statuses.contains(status)
    }

    /// Inclusive on both ends
    pub fn duration_in_range(&self, duration_ms: i64) -> bool {
        (self.duration_min_ms..=self.duration_max_ms).contains(&duration_ms)
    }
}
