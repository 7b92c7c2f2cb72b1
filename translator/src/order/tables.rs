//! Verb→ritual and outcome→status lookup tables.
//!
//! Injected into [`super::OrderSynthesizer`] at construction. `Default` holds
//! the contract tables; a TOML document can replace any of them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{TranslatorError, TranslatorResult};

pub const DEFAULT_RITUAL: &str = "forge";
pub const DEFAULT_STATUS: &str = "success";
/// Outcome assumed when a chain carries none
pub const IMPLIED_OUTCOME: &str = "victory";

const VERB_RITUALS: [(&str, &str); 8] = [
    ("craft", "forge"),
    ("launch", "parade"),
    ("grow", "promote"),
    ("shield", "purge"),
    ("weave", "forge"),
    ("loop", "drill"),
    ("deliver", "promote"),
    ("transmute", "forge"),
];

const OUTCOME_STATUSES: [(&str, &str); 8] = [
    ("victory", "success"),
    ("risk", "warning"),
    ("sleep", "warning"),
    ("rise", "success"),
    ("chaos", "error"),
    ("blessing", "success"),
    ("pause", "warning"),
    ("repeat", "warning"),
];

/// Lookup tables used to synthesize the telemetry stub.
///
/// Tables or defaults omitted from a TOML override keep their contract value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisTables {
    /// Action identifier → ritual
    pub rituals: BTreeMap<String, String>,
    /// Outcome identifier → status
    pub statuses: BTreeMap<String, String>,
    pub default_ritual: String,
    pub default_status: String,
    pub implied_outcome: String,
}

impl Default for SynthesisTables {
    fn default() -> Self {
        Self {
            rituals: to_table(&VERB_RITUALS),
            statuses: to_table(&OUTCOME_STATUSES),
            default_ritual: DEFAULT_RITUAL.to_string(),
            default_status: DEFAULT_STATUS.to_string(),
            implied_outcome: IMPLIED_OUTCOME.to_string(),
        }
    }
}

impl SynthesisTables {
    /// Parse table overrides from TOML
    pub fn from_toml_str(source: &str) -> TranslatorResult<Self> {
        toml::from_str(source).map_err(|e| {
            TranslatorError::configuration(format!("invalid synthesis tables: {e}"))
        })
    }

    /// Ritual for an action identifier, falling back to the default ritual
    pub fn ritual_for(&self, action: &str) -> &str {
        self.rituals
            .get(action)
            .map(String::as_str)
            .unwrap_or(self.default_ritual.as_str())
    }

    /// Status for an outcome identifier; no outcome means the implied one
    pub fn status_for(&self, outcome: Option<&str>) -> &str {
        let outcome = outcome.unwrap_or(self.implied_outcome.as_str());
        self.statuses
            .get(outcome)
            .map(String::as_str)
            .unwrap_or(self.default_status.as_str())
    }
}

fn to_table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
