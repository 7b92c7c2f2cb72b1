//! Factory-order payload records (`factory-order@1.0`).

use serde::{Deserialize, Serialize};

use crate::intent::IntentIds;

pub const FACTORY_ORDER_SCHEMA: &str = "factory-order@1.0";

/// Synthetic operational record embedded in every order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryStub {
    pub batch_id: String,
    pub ritual: String,
    pub units_processed: u64,
    pub status: String,
    pub duration_ms: u64,
}

/// Downstream payload derived from a glyph chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactoryOrder {
    pub schema: String,
    /// Narration regenerated by the validator's round-trip check
    pub summary: String,
    pub glyph_chain: Vec<String>,
    pub intent: IntentIds,
    pub telemetry_stub: TelemetryStub,
}
