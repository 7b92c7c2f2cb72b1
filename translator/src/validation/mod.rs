//! Validation Module — two-tier payload checks
//!
//! Factory orders go through a schema pass (presence, types, glyph
//! references) and a data-quality pass (telemetry thresholds, narration
//! round-trip). Findings are aggregated into a [`ValidationResult`].
//! Stored orders can also be checked for a `narration.line` that drifted from
//! the summary, and telemetry batch exports get the same record checks as the
//! embedded stub.
//! Exchange payloads (`signal-ack`, `field-report`) are checked fail-fast.

pub mod exchange;
pub mod factory_order;
pub mod report;
pub mod telemetry;

pub use exchange::{validate_exchange_payload, ExchangeSchema, ExchangeSchemaError};
pub use factory_order::{check_narration_line, OrderValidator};
pub use report::{DataQualityRules, ValidationResult};
pub use telemetry::{validate_telemetry_dq, validate_telemetry_export, validate_telemetry_schema};
