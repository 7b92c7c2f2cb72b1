//! Order Module — factory-order synthesis
//!
//! Turns an [`crate::intent::Intent`] into a `factory-order@1.0` payload:
//! narration summary, emoji chain, identifier-only intent and a synthetic
//! telemetry stub whose ritual and status come from [`SynthesisTables`].

pub mod payload;
pub mod synthesizer;
pub mod tables;

pub use payload::{FactoryOrder, TelemetryStub, FACTORY_ORDER_SCHEMA};
pub use synthesizer::{build_summary, summary_from_intent, OrderSynthesizer};
pub use tables::SynthesisTables;
