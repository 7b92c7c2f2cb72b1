//! Playtest Module — emoji command-layer telemetry
//!
//! Wheel bindings, per-run event capture and the aggregate summary written
//! after a tutorial run.

pub mod script;
pub mod telemetry;
pub mod wheel;

pub use script::{TutorialScript, TutorialStep};
pub use telemetry::{
    ids_to_glyphs, percentile, CommandEvent, CommandRequest, CommandTelemetry, LatencySample,
    PlaytestEvent, PlaytestSummary, RunStamp, PLAYTEST_TELEMETRY_SCHEMA,
};
pub use wheel::{WheelBindings, WheelSlot};
