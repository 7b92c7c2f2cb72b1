//! Exchange tooling around the glyph translator.
//!
//! File-level collaborators the translator core leaves to callers: lexicon
//! and table loading, the round-trip log, sample glyph files, the
//! factory-order emitter, exchange payload checks, the stored-order monitor,
//! telemetry export checks and the campaign playtest simulation.

pub mod config;
pub mod emitter;
pub mod exchange_check;
pub mod order_monitor;
pub mod playtest_writer;
pub mod round_trip_log;
pub mod samples;
pub mod telemetry_check;

pub use config::ExchangeConfig;
