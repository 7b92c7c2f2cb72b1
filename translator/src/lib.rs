//! Glyph-chain translator
//!
//! Parses ordered emoji/identifier tokens against a categorized lexicon into
//! an intent (actor, action, target, qualifiers, outcome), synthesizes a
//! `factory-order@1.0` payload from it and re-validates that payload with a
//! schema pass, a data-quality pass and a narration round-trip check.
//!
//! # Modules
//!
//! - [`lexicon`] - glyph vocabulary and the dual-key [`GlyphIndex`]
//! - [`chain`] - token resolution
//! - [`intent`] - actor/action/target/qualifier/outcome derivation
//! - [`order`] - factory-order synthesis
//! - [`validation`] - schema and data-quality checks
//! - [`pipeline`] - [`Translator`] tying the stages together
//! - [`playtest`] - emoji command telemetry for tutorial runs

pub mod chain;
pub mod error;
pub mod intent;
pub mod lexicon;
pub mod order;
pub mod pipeline;
pub mod playtest;
pub mod validation;

pub use error::{ChainDefect, TranslatorError, TranslatorResult};
pub use intent::{derive_intent, Intent, IntentIds};
pub use lexicon::{DuplicatePolicy, Glyph, GlyphCategory, GlyphIndex};
pub use order::{FactoryOrder, OrderSynthesizer, SynthesisTables, TelemetryStub};
pub use pipeline::{RoundTrip, Translator};
pub use validation::{validate_exchange_payload, OrderValidator, ValidationResult};
