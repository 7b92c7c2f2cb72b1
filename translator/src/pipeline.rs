//! Translation pipeline: resolve → derive → synthesize → validate.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::chain::{render_emoji, resolve_chain};
use crate::error::TranslatorResult;
use crate::intent::{derive_intent, IntentIds};
use crate::lexicon::GlyphIndex;
use crate::order::{FactoryOrder, OrderSynthesizer};
use crate::validation::{OrderValidator, ValidationResult};

/// Everything a caller gets back for one translated chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTrip {
    /// RFC 3339 UTC, `Z` suffix
    pub timestamp: String,
    pub glyphs: Vec<String>,
    pub intent: IntentIds,
    pub payload: FactoryOrder,
    pub validation: ValidationResult,
}

/// Owns a lexicon and a synthesizer; translation never mutates either
#[derive(Debug, Clone)]
pub struct Translator {
    index: GlyphIndex,
    synthesizer: OrderSynthesizer,
}

impl Translator {
    pub fn new(index: GlyphIndex, synthesizer: OrderSynthesizer) -> Self {
        Self { index, synthesizer }
    }

    pub fn index(&self) -> &GlyphIndex {
        &self.index
    }

    pub fn synthesizer(&self) -> &OrderSynthesizer {
        &self.synthesizer
    }

    pub fn translate<S: AsRef<str>>(&self, tokens: &[S]) -> TranslatorResult<RoundTrip> {
        self.translate_at(tokens, Utc::now())
    }

    /// Translate with an explicit clock reading.
    ///
    /// Parsing-stage failures (unknown token, missing actor or verb) abort
    /// before any payload exists. Validation findings never fail the call.
    pub fn translate_at<S: AsRef<str>>(
        &self,
        tokens: &[S],
        now: DateTime<Utc>,
    ) -> TranslatorResult<RoundTrip> {
        let chain = resolve_chain(tokens, &self.index)?;
        let intent = derive_intent(&chain)?;
        let payload = self.synthesizer.synthesize(&chain, &intent, now);
        let validation = OrderValidator::new(&self.index).validate_order(&payload)?;

        debug!(
            actor = %intent.actor.identifier,
            action = %intent.action.identifier,
            glyphs = chain.len(),
            validation = %validation.summary(),
            "Translated glyph chain"
        );

        Ok(RoundTrip {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Secs, true),
            glyphs: render_emoji(&chain),
            intent: intent.ids(),
            payload,
            validation,
        })
    }

    /// Standalone check of a payload read back from storage
    pub fn validate(&self, payload: &Value) -> ValidationResult {
        OrderValidator::new(&self.index).validate(payload)
    }
}
