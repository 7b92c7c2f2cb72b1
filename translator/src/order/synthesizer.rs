//! Payload synthesis: intent to factory order.

use chrono::{DateTime, Utc};

use super::payload::{FactoryOrder, TelemetryStub, FACTORY_ORDER_SCHEMA};
use super::tables::SynthesisTables;
use crate::chain::render_emoji;
use crate::error::{ChainDefect, TranslatorError, TranslatorResult};
use crate::intent::{Intent, IntentIds};
use crate::lexicon::{Glyph, GlyphIndex};

const BASE_DURATION_MS: u64 = 1000;
const QUALIFIER_DURATION_MS: u64 = 250;

/// Narration for an order.
///
/// The exact format is load-bearing: the validator regenerates it from the
/// stored intent and compares verbatim.
pub fn build_summary(
    actor: &Glyph,
    action: &Glyph,
    target: Option<&Glyph>,
    outcome: Option<&Glyph>,
) -> String {
    let target_text = target.map_or("front", |g| g.label.as_str());
    let outcome_text = outcome.map_or("Result", |g| g.label.as_str());
    format!(
        "{} {}s the {} → {}",
        actor.label,
        action.label.to_lowercase(),
        target_text,
        outcome_text
    )
}

/// Regenerate the narration from identifier-only intent.
///
/// Target and outcome ids that do not resolve are narrated as absent.
pub fn summary_from_intent(intent: &IntentIds, index: &GlyphIndex) -> TranslatorResult<String> {
    let actor = index
        .get_by_id(&intent.actor)
        .ok_or_else(|| TranslatorError::malformed(ChainDefect::MissingActor))?;
    let action = index
        .get_by_id(&intent.action)
        .ok_or_else(|| TranslatorError::malformed(ChainDefect::MissingAction))?;
    let target = intent.target.as_deref().and_then(|id| index.get_by_id(id));
    let outcome = intent.outcome.as_deref().and_then(|id| index.get_by_id(id));
    Ok(build_summary(actor, action, target, outcome))
}

/// Builds factory orders using injected lookup tables
#[derive(Debug, Clone, Default)]
pub struct OrderSynthesizer {
    tables: SynthesisTables,
}

impl OrderSynthesizer {
    pub fn new(tables: SynthesisTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &SynthesisTables {
        &self.tables
    }

    /// Derive the downstream payload for a chain and its intent.
    ///
    /// Deterministic apart from `issued_at`, which only feeds the batch id.
    pub fn synthesize(
        &self,
        chain: &[&Glyph],
        intent: &Intent<'_>,
        issued_at: DateTime<Utc>,
    ) -> FactoryOrder {
        let actor = intent.actor;
        let action = intent.action;
        let outcome_id = intent.outcome.map(|g| g.identifier.as_str());

        let telemetry_stub = TelemetryStub {
            batch_id: format!(
                "{}-{}-{}",
                actor.identifier,
                action.identifier,
                issued_at.format("%H%M%S")
            ),
            ritual: self.tables.ritual_for(&action.identifier).to_string(),
            units_processed: chain.len().max(1) as u64,
            status: self.tables.status_for(outcome_id).to_string(),
            duration_ms: BASE_DURATION_MS + QUALIFIER_DURATION_MS * intent.qualifiers.len() as u64,
        };

        FactoryOrder {
            schema: FACTORY_ORDER_SCHEMA.to_string(),
            summary: build_summary(actor, action, intent.target, intent.outcome),
            glyph_chain: render_emoji(chain),
            intent: intent.ids(),
            telemetry_stub,
        }
    }
}
