//! Intent derivation: semantic roles from a resolved glyph chain.
//!
//! Roles are assigned by category and position:
//! - actor: first noun of the chain
//! - action: first verb of the chain
//! - target: first noun of the remainder (chain minus the actor and action positions)
//! - qualifiers: every qualifier of the remainder, in order
//! - outcome: last outcome of the *full* chain

use serde::{Deserialize, Serialize};

use crate::error::{ChainDefect, TranslatorError, TranslatorResult};
use crate::lexicon::{Glyph, GlyphCategory};

/// Role assignment over glyphs borrowed from the lexicon
#[derive(Debug, Clone, PartialEq)]
pub struct Intent<'g> {
    pub actor: &'g Glyph,
    pub action: &'g Glyph,
    pub target: Option<&'g Glyph>,
    pub qualifiers: Vec<&'g Glyph>,
    pub outcome: Option<&'g Glyph>,
}

impl Intent<'_> {
    /// Identifier-only form used in payloads and round-trip records
    pub fn ids(&self) -> IntentIds {
        IntentIds {
            actor: self.actor.identifier.clone(),
            action: self.action.identifier.clone(),
            target: self.target.map(|g| g.identifier.clone()),
            qualifiers: self
                .qualifiers
                .iter()
                .map(|g| g.identifier.clone())
                .collect(),
            outcome: self.outcome.map(|g| g.identifier.clone()),
        }
    }
}

/// Serializable intent, glyphs referenced by identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentIds {
    pub actor: String,
    pub action: String,
    pub target: Option<String>,
    #[serde(default)]
    pub qualifiers: Vec<String>,
    pub outcome: Option<String>,
}

/// Derive an intent from a resolved chain.
///
/// Fails when the chain is empty, has no noun, or has no verb (checked in
/// that order).
pub fn derive_intent<'g>(chain: &[&'g Glyph]) -> TranslatorResult<Intent<'g>> {
    if chain.is_empty() {
        return Err(TranslatorError::malformed(ChainDefect::Empty));
    }

    let mut actor_pos = None;
    let mut action_pos = None;
    for (pos, glyph) in chain.iter().enumerate() {
        match glyph.category {
            GlyphCategory::Noun if actor_pos.is_none() => actor_pos = Some(pos),
            GlyphCategory::Verb if action_pos.is_none() => action_pos = Some(pos),
            GlyphCategory::Noun
            | GlyphCategory::Verb
            | GlyphCategory::Qualifier
            | GlyphCategory::Outcome => {}
        }
    }
    let actor_pos =
        actor_pos.ok_or_else(|| TranslatorError::malformed(ChainDefect::MissingActor))?;
    let action_pos =
        action_pos.ok_or_else(|| TranslatorError::malformed(ChainDefect::MissingAction))?;

    let mut target = None;
    let mut qualifiers = Vec::new();
    let remainder = chain
        .iter()
        .enumerate()
        .filter(|(pos, _)| *pos != actor_pos && *pos != action_pos)
        .map(|(_, glyph)| *glyph);
    for glyph in remainder {
        match glyph.category {
            GlyphCategory::Noun => {
                if target.is_none() {
                    target = Some(glyph);
                }
            }
            GlyphCategory::Qualifier => qualifiers.push(glyph),
            GlyphCategory::Verb | GlyphCategory::Outcome => {}
        }
    }

    // Scans the full chain, not the remainder; categories are disjoint in
    // practice so actor/action never double as the outcome.
    let outcome = chain
        .iter()
        .rev()
        .find(|glyph| glyph.is(GlyphCategory::Outcome))
        .copied();

    Ok(Intent {
        actor: chain[actor_pos],
        action: chain[action_pos],
        target,
        qualifiers,
        outcome,
    })
}
