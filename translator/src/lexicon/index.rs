//! Dual-key glyph index built from a categorized lexicon source.
//!
//! Source shape: `{ "<category>": [ { "id": .., "emoji": .., "label"?: .., ...extras } ] }`.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use tracing::debug;

use super::glyph::{Glyph, GlyphCategory};
use crate::error::{TranslatorError, TranslatorResult};

/// How to treat two entries that claim the same identifier or alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Fail loading with a configuration error
    #[default]
    Reject,
    /// The later entry replaces every glyph it collides with
    LastWins,
}

/// Lookup structure mapping both identifier and emoji to the same glyph.
///
/// Never mutated after construction, so a shared reference can be used from
/// any number of threads.
#[derive(Debug, Clone, Default)]
pub struct GlyphIndex {
    glyphs: Vec<Glyph>,
    by_token: HashMap<String, usize>,
    by_id: BTreeMap<String, usize>,
}

impl GlyphIndex {
    /// Parse a lexicon JSON document with the default duplicate policy
    pub fn from_json_str(source: &str) -> TranslatorResult<Self> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| TranslatorError::configuration(format!("invalid lexicon JSON: {e}")))?;
        Self::from_value(&value)
    }

    pub fn from_value(source: &Value) -> TranslatorResult<Self> {
        Self::from_value_with_policy(source, DuplicatePolicy::default())
    }

    /// Build an index from a parsed lexicon source.
    ///
    /// Categories load in document order, so under
    /// [`DuplicatePolicy::LastWins`] the entry written last in the file wins.
    pub fn from_value_with_policy(
        source: &Value,
        policy: DuplicatePolicy,
    ) -> TranslatorResult<Self> {
        let categories = source.as_object().ok_or_else(|| {
            TranslatorError::configuration("lexicon source must be an object of categories")
        })?;

        let mut glyphs = Vec::new();
        for (name, entries) in categories {
            let category = GlyphCategory::from_source_name(name).ok_or_else(|| {
                TranslatorError::configuration(format!("unknown glyph category '{name}'"))
            })?;
            let entries = entries.as_array().ok_or_else(|| {
                TranslatorError::configuration(format!("category '{name}' must be a list"))
            })?;
            for (idx, entry) in entries.iter().enumerate() {
                glyphs.push(parse_entry(category, idx, entry)?);
            }
        }

        Self::from_glyphs(glyphs, policy)
    }

    /// Build an index from already constructed glyphs, in load order
    pub fn from_glyphs(
        glyphs: impl IntoIterator<Item = Glyph>,
        policy: DuplicatePolicy,
    ) -> TranslatorResult<Self> {
        let mut index = Self::default();
        for glyph in glyphs {
            index.insert(glyph, policy)?;
        }

        debug!(
            glyphs = index.len(),
            nouns = index.count(GlyphCategory::Noun),
            verbs = index.count(GlyphCategory::Verb),
            qualifiers = index.count(GlyphCategory::Qualifier),
            outcomes = index.count(GlyphCategory::Outcome),
            "Loaded glyph lexicon"
        );
        Ok(index)
    }

    fn insert(&mut self, glyph: Glyph, policy: DuplicatePolicy) -> TranslatorResult<()> {
        let mut colliding: Vec<usize> = Vec::new();
        if let Some(&slot) = self.by_id.get(&glyph.identifier) {
            colliding.push(slot);
        }
        for token in tokens_of(&glyph) {
            if let Some(&slot) = self.by_token.get(token) {
                if !colliding.contains(&slot) {
                    colliding.push(slot);
                }
            }
        }

        if let Some(&slot) = colliding.first() {
            match policy {
                DuplicatePolicy::Reject => {
                    let existing = &self.glyphs[slot];
                    return Err(TranslatorError::configuration(
                        if existing.identifier == glyph.identifier {
                            format!(
                                "duplicate glyph id '{}' in {} and {}",
                                glyph.identifier, existing.category, glyph.category
                            )
                        } else {
                            format!(
                                "glyph '{}' reuses a token already claimed by '{}'",
                                glyph.identifier, existing.identifier
                            )
                        },
                    ));
                }
                DuplicatePolicy::LastWins => {
                    for slot in colliding {
                        self.evict(slot);
                    }
                }
            }
        }

        let slot = self.glyphs.len();
        for token in tokens_of(&glyph) {
            self.by_token.insert(token.to_string(), slot);
        }
        self.by_id.insert(glyph.identifier.clone(), slot);
        self.glyphs.push(glyph);
        Ok(())
    }

    fn evict(&mut self, slot: usize) {
        let evicted = &self.glyphs[slot];
        debug!(id = %evicted.identifier, "Glyph replaced by later lexicon entry");
        self.by_id.remove(&evicted.identifier);
        self.by_token.retain(|_, s| *s != slot);
    }

    /// Look a glyph up by identifier or emoji
    pub fn get(&self, token: &str) -> Option<&Glyph> {
        self.by_token.get(token).map(|&slot| &self.glyphs[slot])
    }

    /// Look a glyph up by identifier only
    pub fn get_by_id(&self, identifier: &str) -> Option<&Glyph> {
        self.by_id.get(identifier).map(|&slot| &self.glyphs[slot])
    }

    /// Live glyphs in identifier order
    pub fn glyphs(&self) -> impl Iterator<Item = &Glyph> {
        self.by_id.values().map(|&slot| &self.glyphs[slot])
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Number of live glyphs in a category
    pub fn count(&self, category: GlyphCategory) -> usize {
        self.glyphs().filter(|g| g.is(category)).count()
    }
}

fn tokens_of(glyph: &Glyph) -> impl Iterator<Item = &str> {
    let emoji = (glyph.emoji != glyph.identifier).then_some(glyph.emoji.as_str());
    std::iter::once(glyph.identifier.as_str()).chain(emoji)
}

fn parse_entry(category: GlyphCategory, idx: usize, entry: &Value) -> TranslatorResult<Glyph> {
    let at = format!("{category}[{idx}]");
    let fields = entry
        .as_object()
        .ok_or_else(|| TranslatorError::configuration(format!("{at}: entry must be an object")))?;

    let identifier = required_str(fields, "id", &at)?;
    let emoji = required_str(fields, "emoji", &at)?;
    let mut glyph = Glyph::new(category, identifier, emoji);

    match fields.get("label") {
        None | Some(Value::Null) => {}
        Some(Value::String(label)) => glyph.label = label.clone(),
        Some(_) => {
            return Err(TranslatorError::configuration(format!(
                "{at}: field 'label' must be a string"
            )))
        }
    }

    let extras: Map<String, Value> = fields
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "id" | "emoji" | "label"))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Ok(glyph.with_extras(extras))
}

fn required_str<'a>(fields: &'a Map<String, Value>, key: &str, at: &str) -> TranslatorResult<&'a str> {
    match fields.get(key) {
        None => Err(TranslatorError::configuration(format!(
            "{at}: missing required field '{key}'"
        ))),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.as_str()),
        Some(_) => Err(TranslatorError::configuration(format!(
            "{at}: field '{key}' must be a non-empty string"
        ))),
    }
}
