//! Glyph records and their closed category set.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Vocabulary category of a glyph.
///
/// Serialized with the category names used by lexicon sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GlyphCategory {
    #[serde(rename = "nouns")]
    Noun,
    #[serde(rename = "verbs")]
    Verb,
    #[serde(rename = "qualifiers")]
    Qualifier,
    #[serde(rename = "outcomes")]
    Outcome,
}

impl GlyphCategory {
    pub const ALL: [GlyphCategory; 4] = [Self::Noun, Self::Verb, Self::Qualifier, Self::Outcome];

    /// Category name as it appears in a lexicon source
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noun => "nouns",
            Self::Verb => "verbs",
            Self::Qualifier => "qualifiers",
            Self::Outcome => "outcomes",
        }
    }

    /// Parse a lexicon source category name
    pub fn from_source_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl std::fmt::Display for GlyphCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single vocabulary unit.
///
/// Built once when the lexicon loads and only handed out by shared reference
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    pub category: GlyphCategory,
    /// Stable symbolic id, unique within the lexicon
    pub identifier: String,
    /// Display token, also accepted as an input alias
    pub emoji: String,
    pub label: String,
    /// Category-specific metadata, passed through untouched
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extras: Map<String, Value>,
}

impl Glyph {
    /// Create a glyph whose label defaults to the title-cased identifier
    pub fn new(
        category: GlyphCategory,
        identifier: impl Into<String>,
        emoji: impl Into<String>,
    ) -> Self {
        let identifier = identifier.into();
        Self {
            category,
            label: title_case(&identifier),
            identifier,
            emoji: emoji.into(),
            extras: Map::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_extras(mut self, extras: Map<String, Value>) -> Self {
        self.extras = extras;
        self
    }

    pub fn is(&self, category: GlyphCategory) -> bool {
        self.category == category
    }
}

/// Title-case an identifier: the first letter of every run of cased letters
/// is upper-cased and the rest lower-cased (`fast_forge` -> `Fast_Forge`).
/// Uncased characters, including letters without case, end a run.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_cased = false;
    for ch in text.chars() {
        let cased = ch.is_lowercase() || ch.is_uppercase();
        if !cased {
            out.push(ch);
        } else if prev_cased {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_cased = cased;
    }
    out
}
