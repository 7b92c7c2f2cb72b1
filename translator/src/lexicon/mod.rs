//! Lexicon Module — categorized glyph vocabulary
//!
//! A lexicon source maps category names (`nouns`, `verbs`, `qualifiers`,
//! `outcomes`) to ordered glyph entries. Loading produces a [`GlyphIndex`]
//! that resolves both identifiers and emoji aliases to the same [`Glyph`].

pub mod glyph;
pub mod index;

pub use glyph::{title_case, Glyph, GlyphCategory};
pub use index::{DuplicatePolicy, GlyphIndex};
