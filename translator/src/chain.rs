//! Chain resolution: tokens to glyphs, fail-fast.

use tracing::debug;

use crate::error::{TranslatorError, TranslatorResult};
use crate::lexicon::{Glyph, GlyphIndex};

/// Resolve each token through the index, preserving order.
///
/// Stops at the first token with no lexicon entry; nothing after it is
/// looked at and no partial chain is returned.
pub fn resolve_chain<'g, S: AsRef<str>>(
    tokens: &[S],
    index: &'g GlyphIndex,
) -> TranslatorResult<Vec<&'g Glyph>> {
    let mut resolved = Vec::with_capacity(tokens.len());
    for token in tokens {
        let token = token.as_ref();
        match index.get(token) {
            Some(glyph) => resolved.push(glyph),
            None => {
                debug!(token, position = resolved.len(), "Unknown glyph token");
                return Err(TranslatorError::unknown_glyph(token));
            }
        }
    }
    Ok(resolved)
}

/// Emoji rendering of a resolved chain
pub fn render_emoji(chain: &[&Glyph]) -> Vec<String> {
    chain.iter().map(|glyph| glyph.emoji.clone()).collect()
}
