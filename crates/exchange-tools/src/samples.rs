//! Sample glyph files: `{"glyphs": [...]}`.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Tokens from a sample file; non-string items are stringified.
pub fn load_glyphs_from_file(path: &Path) -> Result<Vec<String>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read sample file {}", path.display()))?;
    let payload: Value = serde_json::from_str(&source)
        .with_context(|| format!("Sample file {} is invalid JSON", path.display()))?;

    let glyphs = match payload.get("glyphs") {
        Some(Value::Array(items)) if !items.is_empty() => items,
        _ => bail!("Sample file missing glyph list"),
    };
    Ok(glyphs
        .iter()
        .map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect())
}
