use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;
use translator::{GlyphIndex, OrderSynthesizer, SynthesisTables, Translator};

/// Level-0 lexicon shipped with the tools; used when no lexicon path is set.
pub const BUILTIN_LEXICON: &str = include_str!("../lexicon/glyph_lexicon_level0.json");

pub const DEFAULT_ROUND_TRIP_LOG: &str = "logs/translator_round_trips.jsonl";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_ATTACHMENTS_DIR: &str = "exchange/outbox/attachments/campaign2";

/// Paths used by the exchange tools.
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    /// Lexicon JSON (None = built-in level-0 lexicon)
    pub lexicon_path: Option<PathBuf>,
    /// JSONL file receiving one line per translation
    pub round_trip_log: PathBuf,
    /// TOML overrides for ritual/status tables (optional)
    pub tables_path: Option<PathBuf>,
    /// Playtest event log and telemetry summary
    pub log_dir: PathBuf,
    /// Mirror of the playtest outputs for the exchange outbox
    pub attachments_dir: PathBuf,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            lexicon_path: std::env::var("EXCHANGE_LEXICON_PATH").ok().map(PathBuf::from),
            round_trip_log: std::env::var("EXCHANGE_ROUND_TRIP_LOG")
                .unwrap_or_else(|_| DEFAULT_ROUND_TRIP_LOG.into())
                .into(),
            tables_path: std::env::var("EXCHANGE_TABLES_PATH").ok().map(PathBuf::from),
            log_dir: std::env::var("EXCHANGE_LOG_DIR")
                .unwrap_or_else(|_| DEFAULT_LOG_DIR.into())
                .into(),
            attachments_dir: std::env::var("EXCHANGE_ATTACHMENTS_DIR")
                .unwrap_or_else(|_| DEFAULT_ATTACHMENTS_DIR.into())
                .into(),
        }
    }
}

impl ExchangeConfig {
    /// Load the lexicon index from disk or from the built-in copy.
    pub fn load_index(&self) -> Result<GlyphIndex> {
        let index = match &self.lexicon_path {
            Some(path) => {
                let source = read_to_string(path, "lexicon")?;
                GlyphIndex::from_json_str(&source)
                    .with_context(|| format!("Failed to load lexicon {}", path.display()))?
            }
            None => GlyphIndex::from_json_str(BUILTIN_LEXICON)
                .context("Built-in lexicon is malformed")?,
        };
        info!(
            glyphs = index.len(),
            source = %self.lexicon_path.as_deref().map_or("builtin".into(), |p| p.display().to_string()),
            "Lexicon loaded"
        );
        Ok(index)
    }

    /// Synthesis tables, defaulting to the contract tables.
    pub fn load_tables(&self) -> Result<SynthesisTables> {
        match &self.tables_path {
            Some(path) => {
                let source = read_to_string(path, "synthesis tables")?;
                SynthesisTables::from_toml_str(&source)
                    .with_context(|| format!("Failed to load tables {}", path.display()))
            }
            None => Ok(SynthesisTables::default()),
        }
    }

    pub fn translator(&self) -> Result<Translator> {
        Ok(Translator::new(
            self.load_index()?,
            OrderSynthesizer::new(self.load_tables()?),
        ))
    }
}

fn read_to_string(path: &Path, what: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {what} file {}", path.display()))
}
