//! Translator error types
//!
//! Parsing-stage failures (lexicon loading, chain resolution, intent
//! derivation) are hard errors. Validation findings are data and live in
//! [`crate::validation::ValidationResult`] instead.

use thiserror::Error;

/// Result type alias for translator operations
pub type TranslatorResult<T> = Result<T, TranslatorError>;

/// Why a resolved chain cannot yield an intent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainDefect {
    /// No glyphs at all
    Empty,
    /// No glyph of category `nouns`
    MissingActor,
    /// No glyph of category `verbs`
    MissingAction,
}

impl std::fmt::Display for ChainDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "Glyph chain is empty"),
            Self::MissingActor => write!(f, "Glyph chain missing noun actor"),
            Self::MissingAction => write!(f, "Glyph chain missing verb"),
        }
    }
}

/// Errors that can occur while loading a lexicon or translating a chain
#[derive(Error, Debug)]
pub enum TranslatorError {
    /// Lexicon or synthesis-table source is malformed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A token has no lexicon entry
    #[error("Unknown glyph token: {token}")]
    UnknownGlyph { token: String },

    /// Chain resolved but cannot be turned into an intent
    #[error("{defect}")]
    MalformedChain { defect: ChainDefect },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TranslatorError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an unknown glyph error
    pub fn unknown_glyph(token: impl Into<String>) -> Self {
        Self::UnknownGlyph {
            token: token.into(),
        }
    }

    /// Create a malformed-chain error
    pub fn malformed(defect: ChainDefect) -> Self {
        Self::MalformedChain { defect }
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::UnknownGlyph { .. } => "UNKNOWN_GLYPH",
            Self::MalformedChain { .. } => "MALFORMED_CHAIN",
            Self::Json(_) => "JSON_ERROR",
        }
    }

    /// The chain defect, when this is a malformed-chain error
    pub fn chain_defect(&self) -> Option<ChainDefect> {
        match self {
            Self::MalformedChain { defect } => Some(*defect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TranslatorError::unknown_glyph("bogus_token");
        assert_eq!(err.to_string(), "Unknown glyph token: bogus_token");

        let err = TranslatorError::malformed(ChainDefect::MissingActor);
        assert_eq!(err.to_string(), "Glyph chain missing noun actor");

        let err = TranslatorError::configuration("nouns[0]: missing required field 'id'");
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            TranslatorError::configuration("x").code(),
            "CONFIGURATION_ERROR"
        );
        assert_eq!(TranslatorError::unknown_glyph("x").code(), "UNKNOWN_GLYPH");
        assert_eq!(
            TranslatorError::malformed(ChainDefect::Empty).code(),
            "MALFORMED_CHAIN"
        );
    }

    #[test]
    fn test_chain_defect_accessor() {
        let err = TranslatorError::malformed(ChainDefect::MissingAction);
        assert_eq!(err.chain_defect(), Some(ChainDefect::MissingAction));
        assert_eq!(TranslatorError::unknown_glyph("x").chain_defect(), None);
    }
}
