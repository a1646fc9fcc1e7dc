//! Trait definitions for tokenizing engines.

use crate::config::Theme;
use crate::language::Language;

/// A highlighted run of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Source text (never contains a newline)
    pub text: String,

    /// Foreground color (`#rrggbb` or `#rrggbbaa`)
    pub color: String,
}

impl Token {
    pub fn new(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: color.into(),
        }
    }
}

/// Tokens for one source text in one theme.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightResult {
    /// One entry per source line
    pub tokens: Vec<Vec<Token>>,

    /// Block background color
    pub background_color: String,

    /// Default text color
    pub foreground_color: String,
}

/// Errors from a single highlighting call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum HighlightError {
    #[error("No grammar loaded for language '{0}'")]
    MissingGrammar(&'static str),

    #[error("No theme loaded for the {0} variant")]
    MissingTheme(&'static str),

    #[error("Tokenizer error: {0}")]
    Engine(String),
}

/// Errors that prevent an engine from being constructed.
///
/// Initialization failures are fatal for a transform pass.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InitError {
    #[error("Theme '{0}' is not available")]
    MissingTheme(String),

    #[error("No grammar available for language '{0}'")]
    MissingGrammar(&'static str),

    #[error("Engine failed to load: {0}")]
    Load(String),

    #[error("Engine initialization was aborted: {0}")]
    Aborted(String),
}

/// Trait for tokenizing engines.
pub trait Highlighter: Send + Sync {
    /// Engine identifier (e.g., "syntect")
    fn name(&self) -> &'static str;

    /// Tokenize `source` as `language` using the colors of `theme`.
    ///
    /// Must be free of observable side effects so that blocks can be
    /// highlighted concurrently.
    fn highlight(
        &self,
        source: &str,
        language: Language,
        theme: Theme,
    ) -> Result<HighlightResult, HighlightError>;
}
