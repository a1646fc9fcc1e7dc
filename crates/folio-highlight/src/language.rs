//! Supported languages and resolution of fence language identifiers.

use crate::config::{HighlightConfig, Mode};

/// A language with a loaded grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    TypeScript,
    Jsx,
    Tsx,
    Json,
    Html,
    Css,
    Bash,
    Shell,
    Python,
    Rust,
    Go,
    Java,
    C,
    Cpp,
    Sql,
    Yaml,
    Markdown,
    Diff,
    /// No highlighting
    PlainText,
}

impl Language {
    /// Every supported language, fallback included.
    pub const SUPPORTED: &'static [Language] = &[
        Self::JavaScript,
        Self::TypeScript,
        Self::Jsx,
        Self::Tsx,
        Self::Json,
        Self::Html,
        Self::Css,
        Self::Bash,
        Self::Shell,
        Self::Python,
        Self::Rust,
        Self::Go,
        Self::Java,
        Self::C,
        Self::Cpp,
        Self::Sql,
        Self::Yaml,
        Self::Markdown,
        Self::Diff,
        Self::PlainText,
    ];

    /// Identifier as written on a code fence.
    pub fn id(&self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Jsx => "jsx",
            Self::Tsx => "tsx",
            Self::Json => "json",
            Self::Html => "html",
            Self::Css => "css",
            Self::Bash => "bash",
            Self::Shell => "shell",
            Self::Python => "python",
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Java => "java",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Sql => "sql",
            Self::Yaml => "yaml",
            Self::Markdown => "markdown",
            Self::Diff => "diff",
            Self::PlainText => "text",
        }
    }

    /// Look up a language by its exact identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::SUPPORTED.iter().copied().find(|lang| lang.id() == id)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Outcome of resolving a requested language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Language that will actually be used
    pub language: Language,

    /// Whether the request was replaced by the fallback language
    pub used_fallback: bool,
}

impl Resolution {
    /// Identifier of the effective language.
    pub fn effective(&self) -> &'static str {
        self.language.id()
    }
}

/// Resolve a fence language identifier against the supported set.
///
/// Unsupported identifiers are downgraded to the fallback language. In
/// development mode the downgrade is logged as a warning.
pub fn resolve(requested: &str, mode: Mode) -> Resolution {
    let config = HighlightConfig::DEFAULT;

    if let Some(language) = Language::from_id(requested) {
        if config.supported_languages.contains(&language) {
            return Resolution {
                language,
                used_fallback: false,
            };
        }
    }

    let fallback = config.fallback_language;
    if requested.is_empty() {
        tracing::debug!("Code block has no language, using {}", fallback);
    } else if mode.is_development() {
        tracing::warn!(
            "Language '{}' is not supported, falling back to {}",
            requested,
            fallback
        );
    } else {
        tracing::debug!("Unsupported language '{}' -> {}", requested, fallback);
    }

    Resolution {
        language: fallback,
        used_fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_language_is_unchanged() {
        let resolved = resolve("typescript", Mode::Development);
        assert_eq!(resolved.effective(), "typescript");
        assert!(!resolved.used_fallback);
    }

    #[test]
    fn unsupported_language_falls_back() {
        let resolved = resolve("brainfuck", Mode::Production);
        assert_eq!(resolved.language, Language::PlainText);
        assert_eq!(resolved.effective(), "text");
        assert!(resolved.used_fallback);
    }

    #[test]
    fn empty_language_falls_back() {
        let resolved = resolve("", Mode::Development);
        assert_eq!(resolved.language, Language::PlainText);
        assert!(resolved.used_fallback);
    }

    #[test]
    fn identifiers_are_exact() {
        assert_eq!(Language::from_id("tsx"), Some(Language::Tsx));
        assert_eq!(Language::from_id("TSX"), None);
        assert_eq!(Language::from_id("ts"), None);
    }

    #[test]
    fn ids_round_trip_for_every_language() {
        for lang in Language::SUPPORTED {
            assert_eq!(Language::from_id(lang.id()), Some(*lang));
        }
    }

    #[test]
    fn fallback_itself_resolves_without_fallback() {
        let resolved = resolve("text", Mode::Development);
        assert_eq!(resolved.language, Language::PlainText);
        assert!(!resolved.used_fallback);
    }
}
