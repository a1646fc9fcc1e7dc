//! Tokenizing engine backed by `syntect`.

use std::collections::HashMap;

use syntect::easy::HighlightLines;
use syntect::highlighting::{Color, Theme as SyntectTheme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use crate::config::{HighlightConfig, Theme};
use crate::engine::{HighlightError, HighlightResult, Highlighter, InitError, Token};
use crate::language::Language;

/// Highlighter holding the syntax set and both themes.
///
/// Grammars for every configured language are resolved when the engine is
/// loaded, so highlighting never needs to load anything.
pub struct SyntectHighlighter {
    syntaxes: SyntaxSet,
    themes: HashMap<Theme, SyntectTheme>,
    /// Syntax name per language
    grammars: HashMap<Language, String>,
}

impl SyntectHighlighter {
    /// Load the bundled syntaxes and themes for `config`.
    pub fn load(config: &HighlightConfig) -> Result<Self, InitError> {
        let syntaxes = SyntaxSet::load_defaults_newlines();
        let mut theme_set = ThemeSet::load_defaults();

        let mut themes = HashMap::new();
        for theme in Theme::ALL {
            let name = config.theme_name(theme);
            let loaded = theme_set
                .themes
                .remove(name)
                .ok_or_else(|| InitError::MissingTheme(name.to_string()))?;
            themes.insert(theme, loaded);
        }

        let mut grammars = HashMap::new();
        let languages = config
            .supported_languages
            .iter()
            .chain(std::iter::once(&config.fallback_language));
        for &language in languages {
            let syntax = find_grammar(&syntaxes, language)
                .ok_or(InitError::MissingGrammar(language.id()))?;
            grammars.insert(language, syntax.name.clone());
        }

        tracing::debug!(
            "Loaded syntect with {} grammars ({} / {})",
            grammars.len(),
            config.themes.light,
            config.themes.dark
        );

        Ok(Self {
            syntaxes,
            themes,
            grammars,
        })
    }
}

impl Highlighter for SyntectHighlighter {
    fn name(&self) -> &'static str {
        "syntect"
    }

    fn highlight(
        &self,
        source: &str,
        language: Language,
        theme: Theme,
    ) -> Result<HighlightResult, HighlightError> {
        let syntax = self
            .grammars
            .get(&language)
            .and_then(|name| self.syntaxes.find_syntax_by_name(name))
            .ok_or(HighlightError::MissingGrammar(language.id()))?;
        let theme_def = self
            .themes
            .get(&theme)
            .ok_or(HighlightError::MissingTheme(theme.as_str()))?;

        let mut highlighter = HighlightLines::new(syntax, theme_def);
        let mut tokens = Vec::new();

        for line in LinesWithEndings::from(strip_final_newline(source)) {
            let ranges = highlighter
                .highlight_line(line, &self.syntaxes)
                .map_err(|e| HighlightError::Engine(e.to_string()))?;

            let row = ranges
                .into_iter()
                .filter_map(|(style, text)| {
                    let text = text.trim_end_matches(|c| c == '\n' || c == '\r');
                    (!text.is_empty()).then(|| Token::new(text, to_hex(style.foreground)))
                })
                .collect();
            tokens.push(row);
        }

        if tokens.is_empty() {
            tokens.push(Vec::new());
        }

        Ok(HighlightResult {
            tokens,
            background_color: to_hex(theme_def.settings.background.unwrap_or(Color::WHITE)),
            foreground_color: to_hex(theme_def.settings.foreground.unwrap_or(Color::BLACK)),
        })
    }
}

/// Languages without a bundled grammar of their own borrow the closest one.
///
/// syntect's default set has no TypeScript or JSX grammar, so those blocks are
/// colored by the JavaScript grammar while `data-language` keeps the requested
/// id. Token colors are approximate for them; only the block shape is fixed.
fn grammar_token(language: Language) -> &'static str {
    match language {
        Language::JavaScript | Language::TypeScript | Language::Jsx | Language::Tsx => "js",
        Language::Json => "json",
        Language::Html => "html",
        Language::Css => "css",
        Language::Bash | Language::Shell => "sh",
        Language::Python => "py",
        Language::Rust => "rs",
        Language::Go => "go",
        Language::Java => "java",
        Language::C => "c",
        Language::Cpp => "cpp",
        Language::Sql => "sql",
        Language::Yaml => "yaml",
        Language::Markdown => "md",
        Language::Diff => "diff",
        Language::PlainText => "txt",
    }
}

fn find_grammar(syntaxes: &SyntaxSet, language: Language) -> Option<&SyntaxReference> {
    match language {
        Language::PlainText => Some(syntaxes.find_syntax_plain_text()),
        other => syntaxes.find_syntax_by_token(grammar_token(other)),
    }
}

/// A trailing newline would otherwise produce an empty last line.
fn strip_final_newline(source: &str) -> &str {
    let source = source.strip_suffix('\n').unwrap_or(source);
    source.strip_suffix('\r').unwrap_or(source)
}

fn to_hex(color: Color) -> String {
    if color.a == 0xff {
        format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
    } else {
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            color.r, color.g, color.b, color.a
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeNames;

    fn line_text(line: &[Token]) -> String {
        line.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn loads_every_supported_language() {
        let engine = SyntectHighlighter::load(&HighlightConfig::DEFAULT).unwrap();
        assert_eq!(engine.grammars.len(), Language::SUPPORTED.len());
        assert_eq!(engine.name(), "syntect");
    }

    #[test]
    fn tokens_reconstruct_source_lines() {
        let engine = SyntectHighlighter::load(&HighlightConfig::DEFAULT).unwrap();

        let result = engine
            .highlight("const x = 1;\nconst y = 2;\n", Language::TypeScript, Theme::Light)
            .unwrap();

        assert_eq!(result.tokens.len(), 2);
        assert_eq!(line_text(&result.tokens[0]), "const x = 1;");
        assert_eq!(line_text(&result.tokens[1]), "const y = 2;");
        assert!(result
            .tokens
            .iter()
            .flatten()
            .all(|t| t.color.starts_with('#')));
    }

    #[test]
    fn themes_have_different_backgrounds() {
        let engine = SyntectHighlighter::load(&HighlightConfig::DEFAULT).unwrap();

        let light = engine.highlight("fn main() {}", Language::Rust, Theme::Light).unwrap();
        let dark = engine.highlight("fn main() {}", Language::Rust, Theme::Dark).unwrap();

        assert_ne!(light.background_color, dark.background_color);
        assert_eq!(line_text(&light.tokens[0]), line_text(&dark.tokens[0]));
    }

    #[test]
    fn empty_source_yields_one_empty_line() {
        let engine = SyntectHighlighter::load(&HighlightConfig::DEFAULT).unwrap();

        let result = engine.highlight("", Language::PlainText, Theme::Dark).unwrap();

        assert_eq!(result.tokens, vec![Vec::<Token>::new()]);
    }

    #[test]
    fn keeps_blank_lines_inside_source() {
        let engine = SyntectHighlighter::load(&HighlightConfig::DEFAULT).unwrap();

        let result = engine
            .highlight("a = 1\n\nb = 2\n", Language::Python, Theme::Light)
            .unwrap();

        assert_eq!(result.tokens.len(), 3);
        assert!(result.tokens[1].is_empty());
    }

    #[test]
    fn unknown_theme_fails_to_load() {
        let config = HighlightConfig {
            themes: ThemeNames {
                light: "InspiredGitHub",
                dark: "no-such-theme",
            },
            ..HighlightConfig::DEFAULT
        };

        let result = SyntectHighlighter::load(&config);

        assert!(matches!(result, Err(InitError::MissingTheme(name)) if name == "no-such-theme"));
    }

    #[test]
    fn formats_colors() {
        assert_eq!(to_hex(Color { r: 255, g: 0, b: 16, a: 255 }), "#ff0010");
        assert_eq!(to_hex(Color { r: 0, g: 0, b: 0, a: 128 }), "#00000080");
    }
}
