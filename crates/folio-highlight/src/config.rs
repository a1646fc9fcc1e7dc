//! Fixed highlighting configuration: themes, supported languages and build mode.

use crate::language::Language;

/// Color theme a code block is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Both themes, in output order.
    pub const ALL: [Theme; 2] = [Theme::Light, Theme::Dark];

    /// Short identifier used in markup.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Marker class that lets a stylesheet show exactly one theme container.
    pub fn marker_class(&self) -> &'static str {
        match self {
            Self::Light => "light-active",
            Self::Dark => "dark-active",
        }
    }
}

/// Engine theme names for the light and dark variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeNames {
    pub light: &'static str,
    pub dark: &'static str,
}

/// Highlighting configuration.
///
/// These are build constants; [`HighlightConfig::DEFAULT`] is what the shared
/// provider is loaded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightConfig {
    /// Languages a grammar is loaded for up front
    pub supported_languages: &'static [Language],

    /// Theme names passed to the engine
    pub themes: ThemeNames,

    /// Substituted when a requested language is unsupported
    pub fallback_language: Language,
}

impl HighlightConfig {
    pub const DEFAULT: HighlightConfig = HighlightConfig {
        supported_languages: Language::SUPPORTED,
        themes: ThemeNames {
            light: "InspiredGitHub",
            dark: "base16-ocean.dark",
        },
        fallback_language: Language::PlainText,
    };

    /// Engine theme name for a theme variant.
    pub fn theme_name(&self, theme: Theme) -> &'static str {
        match theme {
            Theme::Light => self.themes.light,
            Theme::Dark => self.themes.dark,
        }
    }
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Build mode. Development surfaces diagnostics inline; production degrades silently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Development,
    #[default]
    Production,
}

impl Mode {
    /// Environment variable consulted by [`Mode::from_env`].
    pub const ENV_VAR: &'static str = "FOLIO_ENV";

    /// Read the mode from `FOLIO_ENV` (`development`/`dev`), defaulting to production.
    pub fn from_env() -> Self {
        std::env::var(Self::ENV_VAR)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}
