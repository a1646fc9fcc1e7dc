//! Dual-theme syntax highlighting for fenced code blocks.
//!
//! This crate provides the build-time pass that finds fenced code blocks in a
//! [`folio_mdx::Document`], highlights them for a light and a dark theme, and
//! replaces each one with markup a stylesheet can toggle between.

pub mod config;
pub mod engine;
pub mod language;
pub mod markup;
pub mod provider;
pub mod syntect_engine;
pub mod transform;

pub use config::{HighlightConfig, Mode, Theme, ThemeNames};
pub use engine::{HighlightError, HighlightResult, Highlighter, InitError, Token};
pub use language::{resolve, Language, Resolution};
pub use provider::{shared, HighlighterHandle, HighlighterProvider};
pub use syntect_engine::SyntectHighlighter;
pub use transform::{
    locate_code_blocks, CodeBlockTransformer, LocatedBlock, TransformError, TransformOptions,
    TransformReport,
};
