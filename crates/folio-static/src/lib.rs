//! Static site generator for folio articles.
//!
//! Builds a static blog from MDX articles with dual-theme highlighted code blocks.

pub mod assets;
pub mod builder;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, StaticBuilder};
