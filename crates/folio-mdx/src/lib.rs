//! MDX article parser with frontmatter and fence metadata parsing.
//!
//! This crate turns MDX articles into a [`Document`] tree, extracts YAML
//! frontmatter, parses code fence metadata (highlighted lines, filenames) and
//! serializes trees back to HTML.

pub mod codeblock;
pub mod frontmatter;
pub mod parser;
pub mod render;
pub mod tree;

pub use codeblock::{parse_metadata, split_info, CodeBlockRequest, ParsedMetadata};
pub use frontmatter::Frontmatter;
pub use parser::{parse_mdx, slugify, ParseError, ParsedDoc, TocEntry};
pub use render::{render_html, render_node};
pub use tree::{Document, Element, Node, PropertyValue};
