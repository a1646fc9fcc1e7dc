//! Construction of themed code block nodes.
//!
//! Output shape:
//!
//! ```text
//! div.code-block[data-language][data-filename?][data-highlight-lines?]
//!   div.code-block-filename            (only with a filename)
//!   div.code-theme.light-active
//!     pre.code-highlighted[data-theme=light][style]
//!       code > span.line[data-line] > span[style]*
//!   div.code-theme.dark-active
//!     ...
//! ```

use folio_mdx::{Element, Node, ParsedMetadata};

use crate::config::Theme;
use crate::engine::{HighlightResult, Token};
use crate::language::Language;

pub const CODE_BLOCK_CLASS: &str = "code-block";
pub const FILENAME_CLASS: &str = "code-block-filename";
pub const THEME_CLASS: &str = "code-theme";
pub const HIGHLIGHTED_PRE_CLASS: &str = "code-highlighted";
pub const LINE_CLASS: &str = "line";
pub const ERROR_CLASS: &str = "code-block-error";

/// Attribute marking a `pre` as already highlighted output.
pub const THEME_ATTR: &str = "data-theme";

/// Build the replacement node for a highlighted code block.
pub fn code_block(
    language: Language,
    meta: &ParsedMetadata,
    light: &HighlightResult,
    dark: &HighlightResult,
) -> Element {
    let mut root = Element::new("div")
        .with_classes([CODE_BLOCK_CLASS])
        .with_attr("data-language", language.id());

    if let Some(filename) = &meta.filename {
        root = root
            .with_attr("data-filename", filename.as_str())
            .with_child(
                Element::new("div")
                    .with_classes([FILENAME_CLASS])
                    .with_child(Node::text(filename.as_str())),
            );
    }

    if !meta.highlight_lines.is_empty() {
        let lines: Vec<String> = meta.highlight_lines.iter().map(u32::to_string).collect();
        root = root.with_attr("data-highlight-lines", lines.join(","));
    }

    root.with_child(theme_container(Theme::Light, light, meta))
        .with_child(theme_container(Theme::Dark, dark, meta))
}

/// Wrap one theme's rendering in its marker container.
fn theme_container(theme: Theme, result: &HighlightResult, meta: &ParsedMetadata) -> Element {
    Element::new("div")
        .with_classes([THEME_CLASS, theme.marker_class()])
        .with_child(themed_pre(theme, result, meta))
}

fn themed_pre(theme: Theme, result: &HighlightResult, meta: &ParsedMetadata) -> Element {
    let lines: Vec<Node> = result
        .tokens
        .iter()
        .enumerate()
        .map(|(idx, tokens)| line(idx as u32 + 1, tokens, meta).into())
        .collect();

    Element::new("pre")
        .with_classes([HIGHLIGHTED_PRE_CLASS])
        .with_attr(THEME_ATTR, theme.as_str())
        .with_attr(
            "style",
            format!(
                "background-color: {}; color: {}",
                result.background_color, result.foreground_color
            ),
        )
        .with_child(Element::new("code").with_children(lines))
}

fn line(number: u32, tokens: &[Token], meta: &ParsedMetadata) -> Element {
    let mut line = Element::new("span")
        .with_classes([LINE_CLASS])
        .with_attr("data-line", number.to_string());

    if meta.is_highlighted(number) {
        line = line.with_flag("data-highlighted");
    }

    let spans: Vec<Node> = tokens
        .iter()
        .map(|token| {
            Element::new("span")
                .with_attr("style", format!("color: {}", token.color))
                .with_child(Node::text(token.text.as_str()))
                .into()
        })
        .collect();

    line.with_children(spans)
}

/// Inline diagnostic shown after a block that failed to highlight.
pub fn diagnostic(language: &str, error: &str) -> Element {
    let label = if language.is_empty() { "text" } else { language };
    Element::new("div")
        .with_classes([ERROR_CLASS])
        .with_attr("role", "alert")
        .with_child(Node::text(format!(
            "Failed to highlight {} code block: {}",
            label, error
        )))
}
