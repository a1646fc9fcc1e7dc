//! MDX document parser.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::codeblock::split_info;
use crate::frontmatter::{extract_frontmatter, Frontmatter, FrontmatterError};
use crate::tree::{Document, Element, Node};

/// A parsed MDX document.
#[derive(Debug, Clone)]
pub struct ParsedDoc {
    /// Parsed frontmatter (if present)
    pub frontmatter: Option<Frontmatter>,

    /// Markdown content (without frontmatter)
    pub content: String,

    /// Document tree built from the content
    pub tree: Document,

    /// Table of contents entries
    pub toc: Vec<TocEntry>,
}

/// A table of contents entry.
#[derive(Debug, Clone, PartialEq)]
pub struct TocEntry {
    /// Heading text
    pub title: String,
    /// Anchor ID
    pub id: String,
    /// Heading level (1-6)
    pub level: u8,
}

/// Errors that can occur when parsing MDX.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Frontmatter error: {0}")]
    Frontmatter(#[from] FrontmatterError),
}

/// Parse an MDX document.
///
/// Extracts frontmatter, builds the document tree and generates a table of contents.
/// Fenced code blocks become `pre > code` pairs: the language is carried as a
/// `language-<id>` class and the rest of the fence line as the `meta` property.
pub fn parse_mdx(source: &str) -> Result<ParsedDoc, ParseError> {
    let (frontmatter, content) = extract_frontmatter(source)?;

    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut builder = TreeBuilder::default();
    for event in Parser::new_ext(content, options) {
        builder.push_event(event);
    }
    let (tree, toc) = builder.finish();

    Ok(ParsedDoc {
        frontmatter,
        content: content.to_string(),
        tree,
        toc,
    })
}

/// Assembles tree nodes from a flat event stream.
#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    stack: Vec<Element>,
    toc: Vec<TocEntry>,
    in_table_head: bool,
}

impl TreeBuilder {
    fn push_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.append_text(&text),
            Event::Code(text) => {
                self.append(Element::new("code").with_child(Node::text(text.to_string())).into());
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.append(Node::raw(html.to_string()));
            }
            Event::SoftBreak => self.append_text("\n"),
            Event::HardBreak => self.append(Element::new("br").into()),
            Event::Rule => self.append(Element::new("hr").into()),
            Event::TaskListMarker(checked) => {
                let mut input = Element::new("input")
                    .with_attr("type", "checkbox")
                    .with_flag("disabled");
                if checked {
                    input = input.with_flag("checked");
                }
                self.append(input.into());
            }
            Event::FootnoteReference(label) => {
                let link = Element::new("a")
                    .with_attr("href", format!("#fn-{}", label))
                    .with_child(Node::text(label.to_string()));
                self.append(Element::new("sup").with_child(link).into());
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let element = match tag {
            Tag::Paragraph => Element::new("p"),
            Tag::Heading { level, id, .. } => {
                let mut heading = Element::new(format!("h{}", level as u8));
                if let Some(id) = id {
                    heading = heading.with_attr("id", id.to_string());
                }
                heading
            }
            Tag::BlockQuote(_) => Element::new("blockquote"),
            Tag::CodeBlock(kind) => {
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(info) = kind {
                    let (language, meta) = split_info(&info);
                    if !language.is_empty() {
                        code = code.with_classes([format!("language-{}", language)]);
                    }
                    if !meta.is_empty() {
                        code = code.with_attr("meta", meta);
                    }
                }
                self.stack.push(Element::new("pre"));
                code
            }
            Tag::List(Some(start)) if start != 1 => {
                Element::new("ol").with_attr("start", start.to_string())
            }
            Tag::List(Some(_)) => Element::new("ol"),
            Tag::List(None) => Element::new("ul"),
            Tag::Item => Element::new("li"),
            Tag::FootnoteDefinition(label) => Element::new("div")
                .with_classes(["footnote-definition"])
                .with_attr("id", format!("fn-{}", label)),
            Tag::Table(_) => Element::new("table"),
            Tag::TableHead => {
                self.in_table_head = true;
                self.stack.push(Element::new("thead"));
                Element::new("tr")
            }
            Tag::TableRow => Element::new("tr"),
            Tag::TableCell => Element::new(if self.in_table_head { "th" } else { "td" }),
            Tag::Emphasis => Element::new("em"),
            Tag::Strong => Element::new("strong"),
            Tag::Strikethrough => Element::new("del"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut link = Element::new("a").with_attr("href", dest_url.to_string());
                if !title.is_empty() {
                    link = link.with_attr("title", title.to_string());
                }
                link
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut image = Element::new("img").with_attr("src", dest_url.to_string());
                if !title.is_empty() {
                    image = image.with_attr("title", title.to_string());
                }
                image
            }
            // Containers without an element of their own; children are spliced
            // into the parent when the fragment closes.
            _ => Element::default(),
        };
        self.stack.push(element);
    }

    fn end(&mut self, tag: TagEnd) {
        let Some(mut element) = self.stack.pop() else {
            return;
        };

        match tag {
            TagEnd::Heading(level) => {
                let title = element.text_content();
                let id = match element.attr("id").map(str::to_string) {
                    Some(id) => id,
                    None => {
                        let id = slugify(&title);
                        element = element.with_attr("id", id.clone());
                        id
                    }
                };
                self.toc.push(TocEntry {
                    title,
                    id,
                    level: level as u8,
                });
            }
            TagEnd::Image => {
                let alt = element.text_content();
                element.children.clear();
                element = element.with_attr("alt", alt);
            }
            TagEnd::CodeBlock | TagEnd::TableHead => {
                // Close the inner element, then its wrapper (`pre` / `thead`).
                self.in_table_head = false;
                if let Some(mut wrapper) = self.stack.pop() {
                    wrapper.children.push(element.into());
                    element = wrapper;
                }
            }
            _ => {}
        }

        if element.tag.is_empty() {
            for child in element.children {
                self.append(child);
            }
        } else {
            self.append(element.into());
        }
    }

    fn append(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.root.push(node),
        }
    }

    fn append_text(&mut self, text: &str) {
        let children = match self.stack.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.root,
        };
        if let Some(Node::Text { value }) = children.last_mut() {
            value.push_str(text);
        } else {
            children.push(Node::text(text));
        }
    }

    fn finish(mut self) -> (Document, Vec<TocEntry>) {
        // Unbalanced input: flush whatever is still open.
        while let Some(element) = self.stack.pop() {
            self.append(element.into());
        }
        (Document::new(self.root), self.toc)
    }
}

/// Convert a heading to a URL-safe slug.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
