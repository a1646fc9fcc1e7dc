//! Build-time pass that replaces fenced code blocks with themed, highlighted nodes.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use rayon::prelude::*;

use folio_mdx::{parse_metadata, CodeBlockRequest, Document, Element, Node};

use crate::config::{Mode, Theme};
use crate::engine::{HighlightError, Highlighter, InitError};
use crate::language::resolve;
use crate::markup::{self, ERROR_CLASS, THEME_ATTR};
use crate::provider::{HighlighterHandle, HighlighterProvider};

/// Properties the upstream parser may use to carry fence metadata.
const META_PROPERTIES: &[&str] = &["meta", "metastring", "data-meta"];

/// Options for a transform pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    /// Development builds insert inline diagnostics for failed blocks
    pub mode: Mode,
}

/// Counts of what a transform pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    /// Blocks replaced with highlighted output
    pub highlighted: usize,

    /// Blocks left unmodified because highlighting failed
    pub failed: usize,

    /// Blocks whose language was downgraded to the fallback
    pub fallbacks: usize,
}

/// Errors that abort a whole transform pass.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("Highlighter initialization failed: {0}")]
    Init(#[from] InitError),

    #[error("Highlighting task failed: {0}")]
    Task(String),
}

/// A code block found in the tree, addressed by its index path.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedBlock {
    pub path: Vec<usize>,
    pub request: CodeBlockRequest,
}

struct BlockOutcome {
    language: &'static str,
    used_fallback: bool,
    result: Result<Element, HighlightError>,
}

/// Replaces every fenced code block of a document with highlighted markup.
pub struct CodeBlockTransformer<'a, H> {
    provider: &'a HighlighterProvider<H>,
    options: TransformOptions,
}

impl<'a, H: Highlighter + 'static> CodeBlockTransformer<'a, H> {
    /// Create a transformer drawing its engine from `provider`.
    pub fn new(provider: &'a HighlighterProvider<H>, options: TransformOptions) -> Self {
        Self { provider, options }
    }

    /// Transform `doc` in place.
    ///
    /// Fails only when the highlighter cannot be initialized; in that case the
    /// tree is left untouched. A block that fails to highlight keeps its
    /// original node, followed by a diagnostic in development mode.
    pub async fn transform(&self, doc: &mut Document) -> Result<TransformReport, TransformError> {
        let handle = self.provider.handle().await?;

        let located = locate_code_blocks(doc);
        if located.is_empty() {
            return Ok(TransformReport::default());
        }

        let (paths, requests): (Vec<_>, Vec<_>) = located
            .into_iter()
            .map(|block| (block.path, block.request))
            .unzip();

        let mode = self.options.mode;
        let outcomes = tokio::task::spawn_blocking(move || {
            requests
                .par_iter()
                .map(|request| highlight_block(&handle, request, mode))
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|e| TransformError::Task(e.to_string()))?;

        Ok(splice(doc, paths, outcomes, mode))
    }
}

/// Find every fenced code block in document order.
///
/// A block is a `pre` element whose only child is a `code` element. Output of
/// a previous pass is never matched: neither a `pre` with a theme marker nor a
/// block already followed by a failure diagnostic. Matched blocks are not
/// searched further.
pub fn locate_code_blocks(doc: &Document) -> Vec<LocatedBlock> {
    let mut found = Vec::new();
    let mut path = Vec::new();
    walk(&doc.children, &mut path, &mut found);
    found
}

fn walk(nodes: &[Node], path: &mut Vec<usize>, found: &mut Vec<LocatedBlock>) {
    for (idx, node) in nodes.iter().enumerate() {
        let Node::Element(el) = node else {
            continue;
        };

        path.push(idx);
        match code_block_request(el) {
            Some(_) if has_diagnostic(nodes.get(idx + 1)) => {}
            Some(request) => found.push(LocatedBlock {
                path: path.clone(),
                request,
            }),
            None => walk(&el.children, path, found),
        }
        path.pop();
    }
}

fn has_diagnostic(next: Option<&Node>) -> bool {
    next.and_then(Node::as_element)
        .is_some_and(|el| el.tag == "div" && el.has_class(ERROR_CLASS))
}

/// Extract a request if `pre` has the fenced code block shape.
pub fn code_block_request(pre: &Element) -> Option<CodeBlockRequest> {
    if pre.tag != "pre" || pre.has_attr(THEME_ATTR) || pre.children.len() != 1 {
        return None;
    }

    let code = pre.children[0].as_element().filter(|el| el.tag == "code")?;

    let language = code
        .classes()
        .into_iter()
        .find_map(|class| class.strip_prefix("language-"))
        .unwrap_or_default()
        .to_string();

    let raw_metadata = META_PROPERTIES
        .iter()
        .find_map(|name| code.attr(name))
        .unwrap_or_default()
        .to_string();

    Some(CodeBlockRequest {
        language,
        source_text: code.text_content(),
        raw_metadata,
    })
}

fn highlight_block<H: Highlighter>(
    handle: &HighlighterHandle<H>,
    request: &CodeBlockRequest,
    mode: Mode,
) -> BlockOutcome {
    let meta = parse_metadata(&request.raw_metadata);
    let resolution = resolve(&request.language, mode);

    let highlight = || -> Result<Element, HighlightError> {
        let light = handle.highlight(&request.source_text, resolution.language, Theme::Light)?;
        let dark = handle.highlight(&request.source_text, resolution.language, Theme::Dark)?;
        Ok(markup::code_block(resolution.language, &meta, &light, &dark))
    };

    // A panicking engine fails this block only.
    let result = panic::catch_unwind(AssertUnwindSafe(highlight))
        .unwrap_or_else(|payload| Err(HighlightError::Engine(panic_message(payload))));

    BlockOutcome {
        language: resolution.effective(),
        used_fallback: resolution.used_fallback,
        result,
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => message.to_string(),
            Err(_) => "engine panicked".to_string(),
        },
    }
}

/// Apply outcomes to the tree.
///
/// Paths are applied last-first so that inserting a diagnostic never shifts a
/// path that has yet to be applied.
fn splice(
    doc: &mut Document,
    paths: Vec<Vec<usize>>,
    outcomes: Vec<BlockOutcome>,
    mode: Mode,
) -> TransformReport {
    let mut report = TransformReport::default();

    for (path, outcome) in paths.into_iter().zip(outcomes).rev() {
        if outcome.used_fallback {
            report.fallbacks += 1;
        }

        let Some((siblings, idx)) = doc.siblings_mut(&path) else {
            tracing::warn!("Code block at {:?} disappeared before splicing", path);
            continue;
        };

        match outcome.result {
            Ok(replacement) => {
                siblings[idx] = replacement.into();
                report.highlighted += 1;
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to highlight {} code block, leaving it unhighlighted: {}",
                    outcome.language,
                    e
                );
                if mode.is_development() {
                    let diagnostic = markup::diagnostic(outcome.language, &e.to_string());
                    siblings.insert(idx + 1, diagnostic.into());
                }
                report.failed += 1;
            }
        }
    }

    tracing::debug!(
        "Highlighted {} code blocks ({} failed, {} fallbacks)",
        report.highlighted,
        report.failed,
        report.fallbacks
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{HighlightResult, Token};
    use crate::language::Language;
    use folio_mdx::parse_mdx;
    use pretty_assertions::assert_eq;

    /// One token per line; fails or panics for a chosen language.
    #[derive(Default)]
    struct FakeHighlighter {
        fail_for: Option<Language>,
        panic_for: Option<Language>,
    }

    impl Highlighter for FakeHighlighter {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn highlight(
            &self,
            source: &str,
            language: Language,
            theme: Theme,
        ) -> Result<HighlightResult, HighlightError> {
            if self.panic_for == Some(language) {
                panic!("engine blew up on {}", language);
            }
            if self.fail_for == Some(language) {
                return Err(HighlightError::Engine(format!("cannot tokenize {}", language)));
            }
            let color = match theme {
                Theme::Light => "#000000",
                Theme::Dark => "#ffffff",
            };
            Ok(HighlightResult {
                tokens: source
                    .trim_end_matches('\n')
                    .split('\n')
                    .map(|line| vec![Token::new(line, color)])
                    .collect(),
                background_color: color.to_string(),
                foreground_color: color.to_string(),
            })
        }
    }

    fn fake_provider(fail_for: Option<Language>) -> HighlighterProvider<FakeHighlighter> {
        HighlighterProvider::new(move || {
            Ok(FakeHighlighter {
                fail_for,
                ..Default::default()
            })
        })
    }

    fn panicking_provider(panic_for: Language) -> HighlighterProvider<FakeHighlighter> {
        HighlighterProvider::new(move || {
            Ok(FakeHighlighter {
                panic_for: Some(panic_for),
                ..Default::default()
            })
        })
    }

    fn dev() -> TransformOptions {
        TransformOptions {
            mode: Mode::Development,
        }
    }

    fn element(node: &Node) -> &Element {
        node.as_element().expect("element node")
    }

    fn line_texts(theme_box: &Element) -> Vec<String> {
        let pre = element(&theme_box.children[0]);
        let code = element(&pre.children[0]);
        code.children.iter().map(Node::text_content).collect()
    }

    #[tokio::test]
    async fn end_to_end_with_syntect() {
        let source = "```typescript {2} filename=\"a.ts\"\nconst x = 1;\nconst y = 2;\n```\n";
        let mut doc = parse_mdx(source).unwrap().tree;
        let provider = HighlighterProvider::syntect();

        let report = CodeBlockTransformer::new(&provider, TransformOptions::default())
            .transform(&mut doc)
            .await
            .unwrap();

        assert_eq!(
            report,
            TransformReport {
                highlighted: 1,
                failed: 0,
                fallbacks: 0
            }
        );

        let block = element(&doc.children[0]);
        assert!(block.has_class("code-block"));
        assert_eq!(block.attr("data-language"), Some("typescript"));
        assert_eq!(block.attr("data-filename"), Some("a.ts"));
        assert_eq!(block.attr("data-highlight-lines"), Some("2"));
        assert_eq!(element(&block.children[0]).text_content(), "a.ts");

        for (idx, marker) in [(1, "light-active"), (2, "dark-active")] {
            let theme_box = element(&block.children[idx]);
            assert!(theme_box.has_class(marker));
            assert_eq!(line_texts(theme_box), vec!["const x = 1;", "const y = 2;"]);
        }
    }

    #[tokio::test]
    async fn preserves_document_order() {
        let source = "# A\n\n```rust\nfn a() {}\n```\n\ntext\n\n```python\nb = 2\n```\n\n```go\nc := 3\n```\n";
        let mut doc = parse_mdx(source).unwrap().tree;
        let provider = fake_provider(None);

        CodeBlockTransformer::new(&provider, dev())
            .transform(&mut doc)
            .await
            .unwrap();

        let languages: Vec<_> = doc
            .children
            .iter()
            .filter_map(Node::as_element)
            .filter_map(|el| el.attr("data-language"))
            .collect();
        assert_eq!(languages, vec!["rust", "python", "go"]);
        assert_eq!(element(&doc.children[0]).tag, "h1");
        assert_eq!(element(&doc.children[2]).tag, "p");
    }

    #[tokio::test]
    async fn failing_block_is_isolated_in_development() {
        let source = "```rust\nfn a() {}\n```\n\n```python\nb = 2\n```\n";
        let mut doc = parse_mdx(source).unwrap().tree;
        let original_second = doc.children[1].clone();
        let provider = fake_provider(Some(Language::Python));

        let report = CodeBlockTransformer::new(&provider, dev())
            .transform(&mut doc)
            .await
            .unwrap();

        assert_eq!(report.highlighted, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(doc.children.len(), 3);
        assert_eq!(element(&doc.children[0]).attr("data-language"), Some("rust"));
        assert_eq!(doc.children[1], original_second);

        let diagnostic = element(&doc.children[2]);
        assert!(diagnostic.has_class("code-block-error"));
        assert!(diagnostic.text_content().contains("python"));
    }

    #[tokio::test]
    async fn panicking_block_is_isolated() {
        let source = "```rust\nfn a() {}\n```\n\n```python\nb = 2\n```\n";
        let mut doc = parse_mdx(source).unwrap().tree;
        let original_second = doc.children[1].clone();
        let provider = panicking_provider(Language::Python);

        let report = CodeBlockTransformer::new(&provider, dev())
            .transform(&mut doc)
            .await
            .unwrap();

        assert_eq!(report.highlighted, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(element(&doc.children[0]).attr("data-language"), Some("rust"));
        assert_eq!(doc.children[1], original_second);

        let diagnostic = element(&doc.children[2]);
        assert!(diagnostic.has_class("code-block-error"));
        assert!(diagnostic.text_content().contains("engine blew up on python"));
    }

    #[tokio::test]
    async fn failing_block_is_left_silently_in_production() {
        let source = "```python\nb = 2\n```\n";
        let mut doc = parse_mdx(source).unwrap().tree;
        let original = doc.clone();
        let provider = fake_provider(Some(Language::Python));

        let report = CodeBlockTransformer::new(&provider, TransformOptions::default())
            .transform(&mut doc)
            .await
            .unwrap();

        assert_eq!(report.failed, 1);
        assert_eq!(doc, original);
    }

    #[tokio::test]
    async fn transform_is_idempotent() {
        let source = "```ts\nlet a = 1;\n```\n\n- item\n\n  ```bash {1}\n  echo hi\n  ```\n";
        let mut doc = parse_mdx(source).unwrap().tree;
        let provider = fake_provider(None);
        let transformer = CodeBlockTransformer::new(&provider, dev());

        transformer.transform(&mut doc).await.unwrap();
        let once = doc.clone();
        let report = transformer.transform(&mut doc).await.unwrap();

        assert_eq!(report, TransformReport::default());
        assert_eq!(doc, once);
    }

    #[tokio::test]
    async fn failed_block_gets_one_diagnostic_across_passes() {
        let source = "```python\nb = 2\n```\n\n```rust\nfn a() {}\n```\n";
        let mut doc = parse_mdx(source).unwrap().tree;
        let provider = fake_provider(Some(Language::Python));
        let transformer = CodeBlockTransformer::new(&provider, dev());

        transformer.transform(&mut doc).await.unwrap();
        let once = doc.clone();
        let report = transformer.transform(&mut doc).await.unwrap();

        assert_eq!(once.children.len(), 3);
        assert_eq!(report, TransformReport::default());
        assert_eq!(doc, once);
    }

    #[test]
    fn skips_block_followed_by_diagnostic() {
        let pre = Element::new("pre").with_child(
            Element::new("code")
                .with_classes(["language-python"])
                .with_child(Node::text("b = 2")),
        );
        let doc = Document::new(vec![
            pre.clone().into(),
            markup::diagnostic("python", "cannot tokenize python").into(),
            pre.into(),
        ]);

        let located = locate_code_blocks(&doc);

        assert_eq!(located.len(), 1);
        assert_eq!(located[0].path, vec![2]);
    }

    #[tokio::test]
    async fn unsupported_language_uses_fallback() {
        let source = "```brainfuck\n+++.\n```\n\n```\nplain\n```\n";
        let mut doc = parse_mdx(source).unwrap().tree;
        let provider = fake_provider(None);

        let report = CodeBlockTransformer::new(&provider, dev())
            .transform(&mut doc)
            .await
            .unwrap();

        assert_eq!(report.highlighted, 2);
        assert_eq!(report.fallbacks, 2);
        assert_eq!(element(&doc.children[0]).attr("data-language"), Some("text"));
        assert_eq!(element(&doc.children[1]).attr("data-language"), Some("text"));
    }

    #[tokio::test]
    async fn init_failure_aborts_and_leaves_tree() {
        let mut doc = parse_mdx("```rust\nfn a() {}\n```\n").unwrap().tree;
        let original = doc.clone();
        let provider: HighlighterProvider<FakeHighlighter> =
            HighlighterProvider::new(|| Err(InitError::Load("no grammars".to_string())));

        let result = CodeBlockTransformer::new(&provider, dev())
            .transform(&mut doc)
            .await;

        assert!(matches!(result, Err(TransformError::Init(_))));
        assert_eq!(doc, original);
    }

    #[test]
    fn locates_nested_blocks_in_order() {
        let doc = parse_mdx("> ```rust\n> fn a() {}\n> ```\n\n```go {3} filename='m.go'\nx\n```\n")
            .unwrap()
            .tree;

        let located = locate_code_blocks(&doc);

        assert_eq!(located.len(), 2);
        assert_eq!(located[0].path, vec![0, 0]);
        assert_eq!(located[0].request.language, "rust");
        assert_eq!(located[1].path, vec![1]);
        assert_eq!(
            located[1].request,
            CodeBlockRequest {
                language: "go".to_string(),
                source_text: "x\n".to_string(),
                raw_metadata: "{3} filename='m.go'".to_string(),
            }
        );
    }

    #[test]
    fn rejects_other_shapes() {
        let two_children = Element::new("pre")
            .with_child(Element::new("code"))
            .with_child(Node::text("x"));
        assert!(code_block_request(&two_children).is_none());

        let text_only = Element::new("pre").with_child(Node::text("x"));
        assert!(code_block_request(&text_only).is_none());

        let themed = Element::new("pre")
            .with_attr(THEME_ATTR, "dark")
            .with_child(Element::new("code"));
        assert!(code_block_request(&themed).is_none());
    }

    #[test]
    fn accepts_metastring_property() {
        let pre = Element::new("pre").with_child(
            Element::new("code")
                .with_attr("class", "language-rust")
                .with_attr("metastring", "{1}")
                .with_child(Node::text("fn a() {}")),
        );

        let request = code_block_request(&pre).unwrap();

        assert_eq!(request.language, "rust");
        assert_eq!(request.raw_metadata, "{1}");
    }
}
