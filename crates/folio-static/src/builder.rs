//! Static site builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use walkdir::WalkDir;

use folio_highlight::{
    CodeBlockTransformer, HighlighterProvider, Mode, SyntectHighlighter, TransformOptions,
};
use folio_mdx::{parse_mdx, render_html, Frontmatter, ParsedDoc};

use crate::assets::AssetPipeline;
use crate::templates::{ArticleSummary, Context, TemplateEngine, TocEntry};

/// Configuration for building a static site.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source articles directory
    pub articles_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Minify CSS output
    pub minify: bool,

    /// Base URL for the site
    pub base_url: String,

    /// Site title
    pub title: String,

    /// Development builds show highlighting failures inline
    pub mode: Mode,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            articles_dir: PathBuf::from("content"),
            output_dir: PathBuf::from("dist"),
            minify: true,
            base_url: "/".to_string(),
            title: "Blog".to_string(),
            mode: Mode::Production,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages generated
    pub pages: usize,

    /// Number of code blocks highlighted
    pub code_blocks: usize,

    /// Number of code blocks left unhighlighted
    pub failed_blocks: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read articles directory: {0}")]
    ReadError(String),

    #[error("Failed to parse MDX: {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Failed to highlight code: {0}")]
    HighlightError(String),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// A page to be built.
#[derive(Debug)]
struct PageInfo {
    /// Source file path
    source_path: PathBuf,

    /// Output path
    output_path: PathBuf,

    /// Parsed document
    doc: ParsedDoc,
}

impl PageInfo {
    fn title(&self) -> String {
        self.doc
            .frontmatter
            .as_ref()
            .map(|f| f.title.clone())
            .unwrap_or_else(|| {
                self.source_path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("Untitled")
                    .to_string()
            })
    }

    fn date(&self) -> Option<&str> {
        self.doc.frontmatter.as_ref().and_then(|f| f.date.as_deref())
    }
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    provider: &'static HighlighterProvider<SyntectHighlighter>,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder using the shared highlighter.
    pub fn new(config: BuildConfig) -> Self {
        Self {
            config,
            provider: folio_highlight::shared(),
            templates: TemplateEngine::new(),
        }
    }

    /// Build the static site.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        // Ensure output directory exists
        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let mut pages = self.discover_pages()?;

        // Highlight code blocks; each pass parallelizes across its own blocks
        let transformer = CodeBlockTransformer::new(
            self.provider,
            TransformOptions {
                mode: self.config.mode,
            },
        );

        let mut code_blocks = 0;
        let mut failed_blocks = 0;

        for page in &mut pages {
            let report = transformer
                .transform(&mut page.doc.tree)
                .await
                .map_err(|e| BuildError::HighlightError(e.to_string()))?;

            if report.failed > 0 {
                tracing::warn!(
                    "{} code block(s) in {} were left unhighlighted",
                    report.failed,
                    page.source_path.display()
                );
            }

            code_blocks += report.highlighted;
            failed_blocks += report.failed;
        }

        // Render and write pages in parallel
        let results: Vec<Result<(), BuildError>> =
            pages.par_iter().map(|page| self.build_page(page)).collect();

        for result in results {
            result?;
        }

        self.generate_index(&pages)?;
        self.generate_assets()?;
        self.generate_search_index(&pages)?;
        self.generate_sitemap(&pages)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: pages.len(),
            code_blocks,
            failed_blocks,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Discover all published articles, newest first.
    fn discover_pages(&self) -> Result<Vec<PageInfo>, BuildError> {
        let mut pages = Vec::new();

        if !self.config.articles_dir.exists() {
            return Err(BuildError::ReadError(format!(
                "Articles directory not found: {}",
                self.config.articles_dir.display()
            )));
        }

        for entry in WalkDir::new(&self.config.articles_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if !path.is_file() {
                continue;
            }

            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if ext != "mdx" && ext != "md" {
                continue;
            }

            let content = fs::read_to_string(path)
                .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

            let doc = parse_mdx(&content).map_err(|e| BuildError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

            if doc.frontmatter.as_ref().is_some_and(|f| f.draft) {
                tracing::info!("Skipping draft {}", path.display());
                continue;
            }

            let relative_path = path
                .strip_prefix(&self.config.articles_dir)
                .unwrap_or(path)
                .to_path_buf();

            let output_path = self.calculate_output_path(&relative_path, &doc.frontmatter);

            pages.push(PageInfo {
                source_path: path.to_path_buf(),
                output_path,
                doc,
            });
        }

        // Newest first; undated articles last
        pages.sort_by(|a, b| match (a.date(), b.date()) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.title().cmp(&b.title()),
        });

        Ok(pages)
    }

    /// Calculate output path for a page.
    fn calculate_output_path(&self, relative: &Path, frontmatter: &Option<Frontmatter>) -> PathBuf {
        // Check for slug override
        if let Some(fm) = frontmatter {
            if let Some(slug) = &fm.slug {
                return self.config.output_dir.join(slug).join("index.html");
            }
        }

        let stem = relative
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("index");
        let parent = relative.parent().unwrap_or(Path::new(""));

        if stem == "index" {
            // content/notes/index.mdx -> dist/notes/index.html
            self.config.output_dir.join(parent).join("index.html")
        } else {
            // content/hello.mdx -> dist/hello/index.html
            self.config
                .output_dir
                .join(parent)
                .join(stem)
                .join("index.html")
        }
    }

    /// Convert output path to URL.
    fn path_to_url(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.config.output_dir).unwrap_or(path);

        let url = relative
            .parent()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_default();

        if url.is_empty() {
            self.config.base_url.clone()
        } else {
            format!("{}{}/", self.config.base_url, url)
        }
    }

    /// Render and write a single page.
    fn build_page(&self, page: &PageInfo) -> Result<(), BuildError> {
        let fm = page.doc.frontmatter.as_ref();

        let context = Context {
            title: page.title(),
            site_title: self.config.title.clone(),
            description: fm.and_then(|f| f.description.clone()),
            date: page.date().map(str::to_string),
            tags: fm.map(|f| f.tags.clone()).unwrap_or_default(),
            content: render_html(&page.doc.tree),
            toc: page
                .doc
                .toc
                .iter()
                .map(|e| TocEntry {
                    title: e.title.clone(),
                    id: e.id.clone(),
                    level: e.level,
                })
                .collect(),
            base_url: self.config.base_url.clone(),
        };

        let html = self
            .templates
            .render_article(&context)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        if let Some(parent) = page.output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::write(&page.output_path, html).map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Generate the article listing, unless an article already owns the root page.
    fn generate_index(&self, pages: &[PageInfo]) -> Result<(), BuildError> {
        let index_path = self.config.output_dir.join("index.html");
        if pages.iter().any(|p| p.output_path == index_path) {
            return Ok(());
        }

        let articles: Vec<ArticleSummary> = pages
            .iter()
            .map(|page| {
                let fm = page.doc.frontmatter.as_ref();
                ArticleSummary {
                    title: page.title(),
                    url: self.path_to_url(&page.output_path),
                    description: fm.and_then(|f| f.description.clone()),
                    date: page.date().map(str::to_string),
                    tags: fm.map(|f| f.tags.clone()).unwrap_or_default(),
                }
            })
            .collect();

        let html = self
            .templates
            .render_index(&self.config.title, &self.config.base_url, &articles)
            .map_err(|e| BuildError::TemplateError(e.to_string()))?;

        fs::write(index_path, html).map_err(|e| BuildError::WriteError(e.to_string()))
    }

    /// Generate static assets.
    fn generate_assets(&self) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");
        fs::create_dir_all(&assets_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let css = AssetPipeline::generate_css();
        let css = if self.config.minify {
            AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Keeping unminified CSS: {}", e);
                css.clone()
            })
        } else {
            css
        };
        fs::write(assets_dir.join("main.css"), css)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let js = AssetPipeline::generate_js();
        fs::write(assets_dir.join("main.js"), js)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Generate search index.
    fn generate_search_index(&self, pages: &[PageInfo]) -> Result<(), BuildError> {
        let index: Vec<serde_json::Value> = pages
            .iter()
            .map(|page| {
                let fm = page.doc.frontmatter.as_ref();
                let description = fm
                    .and_then(|f| f.description.clone())
                    .unwrap_or_default();
                let tags = fm.map(|f| f.tags.clone()).unwrap_or_default();

                // Extract text content (simplified)
                let content = page
                    .doc
                    .content
                    .lines()
                    .filter(|l| !l.starts_with('#') && !l.starts_with("```"))
                    .take(10)
                    .collect::<Vec<_>>()
                    .join(" ");

                serde_json::json!({
                    "title": page.title(),
                    "description": description,
                    "tags": tags,
                    "url": self.path_to_url(&page.output_path),
                    "content": content,
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&index)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        fs::write(self.config.output_dir.join("search-index.json"), json)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Generate sitemap.
    fn generate_sitemap(&self, pages: &[PageInfo]) -> Result<(), BuildError> {
        let urls: Vec<String> = pages
            .iter()
            .map(|page| {
                let url = self.path_to_url(&page.output_path);
                match page.date() {
                    Some(date) => format!(
                        "  <url>\n    <loc>{}{}</loc>\n    <lastmod>{}</lastmod>\n  </url>",
                        self.config.base_url.trim_end_matches('/'),
                        url,
                        date
                    ),
                    None => format!(
                        "  <url>\n    <loc>{}{}</loc>\n  </url>",
                        self.config.base_url.trim_end_matches('/'),
                        url
                    ),
                }
            })
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            urls.join("\n")
        );

        fs::write(self.config.output_dir.join("sitemap.xml"), sitemap)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let robots = format!(
            "User-agent: *\nAllow: /\nSitemap: {}sitemap.xml",
            self.config.base_url
        );
        fs::write(self.config.output_dir.join("robots.txt"), robots)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }
}
