//! Render a single article.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use folio_highlight::{CodeBlockTransformer, TransformOptions};
use folio_mdx::{parse_mdx, render_html};

use crate::config::ConfigFile;

/// Run the render command, printing HTML (or the tree as JSON) to stdout.
pub async fn run(file_config: ConfigFile, file: PathBuf, json: bool, dev: bool) -> Result<()> {
    let mode = file_config.mode(dev)?;

    let source = fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let mut doc = parse_mdx(&source).with_context(|| format!("Failed to parse {}", file.display()))?;

    let report = CodeBlockTransformer::new(folio_highlight::shared(), TransformOptions { mode })
        .transform(&mut doc.tree)
        .await?;

    tracing::debug!(
        "{}: {} highlighted, {} failed, {} fallbacks",
        file.display(),
        report.highlighted,
        report.failed,
        report.fallbacks
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&doc.tree)?);
    } else {
        println!("{}", render_html(&doc.tree));
    }

    Ok(())
}
