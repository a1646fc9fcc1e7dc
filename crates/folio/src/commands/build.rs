//! Static site build command.

use std::path::PathBuf;

use anyhow::Result;
use folio_static::{BuildConfig, StaticBuilder};

use crate::config::ConfigFile;

/// Run the build command.
pub async fn run(
    file_config: ConfigFile,
    output: Option<PathBuf>,
    minify: Option<bool>,
    dev: bool,
) -> Result<()> {
    tracing::info!("Building static site...");

    let mode = file_config.mode(dev)?;

    let config = BuildConfig {
        articles_dir: PathBuf::from(&file_config.site.dir),
        output_dir: output.unwrap_or_else(|| PathBuf::from(&file_config.site.output)),
        minify: minify.unwrap_or(file_config.build.minify),
        base_url: file_config.site.base_url,
        title: file_config.site.title,
        mode,
    };

    let result = StaticBuilder::new(config).build().await?;

    tracing::info!(
        "Built {} pages with {} highlighted code blocks in {}ms",
        result.pages,
        result.code_blocks,
        result.duration_ms
    );

    if result.failed_blocks > 0 {
        tracing::warn!(
            "{} code blocks could not be highlighted",
            result.failed_blocks
        );
    }

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
