//! Folio CLI - static blog builder with dual-theme code highlighting.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Static blog builder with dual-theme code highlighting")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to folio.toml config file
    #[arg(short, long, default_value = "folio.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip minification
        #[arg(long)]
        no_minify: bool,

        /// Development build: show highlighting failures inline
        #[arg(long)]
        dev: bool,
    },

    /// Render a single article to stdout
    Render {
        /// Article to render
        file: PathBuf,

        /// Print the transformed document tree as JSON instead of HTML
        #[arg(long)]
        json: bool,

        /// Development build: show highlighting failures inline
        #[arg(long)]
        dev: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr keeps `render` output clean)
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let file_config = config::load(&cli.config)?;

    match cli.command {
        Commands::Build {
            output,
            no_minify,
            dev,
        } => {
            let minify = if no_minify { Some(false) } else { None };
            commands::build::run(file_config, output, minify, dev).await?;
        }
        Commands::Render { file, json, dev } => {
            commands::render::run(file_config, file, json, dev).await?;
        }
    }

    Ok(())
}
