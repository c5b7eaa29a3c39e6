// Static browse-all page for the TheorIA dataset
//
// Usage: cargo run --bin generate_index -- [--dataset-root DIR] [--output FILE]

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use theoria_contrib::{ContribConfig, SiteIndexer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "generate_index", version, about = "Generate the entries index page")]
struct Cli {
    /// TOML config file (defaults to ./theoria.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset root containing entries/ and manifest.json
    #[arg(long)]
    dataset_root: Option<PathBuf>,

    /// Output HTML file, relative to the dataset root
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "theoria_contrib=debug,warn" } else { "theoria_contrib=info,warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &cli.config {
        Some(path) => ContribConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ContribConfig::load().context("loading config")?,
    };
    if let Some(root) = cli.dataset_root {
        config.dataset.root = root;
    }
    if let Some(output) = cli.output {
        config.site.output = output;
    }

    let report = SiteIndexer::new(&config)
        .run()
        .context("generating entries index")?;

    if !report.skipped.is_empty() {
        tracing::warn!("{} file(s) skipped", report.skipped.len());
    }
    Ok(())
}
