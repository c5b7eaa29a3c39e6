// Command-line access to single entries: preview, schema check, export
//
// Usage: cargo run --bin entry_tool -- check
//        cargo run --bin entry_tool -- preview maxwell_equations --out preview.html

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use theoria_contrib::dataset::load_entry_file;
use theoria_contrib::entry::{validate_entry, Severity};
use theoria_contrib::{ContribConfig, Dataset, FormLayout, FormSynchronizer, NoopTypesetter, PreviewRenderer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "entry_tool", version, about = "Preview, check and export dataset entries")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// TOML config file (defaults to ./theoria.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Dataset root containing entries/ and globals/
    #[arg(long, global = true)]
    dataset_root: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the HTML preview fragment of an entry
    Preview {
        id: String,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Schema check of the given entries, or of every entry
    Check { ids: Vec<String> },
    /// Migrated, normalized JSON of an entry
    Export { id: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "theoria_contrib=debug,warn" } else { "theoria_contrib=info,warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &cli.config {
        Some(path) => ContribConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ContribConfig::load().context("loading config")?,
    };
    if let Some(root) = cli.dataset_root {
        config.dataset.root = root;
    }
    let dataset = Dataset::new(config.dataset.clone());

    match cli.command {
        Command::Preview { id, out } => preview(&dataset, &config, &id, out),
        Command::Check { ids } => check(&dataset, &ids),
        Command::Export { id } => export(&dataset, &id),
    }
}

fn preview(dataset: &Dataset, config: &ContribConfig, id: &str, out: Option<PathBuf>) -> anyhow::Result<()> {
    let loaded = dataset.load_entry(id).with_context(|| format!("loading entry '{}'", id))?;
    let catalog = dataset.load_catalog_or_empty();
    let html = PreviewRenderer::with_catalog(&catalog)
        .entry_page(&config.site.entry_page)
        .render(&loaded.entry);

    match out {
        Some(path) => {
            std::fs::write(&path, html).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("Preview written to {}", path.display());
        }
        None => println!("{}", html),
    }
    Ok(())
}

fn check(dataset: &Dataset, ids: &[String]) -> anyhow::Result<()> {
    let mut failed = 0;
    let paths: Vec<PathBuf> = if ids.is_empty() {
        dataset.entry_files().with_context(|| {
            format!("reading {}", dataset.config().entries_path().display())
        })?
    } else {
        ids.iter()
            .filter_map(|id| match dataset.checked_entry_path(id) {
                Ok(path) => Some(path),
                Err(e) => {
                    println!("{}: {}", id, e);
                    failed += 1;
                    None
                }
            })
            .collect()
    };
    let total = if ids.is_empty() { paths.len() } else { ids.len() };

    for path in &paths {
        let loaded = match load_entry_file(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                println!("{}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };

        let issues = validate_entry(&loaded.entry, loaded.file_stem());
        for issue in &issues {
            println!(
                "{}: {} [{}] {}",
                path.display(),
                issue.severity.as_str(),
                issue.field,
                issue.message
            );
        }
        for dropped in &loaded.migration.dropped {
            println!("{}: warning [{}] legacy field dropped on load", path.display(), dropped);
        }
        if issues.iter().any(|i| i.severity == Severity::Error) {
            failed += 1;
        }
    }

    println!("Checked {} entries, {} with errors", total, failed);
    if failed > 0 {
        bail!("{} of {} entries failed the check", failed, total);
    }
    Ok(())
}

/// Round-trip through the form so the output is exactly what the editor
/// would submit.
fn export(dataset: &Dataset, id: &str) -> anyhow::Result<()> {
    let loaded = dataset.load_entry(id).with_context(|| format!("loading entry '{}'", id))?;
    let mut form = FormSynchronizer::new(FormLayout::full(), NoopTypesetter);
    form.populate(&loaded.entry);
    let json = form.collect().to_pretty_json().context("serializing entry")?;
    println!("{}", json);
    Ok(())
}
