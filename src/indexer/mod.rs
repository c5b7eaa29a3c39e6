//! Static browse-all page.
//!
//! Reads every entry file, buckets entries by domain and renders a single
//! page with a domain navigation and one card grid per domain. Broken files
//! are logged and skipped; only directory or output I/O failures abort.

pub mod domains;
pub mod excerpt;
pub mod page;

use crate::config::{ContribConfig, SiteConfig};
use crate::dataset::Dataset;
use crate::error::IndexError;
use askama::Template;
use domains::{domain_anchor, domain_title, normalize_domain};
use excerpt::short_description;
use page::{DomainSection, EntriesIndexPage, EntryCard};
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The fields the index needs; everything else in the file is ignored.
#[derive(Debug, Deserialize)]
struct IndexRecord {
    result_name: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    review_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedEntry {
    pub filename: String,
    pub title: String,
    pub explanation: String,
    pub domain: String,
    pub reviewed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct IndexReport {
    pub output: PathBuf,
    pub entries: usize,
    pub domains: usize,
    pub skipped: Vec<SkippedFile>,
}

pub struct SiteIndexer {
    dataset: Dataset,
    site: SiteConfig,
    output: PathBuf,
}

impl SiteIndexer {
    pub fn new(config: &ContribConfig) -> Self {
        Self {
            dataset: Dataset::new(config.dataset.clone()),
            site: config.site.clone(),
            output: config.output_path(),
        }
    }

    /// Scan, render and write the page.
    pub fn run(&self) -> Result<IndexReport, IndexError> {
        let (entries, skipped) = self.scan()?;
        let version = self.dataset_version();
        let sections = group_by_domain(entries, &self.site.entry_page);
        let html = render_index(&sections, &version, &self.site.home_page)?;

        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| IndexError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.output, html).map_err(|source| IndexError::Write {
            path: self.output.clone(),
            source,
        })?;

        let report = IndexReport {
            output: self.output.clone(),
            entries: sections.iter().map(|s| s.cards.len()).sum(),
            domains: sections.len(),
            skipped,
        };
        tracing::info!(
            "Generated {} with {} entries across {} domains",
            report.output.display(),
            report.entries,
            report.domains
        );
        Ok(report)
    }

    /// Parse every entry file in parallel. Order follows the sorted file list.
    pub fn scan(&self) -> Result<(Vec<IndexedEntry>, Vec<SkippedFile>), IndexError> {
        let files = self.dataset.entry_files().map_err(|source| IndexError::EntriesDir {
            path: self.dataset.config().entries_path(),
            source,
        })?;
        tracing::info!("Indexing {} entry files", files.len());

        let parsed: Vec<(PathBuf, Result<IndexedEntry, String>)> = files
            .par_iter()
            .map(|path| (path.clone(), read_index_record(path)))
            .collect();

        let mut entries = Vec::with_capacity(parsed.len());
        let mut skipped = Vec::new();
        for (path, result) in parsed {
            match result {
                Ok(entry) => entries.push(entry),
                Err(reason) => {
                    tracing::warn!("Skipping {}: {}", path.display(), reason);
                    skipped.push(SkippedFile { path, reason });
                }
            }
        }
        Ok((entries, skipped))
    }

    /// `dataset_version` from the manifest, `Unknown` when unreadable.
    pub fn dataset_version(&self) -> String {
        match self.dataset.dataset_version() {
            Ok(version) => version,
            Err(e) => {
                tracing::warn!("Could not read manifest version: {}", e);
                "Unknown".to_string()
            }
        }
    }
}

fn read_index_record(path: &Path) -> Result<IndexedEntry, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let record: IndexRecord = serde_json::from_str(&text).map_err(|e| e.to_string())?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(IndexedEntry {
        filename,
        title: record.result_name,
        explanation: record.explanation,
        domain: normalize_domain(record.domain.as_deref()).to_string(),
        reviewed: record.review_status.as_deref() == Some("reviewed"),
    })
}

/// Bucket entries by domain code; sections sorted by display name, cards by
/// title (both case-insensitive).
pub fn group_by_domain(entries: Vec<IndexedEntry>, entry_page: &str) -> Vec<DomainSection> {
    let mut buckets: BTreeMap<String, Vec<IndexedEntry>> = BTreeMap::new();
    for entry in entries {
        buckets.entry(entry.domain.clone()).or_default().push(entry);
    }

    let mut sections: Vec<DomainSection> = buckets
        .into_iter()
        .map(|(code, mut entries)| {
            entries.sort_by(|a, b| {
                a.title
                    .to_lowercase()
                    .cmp(&b.title.to_lowercase())
                    .then_with(|| a.title.cmp(&b.title))
            });
            let cards = entries
                .into_iter()
                .map(|entry| {
                    let (status_class, status_label) = EntryCard::status(entry.reviewed);
                    EntryCard {
                        href: format!("{}?entry={}", entry_page, entry.filename),
                        excerpt: short_description(&entry.explanation),
                        title: entry.title,
                        status_class,
                        status_label,
                    }
                })
                .collect();
            DomainSection {
                anchor: domain_anchor(&code),
                title: domain_title(&code),
                code,
                cards,
            }
        })
        .collect();

    sections.sort_by(|a, b| {
        a.title
            .to_lowercase()
            .cmp(&b.title.to_lowercase())
            .then_with(|| a.code.cmp(&b.code))
    });
    sections
}

pub fn render_index(sections: &[DomainSection], version: &str, home_page: &str) -> Result<String, IndexError> {
    let page = EntriesIndexPage {
        total_entries: sections.iter().map(|s| s.cards.len()).sum(),
        version,
        home_page,
        sections,
    };
    Ok(page.render()?)
}
