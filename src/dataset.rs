//! Reading entries, the assumption catalog and the manifest from a dataset
//! directory.

use crate::config::DatasetConfig;
use crate::entry::{parse_entry, validate::is_valid_result_id, AssumptionCatalog, Entry, MigrationReport};
use crate::error::LoadError;
use std::path::{Path, PathBuf};

/// An entry together with where it came from and how it was migrated.
#[derive(Debug, Clone)]
pub struct LoadedEntry {
    pub entry: Entry,
    pub path: PathBuf,
    pub migration: MigrationReport,
}

impl LoadedEntry {
    pub fn file_stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }
}

pub struct Dataset {
    config: DatasetConfig,
}

impl Dataset {
    pub fn new(config: DatasetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn entry_path(&self, id: &str) -> PathBuf {
        self.config.entries_path().join(format!("{}.json", id))
    }

    /// `entry_path` for ids that cannot escape the entries directory.
    pub fn checked_entry_path(&self, id: &str) -> Result<PathBuf, LoadError> {
        if !is_valid_result_id(id) {
            return Err(LoadError::InvalidId(id.to_string()));
        }
        Ok(self.entry_path(id))
    }

    /// Load `entries/<id>.json`. The id is checked before touching the disk.
    pub fn load_entry(&self, id: &str) -> Result<LoadedEntry, LoadError> {
        load_entry_file(&self.checked_entry_path(id)?)
    }

    /// Catalog of global assumptions.
    pub fn load_catalog(&self) -> Result<AssumptionCatalog, LoadError> {
        let path = self.config.assumptions_path();
        let text = read_file(&path)?;
        AssumptionCatalog::from_json(&text).map_err(|source| LoadError::Malformed { path, source })
    }

    /// The catalog, or an empty one when it cannot be loaded.
    pub fn load_catalog_or_empty(&self) -> AssumptionCatalog {
        match self.load_catalog() {
            Ok(catalog) => {
                tracing::debug!("Loaded {} global assumptions", catalog.len());
                catalog
            }
            Err(e) => {
                tracing::warn!("Assumption catalog unavailable, continuing without it: {}", e);
                AssumptionCatalog::default()
            }
        }
    }

    /// `dataset_version` from the manifest.
    pub fn dataset_version(&self) -> Result<String, LoadError> {
        let path = self.config.manifest_path();
        let text = read_file(&path)?;
        let manifest: serde_json::Value = serde_json::from_str(&text)
            .map_err(|source| LoadError::Malformed { path: path.clone(), source })?;
        Ok(manifest
            .get("dataset_version")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string())
    }

    /// Every `*.json` file in the entries directory, sorted by file name.
    pub fn entry_files(&self) -> std::io::Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.config.entries_path())?
            .filter_map(|dirent| dirent.ok().map(|d| d.path()))
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();
        Ok(files)
    }
}

pub fn load_entry_file(path: &Path) -> Result<LoadedEntry, LoadError> {
    let text = read_file(path)?;
    let (entry, migration) = parse_entry(&text).map_err(|source| LoadError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedEntry { entry, path: path.to_path_buf(), migration })
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound { path: path.to_path_buf() }
        } else {
            LoadError::Io { path: path.to_path_buf(), source }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_test_dataset() -> (tempfile::TempDir, Dataset) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("entries")).unwrap();
        fs::create_dir_all(dir.path().join("globals")).unwrap();
        let config = DatasetConfig { root: dir.path().to_path_buf(), ..DatasetConfig::default() };
        (dir, Dataset::new(config))
    }

    #[test]
    fn test_load_entry_and_missing() {
        let (dir, dataset) = make_test_dataset();
        fs::write(
            dir.path().join("entries/ohms_law.json"),
            r#"{"result_id": "ohms_law", "result_name": "Ohm's Law"}"#,
        )
        .unwrap();

        let loaded = dataset.load_entry("ohms_law").unwrap();
        assert_eq!(loaded.entry.result_name, "Ohm's Law");
        assert_eq!(loaded.file_stem(), Some("ohms_law"));

        assert!(matches!(dataset.load_entry("missing"), Err(LoadError::NotFound { .. })));
        assert!(matches!(dataset.load_entry("../etc/passwd"), Err(LoadError::InvalidId(_))));
    }

    #[test]
    fn test_checked_entry_path() {
        let (dir, dataset) = make_test_dataset();
        assert_eq!(
            dataset.checked_entry_path("ohms_law").unwrap(),
            dir.path().join("entries/ohms_law.json")
        );
        for id in ["../globals/assumptions", "/etc/passwd", "Ohms_Law", ""] {
            assert!(
                matches!(dataset.checked_entry_path(id), Err(LoadError::InvalidId(_))),
                "{:?} should be rejected",
                id
            );
        }
    }

    #[test]
    fn test_malformed_entry() {
        let (dir, dataset) = make_test_dataset();
        fs::write(dir.path().join("entries/broken.json"), "{ not json").unwrap();
        assert!(matches!(dataset.load_entry("broken"), Err(LoadError::Malformed { .. })));
    }

    #[test]
    fn test_catalog_fallback_and_manifest() {
        let (dir, dataset) = make_test_dataset();
        assert!(dataset.load_catalog_or_empty().is_empty());

        fs::write(
            dir.path().join("globals/assumptions.json"),
            r#"{"assumptions": [{"id": "point_mass", "type": "approximation", "text": "Point."}]}"#,
        )
        .unwrap();
        assert_eq!(dataset.load_catalog_or_empty().len(), 1);

        assert!(dataset.dataset_version().is_err());
        fs::write(dir.path().join("manifest.json"), r#"{"dataset_version": "1.2.0"}"#).unwrap();
        assert_eq!(dataset.dataset_version().unwrap(), "1.2.0");
    }

    #[test]
    fn test_entry_files_sorted_json_only() {
        let (dir, dataset) = make_test_dataset();
        for name in ["b.json", "a.json", "notes.txt"] {
            fs::write(dir.path().join("entries").join(name), "{}").unwrap();
        }
        let names: Vec<_> = dataset
            .entry_files()
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }
}
