//! Layered configuration.
//!
//! Sources, lowest to highest priority:
//! 1. Built-in defaults
//! 2. `theoria.toml` in the working directory (or an explicit file)
//! 3. Environment variables with the `THEORIA_` prefix, `__` between sections
//!    (`THEORIA_SITE__OUTPUT` -> `site.output`)

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "theoria.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ContribConfig {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub submission: SubmissionConfig,
}

/// Where the dataset lives on disk.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatasetConfig {
    pub root: PathBuf,
    pub entries_dir: PathBuf,
    pub assumptions_file: PathBuf,
    pub manifest_file: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            entries_dir: PathBuf::from("entries"),
            assumptions_file: PathBuf::from("globals/assumptions.json"),
            manifest_file: PathBuf::from("manifest.json"),
        }
    }
}

impl DatasetConfig {
    pub fn entries_path(&self) -> PathBuf {
        self.root.join(&self.entries_dir)
    }

    pub fn assumptions_path(&self) -> PathBuf {
        self.root.join(&self.assumptions_file)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.manifest_file)
    }
}

/// Static site settings used by the index page and entry links.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Output file of the index batch, relative to the dataset root.
    pub output: PathBuf,
    /// Page that displays a single entry (`<entry_page>?entry=<file>`).
    pub entry_page: String,
    /// Landing page, used as the safe target of error notices.
    pub home_page: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("docs/entries_index.html"),
            entry_page: "entries.html".to_string(),
            home_page: "index.html".to_string(),
        }
    }
}

/// Addresses and identifiers for the three delivery channels.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SubmissionConfig {
    pub maintainer_email: String,
    #[serde(default)]
    pub cc: Vec<String>,
    /// `owner/name` of the repository receiving issues.
    pub issue_repository: String,
    pub modification_labels: Vec<String>,
    pub new_entry_labels: Vec<String>,
    pub messaging_service_id: String,
    pub messaging_template_id: String,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            maintainer_email: "theoriadataset@gmail.com".to_string(),
            cc: Vec::new(),
            issue_repository: "theoria-dataset/theoria-dataset".to_string(),
            modification_labels: vec!["modification".to_string(), "entry-edit".to_string()],
            new_entry_labels: vec!["new-entry".to_string(), "contribution".to_string()],
            messaging_service_id: "service_theoria".to_string(),
            messaging_template_id: "template_submission".to_string(),
        }
    }
}

impl ContribConfig {
    /// Load from defaults, `theoria.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment(None).extract().map_err(ConfigError::from)
    }

    /// Load with an explicit TOML file in place of `theoria.toml`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::figment(Some(path)).extract().map_err(ConfigError::from)
    }

    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match file {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    figment = figment.merge(Toml::file(local));
                }
            }
        }

        figment.merge(Env::prefixed("THEORIA_").split("__"))
    }

    /// Index output path resolved against the dataset root.
    pub fn output_path(&self) -> PathBuf {
        self.dataset.root.join(&self.site.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_without_files() {
        Jail::expect_with(|_jail| {
            let config = ContribConfig::load().expect("defaults load");
            assert_eq!(config.dataset.entries_path(), PathBuf::from("./entries"));
            assert_eq!(config.site.output, PathBuf::from("docs/entries_index.html"));
            assert_eq!(config.submission.maintainer_email, "theoriadataset@gmail.com");
            Ok(())
        });
    }

    #[test]
    fn test_toml_file_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [dataset]
                root = "/srv/theoria"
                entries_dir = "entries"
                assumptions_file = "globals/assumptions.json"
                manifest_file = "manifest.json"

                [submission]
                maintainer_email = "maintainers@example.org"
                issue_repository = "example/dataset"
                modification_labels = ["edit"]
                new_entry_labels = ["new"]
                messaging_service_id = "svc"
                messaging_template_id = "tpl"
                "#,
            )?;

            let config = ContribConfig::load().expect("toml loads");
            assert_eq!(config.dataset.root, PathBuf::from("/srv/theoria"));
            assert_eq!(config.submission.issue_repository, "example/dataset");
            assert_eq!(config.submission.modification_labels, vec!["edit".to_string()]);
            // untouched section keeps defaults
            assert_eq!(config.site.entry_page, "entries.html");
            Ok(())
        });
    }

    #[test]
    fn test_env_beats_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [site]
                output = "from_toml.html"
                entry_page = "entries.html"
                home_page = "index.html"
                "#,
            )?;
            jail.set_env("THEORIA_SITE__OUTPUT", "from_env.html");

            let config = ContribConfig::load().expect("config loads");
            assert_eq!(config.site.output, PathBuf::from("from_env.html"));
            Ok(())
        });
    }
}
