//! Global assumption catalog (`globals/assumptions.json`).

use super::types::{Definition, Entry};
use super::validate::is_valid_result_id;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalAssumption {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mathematical_expressions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_definitions: Option<Vec<Definition>>,
}

impl GlobalAssumption {
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.trim().is_empty() => title.to_string(),
            _ => title_from_id(&self.id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    assumptions: Vec<GlobalAssumption>,
}

/// How an assumption string from an entry should be presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAssumption<'a> {
    Global(&'a GlobalAssumption),
    /// Id of another entry listed in `depends_on`.
    Dependency { id: String, title: String },
    Direct(String),
}

#[derive(Debug, Clone, Default)]
pub struct AssumptionCatalog {
    by_id: FxHashMap<String, GlobalAssumption>,
}

impl AssumptionCatalog {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let file: CatalogFile = serde_json::from_str(text)?;
        Ok(Self::from_assumptions(file.assumptions))
    }

    pub fn from_assumptions(assumptions: Vec<GlobalAssumption>) -> Self {
        let by_id = assumptions.into_iter().map(|a| (a.id.clone(), a)).collect();
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&GlobalAssumption> {
        self.by_id.get(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Catalog id first, then a `depends_on` entry id, else free text.
    pub fn resolve(&self, assumption: &str, entry: &Entry) -> ResolvedAssumption<'_> {
        let trimmed = assumption.trim();
        if is_valid_result_id(trimmed) {
            if let Some(global) = self.by_id.get(trimmed) {
                return ResolvedAssumption::Global(global);
            }
            if entry.depends_on_id(trimmed) {
                return ResolvedAssumption::Dependency {
                    id: trimmed.to_string(),
                    title: title_from_id(trimmed),
                };
            }
        }
        ResolvedAssumption::Direct(assumption.to_string())
    }
}

/// `"conservation_of_energy"` -> `"Conservation Of Energy"`
pub fn title_from_id(id: &str) -> String {
    id.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
