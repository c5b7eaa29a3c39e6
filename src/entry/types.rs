//! Entry data structures.
//!
//! Field order follows the dataset schema, which is also the serialized order.
//! Optional repeated fields are `Option<Vec<_>>`: `None` means absent, and the
//! form layer never produces `Some(vec![])`.

use serde::{Deserialize, Serialize};

/// One dataset entry, keyed by `result_id` (`entries/<result_id>.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub result_id: String,

    #[serde(default)]
    pub result_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_equations: Option<Vec<ResultEquation>>,

    #[serde(default)]
    pub explanation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<Vec<Definition>>,

    /// Free text or ids into the global assumption catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<Vec<String>>,

    #[serde(default, alias = "dependencies", skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation: Option<Vec<DerivationStep>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub programmatic_verification: Option<ProgrammaticVerification>,

    #[serde(default)]
    pub domain: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theory_status: Option<TheoryStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_context: Option<HistoricalContext>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<Reference>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contributors: Option<Vec<Contributor>>,

    #[serde(default)]
    pub review_status: ReviewStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEquation {
    pub id: String,
    pub equation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equation_title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub symbol: String,
    pub definition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivationStep {
    pub step: u32,
    #[serde(default)]
    pub description: String,
    pub equation: String,
    /// Id of the `result_equations` item this step establishes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equation_proven: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assumptions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgrammaticVerification {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub library: String,
    #[serde(default)]
    pub code: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development_period: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_insights: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    pub citation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub full_name: String,
    #[serde(default)]
    pub identifier: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    #[default]
    Draft,
    Reviewed,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Draft => "draft",
            ReviewStatus::Reviewed => "reviewed",
        }
    }

    /// Unknown or empty input falls back to `Draft`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim() {
            "reviewed" => ReviewStatus::Reviewed,
            _ => ReviewStatus::Draft,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TheoryStatus {
    Current,
    Historical,
    Approximation,
    LimitingCase,
    Superseded,
}

impl TheoryStatus {
    pub const ALL: [TheoryStatus; 5] = [
        TheoryStatus::Current,
        TheoryStatus::Historical,
        TheoryStatus::Approximation,
        TheoryStatus::LimitingCase,
        TheoryStatus::Superseded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TheoryStatus::Current => "current",
            TheoryStatus::Historical => "historical",
            TheoryStatus::Approximation => "approximation",
            TheoryStatus::LimitingCase => "limiting_case",
            TheoryStatus::Superseded => "superseded",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TheoryStatus::Current => "Current",
            TheoryStatus::Historical => "Historical",
            TheoryStatus::Approximation => "Approximation",
            TheoryStatus::LimitingCase => "Limiting case",
            TheoryStatus::Superseded => "Superseded",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }
}

impl Entry {
    /// Blank entry for the new-entry flow.
    pub fn skeleton() -> Self {
        Self::default()
    }

    pub fn is_draft(&self) -> bool {
        self.review_status == ReviewStatus::Draft
    }

    pub fn equation(&self, id: &str) -> Option<&ResultEquation> {
        self.result_equations.as_deref()?.iter().find(|eq| eq.id == id)
    }

    pub fn depends_on_id(&self, id: &str) -> bool {
        self.depends_on
            .as_deref()
            .is_some_and(|deps| deps.iter().any(|dep| dep == id))
    }

    /// Two-space indented JSON, the persisted format.
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
