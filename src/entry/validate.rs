//! Advisory schema checks for entries.
//!
//! Validation never blocks collection or preview; it feeds the `check`
//! command and the inline warnings of the editor.

use super::types::Entry;
use regex::Regex;
use rustc_hash::FxHashSet;
use std::sync::LazyLock;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_EXPLANATION_CHARS: usize = 800;
pub const MAX_REFERENCES: usize = 3;

static RESULT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("static pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub field: &'static str,
    pub message: String,
}

impl ValidationIssue {
    fn error(field: &'static str, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, field, message: message.into() }
    }

    fn warning(field: &'static str, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, field, message: message.into() }
    }
}

pub fn is_valid_result_id(id: &str) -> bool {
    RESULT_ID.is_match(id)
}

/// Derive an id from a title the way the new-entry form does while typing.
///
/// `"Ohm's Law (DC)"` -> `"ohms_law_dc"`
pub fn slugify_result_id(name: &str) -> String {
    let cleaned: String = name
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Check an entry. `file_stem` is the name of the file it was loaded from.
pub fn validate_entry(entry: &Entry, file_stem: Option<&str>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !is_valid_result_id(&entry.result_id) {
        issues.push(ValidationIssue::error(
            "result_id",
            format!("'{}' must match ^[a-z0-9_]+$", entry.result_id),
        ));
    }
    if let Some(stem) = file_stem {
        if stem != entry.result_id {
            issues.push(ValidationIssue::error(
                "result_id",
                format!("'{}' does not match file name '{}.json'", entry.result_id, stem),
            ));
        }
    }

    let name_len = entry.result_name.trim().chars().count();
    if name_len == 0 {
        issues.push(ValidationIssue::error("result_name", "must not be empty"));
    } else if name_len > MAX_NAME_CHARS {
        issues.push(ValidationIssue::error(
            "result_name",
            format!("{} characters, limit is {}", name_len, MAX_NAME_CHARS),
        ));
    }

    let explanation_len = entry.explanation.chars().count();
    if explanation_len > MAX_EXPLANATION_CHARS {
        issues.push(ValidationIssue::error(
            "explanation",
            format!("{} characters, limit is {}", explanation_len, MAX_EXPLANATION_CHARS),
        ));
    }

    check_equations(entry, &mut issues);

    if entry.definitions.as_deref().map_or(true, <[_]>::is_empty) {
        issues.push(ValidationIssue::error("definitions", "at least one definition is required"));
    }

    check_derivation(entry, &mut issues);

    match entry.references.as_deref() {
        None | Some([]) => {
            issues.push(ValidationIssue::error("references", "at least one reference is required"))
        }
        Some(refs) if refs.len() > MAX_REFERENCES => issues.push(ValidationIssue::error(
            "references",
            format!("{} references, limit is {}", refs.len(), MAX_REFERENCES),
        )),
        Some(_) => {}
    }

    for (field, ids) in [("depends_on", &entry.depends_on), ("superseded_by", &entry.superseded_by)] {
        for id in ids.iter().flatten() {
            if id.ends_with(".json") {
                issues.push(ValidationIssue::error(
                    field,
                    format!("'{}' should be an entry id without the .json extension", id),
                ));
            }
        }
    }

    if let Some(pv) = &entry.programmatic_verification {
        if pv.code.iter().all(|line| line.trim().is_empty()) {
            issues.push(ValidationIssue::error("programmatic_verification", "code is empty"));
        }
        if pv.language.trim().is_empty() {
            issues.push(ValidationIssue::warning("programmatic_verification", "language not stated"));
        }
    }

    issues
}

fn check_equations(entry: &Entry, issues: &mut Vec<ValidationIssue>) {
    let equations = entry.result_equations.as_deref().unwrap_or_default();
    if equations.is_empty() {
        issues.push(ValidationIssue::error("result_equations", "at least one equation is required"));
        return;
    }
    let mut seen = FxHashSet::default();
    for eq in equations {
        if !seen.insert(eq.id.as_str()) {
            issues.push(ValidationIssue::error(
                "result_equations",
                format!("duplicate equation id '{}'", eq.id),
            ));
        }
    }
}

fn check_derivation(entry: &Entry, issues: &mut Vec<ValidationIssue>) {
    let steps = entry.derivation.as_deref().unwrap_or_default();
    if steps.is_empty() {
        issues.push(ValidationIssue::error("derivation", "at least one derivation step is required"));
        return;
    }

    let mut seen = FxHashSet::default();
    for step in steps {
        if step.step == 0 {
            issues.push(ValidationIssue::error("derivation", "step numbers start at 1"));
        }
        if !seen.insert(step.step) {
            issues.push(ValidationIssue::warning(
                "derivation",
                format!("step {} appears more than once", step.step),
            ));
        }
        if let Some(proven) = &step.equation_proven {
            if entry.equation(proven).is_none() {
                issues.push(ValidationIssue::error(
                    "derivation",
                    format!("step {} proves unknown equation '{}'", step.step, proven),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::types::{Definition, DerivationStep, Reference, ResultEquation};

    fn make_valid_entry() -> Entry {
        Entry {
            result_id: "ohms_law".to_string(),
            result_name: "Ohm's Law".to_string(),
            result_equations: Some(vec![ResultEquation {
                id: "eq1".to_string(),
                equation: "V = I R".to_string(),
                equation_title: None,
            }]),
            explanation: "Voltage is proportional to current.".to_string(),
            definitions: Some(vec![Definition {
                symbol: "V".to_string(),
                definition: "Voltage".to_string(),
            }]),
            derivation: Some(vec![DerivationStep {
                step: 1,
                description: "Empirical law.".to_string(),
                equation: "V = I R".to_string(),
                equation_proven: Some("eq1".to_string()),
                assumptions: None,
            }]),
            references: Some(vec![Reference {
                id: "R1".to_string(),
                citation: "Ohm, G. S. (1827).".to_string(),
            }]),
            domain: "physics.class-ph".to_string(),
            ..Entry::skeleton()
        }
    }

    #[test]
    fn test_valid_entry_has_no_issues() {
        let issues = validate_entry(&make_valid_entry(), Some("ohms_law"));
        assert!(issues.is_empty(), "unexpected issues: {:?}", issues);
    }

    #[test]
    fn test_id_and_filename_mismatch() {
        let mut entry = make_valid_entry();
        entry.result_id = "Ohms-Law".to_string();
        let issues = validate_entry(&entry, Some("ohms_law"));
        assert_eq!(issues.iter().filter(|i| i.field == "result_id").count(), 2);
    }

    #[test]
    fn test_unknown_proven_equation_and_duplicate_steps() {
        let mut entry = make_valid_entry();
        let mut steps = entry.derivation.take().unwrap();
        steps[0].equation_proven = Some("eq9".to_string());
        steps.push(steps[0].clone());
        entry.derivation = Some(steps);

        let issues = validate_entry(&entry, None);
        assert!(issues.iter().any(|i| i.message.contains("unknown equation 'eq9'")));
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::Warning && i.message.contains("more than once")));
    }

    #[test]
    fn test_too_many_references() {
        let mut entry = make_valid_entry();
        let reference = entry.references.as_ref().unwrap()[0].clone();
        entry.references = Some(vec![reference; 4]);
        let issues = validate_entry(&entry, None);
        assert!(issues.iter().any(|i| i.field == "references"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify_result_id("Ohm's Law (DC)"), "ohms_law_dc");
        assert_eq!(slugify_result_id("  Maxwell   Equations "), "maxwell_equations");
        assert!(is_valid_result_id(&slugify_result_id("Schrödinger Equation 2")));
    }
}
