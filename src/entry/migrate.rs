//! Legacy shape migration.
//!
//! Older entries spread assumptions over `equations_assumptions` /
//! `derivation_assumptions`, kept step prose in `derivation_explanation`,
//! named dependencies `dependencies` and credited a single `created_by`.
//! Everything is rewritten into the unified shape before typed deserialization,
//! so the rest of the crate only ever sees one `Entry` layout.

use super::types::Entry;
use serde::de::Error as _;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaVersion {
    Legacy,
    #[default]
    Unified,
}

/// What the migration did to one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub version: SchemaVersion,
    pub rewrites: Vec<String>,
    pub dropped: Vec<String>,
}

impl MigrationReport {
    fn rewrite(&mut self, result_id: &str, what: &str) {
        tracing::debug!(result_id, "legacy field migrated: {}", what);
        self.version = SchemaVersion::Legacy;
        self.rewrites.push(what.to_string());
    }

    fn drop_field(&mut self, result_id: &str, what: &str) {
        tracing::warn!(result_id, "legacy field dropped: {}", what);
        self.version = SchemaVersion::Legacy;
        self.dropped.push(what.to_string());
    }
}

/// Parse a JSON document of either shape into an `Entry`.
pub fn parse_entry(text: &str) -> Result<(Entry, MigrationReport), serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    migrate_value(value)
}

pub fn migrate_value(value: Value) -> Result<(Entry, MigrationReport), serde_json::Error> {
    let mut map = match value {
        Value::Object(map) => map,
        other => {
            return Err(serde_json::Error::custom(format!(
                "expected an entry object, found {}",
                json_kind(&other)
            )))
        }
    };

    let result_id = map
        .get("result_id")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let mut report = MigrationReport::default();

    for key in ["equations_assumptions", "derivation_assumptions"] {
        if let Some(items) = map.remove(key) {
            append_assumptions(&mut map, legacy_texts(&items));
            report.rewrite(&result_id, &format!("{} -> assumptions", key));
        }
    }

    if let Some(explanations) = map.remove("derivation_explanation") {
        merge_step_descriptions(&mut map, &explanations);
        report.rewrite(&result_id, "derivation_explanation -> derivation[].description");
    }

    if let Some(deps) = map.remove("dependencies") {
        if map.contains_key("depends_on") {
            report.drop_field(&result_id, "dependencies (depends_on already present)");
        } else {
            map.insert("depends_on".to_string(), deps);
            report.rewrite(&result_id, "dependencies -> depends_on");
        }
    }

    if let Some(created_by) = map.remove("created_by") {
        match created_by.as_str().map(str::trim) {
            Some(name) if !name.is_empty() && !map.contains_key("contributors") => {
                map.insert(
                    "contributors".to_string(),
                    json!([{ "full_name": name, "identifier": "" }]),
                );
                report.rewrite(&result_id, "created_by -> contributors");
                // no identifier to carry over; strict form collection drops this contributor
                report.drop_field(&result_id, "created_by identifier");
            }
            _ => report.drop_field(&result_id, "created_by"),
        }
    }

    if let Some(regime) = map.remove("validity_regime") {
        let conditions = regime.get("conditions").map(legacy_texts).unwrap_or_default();
        if !conditions.is_empty() {
            append_assumptions(&mut map, conditions);
            report.rewrite(&result_id, "validity_regime.conditions -> assumptions");
        }
        let has_limitations = regime
            .get("limitations")
            .and_then(Value::as_array)
            .is_some_and(|items| !items.is_empty());
        if has_limitations {
            report.drop_field(&result_id, "validity_regime.limitations");
        }
    }

    if map.get("theory_status").and_then(Value::as_str) == Some("") {
        map.remove("theory_status");
    }

    let entry: Entry = serde_json::from_value(Value::Object(map))?;
    Ok((entry, report))
}

/// Texts from a legacy list of either plain strings or `{ "text": .. }` objects.
fn legacy_texts(items: &Value) -> Vec<String> {
    let Some(items) = items.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.as_str()),
            Value::Object(obj) => obj.get("text").and_then(Value::as_str),
            _ => None,
        })
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn append_assumptions(map: &mut Map<String, Value>, texts: Vec<String>) {
    if texts.is_empty() {
        return;
    }
    let slot = map
        .entry("assumptions".to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    // a non-array value is left for serde to reject
    let Some(existing) = slot.as_array_mut() else {
        return;
    };
    for text in texts {
        if !existing.iter().any(|v| v.as_str() == Some(text.as_str())) {
            existing.push(Value::String(text));
        }
    }
}

fn merge_step_descriptions(map: &mut Map<String, Value>, explanations: &Value) {
    let Some(explanations) = explanations.as_array() else {
        return;
    };
    let Some(steps) = map.get_mut("derivation").and_then(Value::as_array_mut) else {
        return;
    };

    for explanation in explanations {
        let (Some(step_no), Some(text)) = (
            explanation.get("step").and_then(Value::as_u64),
            explanation.get("text").and_then(Value::as_str),
        ) else {
            continue;
        };

        let target = steps.iter_mut().find(|step| {
            step.get("step").and_then(Value::as_u64) == Some(step_no)
        });
        if let Some(Value::Object(step)) = target {
            let empty = step
                .get("description")
                .and_then(Value::as_str)
                .map_or(true, |d| d.trim().is_empty());
            if empty {
                step.insert("description".to_string(), Value::String(text.to_string()));
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::types::Contributor;

    fn make_legacy_entry() -> Value {
        json!({
            "result_id": "newtons_second_law",
            "result_name": "Newton's Second Law",
            "result_equations": [{ "id": "eq1", "equation": "F = m a" }],
            "explanation": "Force equals mass times acceleration.",
            "equations_assumptions": [
                { "id": "A1", "text": "Mass is constant" }
            ],
            "derivation_assumptions": [
                { "id": "A2", "text": "Inertial frame" },
                { "id": "A3", "text": "Mass is constant" }
            ],
            "derivation": [
                { "step": 1, "equation": "p = m v" },
                { "step": 2, "description": "kept", "equation": "F = dp/dt" }
            ],
            "derivation_explanation": [
                { "step": 1, "text": "Define momentum." },
                { "step": 2, "text": "ignored, description present" }
            ],
            "dependencies": ["momentum_definition"],
            "created_by": "Isaac Newton",
            "domain": "physics.class-ph"
        })
    }

    #[test]
    fn test_legacy_entry_migrates() {
        let (entry, report) = migrate_value(make_legacy_entry()).unwrap();

        assert_eq!(report.version, SchemaVersion::Legacy);
        assert_eq!(
            entry.assumptions,
            Some(vec!["Mass is constant".to_string(), "Inertial frame".to_string()]),
            "duplicate assumption texts should collapse"
        );
        let steps = entry.derivation.unwrap();
        assert_eq!(steps[0].description, "Define momentum.");
        assert_eq!(steps[1].description, "kept");
        assert_eq!(entry.depends_on, Some(vec!["momentum_definition".to_string()]));
        assert_eq!(
            entry.contributors,
            Some(vec![Contributor {
                full_name: "Isaac Newton".to_string(),
                identifier: String::new(),
            }])
        );
        assert!(report.rewrites.contains(&"created_by -> contributors".to_string()));
        assert_eq!(report.dropped, vec!["created_by identifier".to_string()]);
    }

    #[test]
    fn test_unified_entry_untouched() {
        let (entry, report) = parse_entry(
            r#"{"result_id": "x", "result_name": "X", "assumptions": ["a"], "domain": "gr-qc"}"#,
        )
        .unwrap();
        assert_eq!(report.version, SchemaVersion::Unified);
        assert!(report.rewrites.is_empty());
        assert_eq!(entry.assumptions, Some(vec!["a".to_string()]));
    }

    #[test]
    fn test_validity_regime_limitations_reported() {
        let (entry, report) = migrate_value(json!({
            "result_id": "ideal_gas",
            "validity_regime": {
                "conditions": ["Low pressure"],
                "limitations": ["Fails near condensation"]
            }
        }))
        .unwrap();
        assert_eq!(entry.assumptions, Some(vec!["Low pressure".to_string()]));
        assert_eq!(report.dropped, vec!["validity_regime.limitations".to_string()]);
    }

    #[test]
    fn test_non_object_rejected() {
        let err = parse_entry("[1, 2]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }
}
