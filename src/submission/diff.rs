//! Shallow field-by-field comparison of an original entry and its edit.

use crate::entry::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffField {
    Name,
    Explanation,
    Equations,
    Definitions,
    References,
}

impl DiffField {
    pub const ALL: [DiffField; 5] = [
        DiffField::Name,
        DiffField::Explanation,
        DiffField::Equations,
        DiffField::Definitions,
        DiffField::References,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DiffField::Name => "Name",
            DiffField::Explanation => "Explanation",
            DiffField::Equations => "Equations",
            DiffField::Definitions => "Definitions",
            DiffField::References => "References",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChange {
    Changed,
    Unchanged,
}

impl FieldChange {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldChange::Changed => "changed",
            FieldChange::Unchanged => "unchanged",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSummary {
    pub fields: Vec<(DiffField, FieldChange)>,
    /// `(old, new)` when the name changed.
    pub renamed: Option<(String, String)>,
}

/// Absent and empty lists compare equal.
fn same_list<T: PartialEq>(a: &Option<Vec<T>>, b: &Option<Vec<T>>) -> bool {
    a.as_deref().unwrap_or_default() == b.as_deref().unwrap_or_default()
}

pub fn diff_entries(original: &Entry, current: &Entry) -> ChangeSummary {
    let fields = DiffField::ALL
        .into_iter()
        .map(|field| {
            let same = match field {
                DiffField::Name => original.result_name == current.result_name,
                DiffField::Explanation => original.explanation == current.explanation,
                DiffField::Equations => same_list(&original.result_equations, &current.result_equations),
                DiffField::Definitions => same_list(&original.definitions, &current.definitions),
                DiffField::References => same_list(&original.references, &current.references),
            };
            let change = if same { FieldChange::Unchanged } else { FieldChange::Changed };
            (field, change)
        })
        .collect();

    let renamed = (original.result_name != current.result_name)
        .then(|| (original.result_name.clone(), current.result_name.clone()));

    ChangeSummary { fields, renamed }
}

impl ChangeSummary {
    pub fn status(&self, field: DiffField) -> FieldChange {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, change)| *change)
            .unwrap_or(FieldChange::Unchanged)
    }

    pub fn changed(&self) -> impl Iterator<Item = DiffField> + '_ {
        self.fields
            .iter()
            .filter(|(_, change)| *change == FieldChange::Changed)
            .map(|(field, _)| *field)
    }

    pub fn has_changes(&self) -> bool {
        self.changed().next().is_some()
    }

    /// Markdown bullet list of the changed fields.
    pub fn to_markdown(&self) -> String {
        let lines: Vec<String> = self
            .changed()
            .map(|field| match (field, &self.renamed) {
                (DiffField::Name, Some((old, new))) => {
                    format!("- **Name changed:** \"{}\" → \"{}\"", old, new)
                }
                _ => format!("- **{} modified**", field.label()),
            })
            .collect();
        if lines.is_empty() {
            "- Various modifications made".to_string()
        } else {
            lines.join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Definition;

    #[test]
    fn test_rename_and_unchanged_fields() {
        let original = Entry {
            result_name: "Ohm Law".to_string(),
            definitions: None,
            ..Entry::skeleton()
        };
        let current = Entry {
            result_name: "Ohm's Law".to_string(),
            definitions: Some(Vec::new()),
            ..Entry::skeleton()
        };

        let summary = diff_entries(&original, &current);
        assert_eq!(summary.status(DiffField::Name), FieldChange::Changed);
        assert_eq!(summary.status(DiffField::Definitions), FieldChange::Unchanged);
        assert_eq!(summary.to_markdown(), "- **Name changed:** \"Ohm Law\" → \"Ohm's Law\"");
    }

    #[test]
    fn test_list_changes_and_fallback() {
        let original = Entry::skeleton();
        assert_eq!(diff_entries(&original, &original).to_markdown(), "- Various modifications made");

        let current = Entry {
            explanation: "new".to_string(),
            definitions: Some(vec![Definition {
                symbol: "R".to_string(),
                definition: "Resistance".to_string(),
            }]),
            ..Entry::skeleton()
        };
        let summary = diff_entries(&original, &current);
        let changed: Vec<_> = summary.changed().collect();
        assert_eq!(changed, vec![DiffField::Explanation, DiffField::Definitions]);
        assert_eq!(
            summary.to_markdown(),
            "- **Explanation modified**\n- **Definitions modified**"
        );
    }
}
