//! In-memory form surface: the scalar inputs and repeated sections a page
//! renders. Page variants omit some fields; reads of an omitted field return
//! `None` and writes are ignored.

use super::rows::RowKind;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Stable identity of a row for the lifetime of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowHandle(u64);

impl RowHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScalarField {
    ResultId,
    ResultName,
    Explanation,
    Domain,
    TheoryStatus,
    ReviewStatus,
    VerificationLanguage,
    VerificationLibrary,
    VerificationCode,
    HistoricalImportance,
    DevelopmentPeriod,
}

impl ScalarField {
    pub const ALL: [ScalarField; 11] = [
        ScalarField::ResultId,
        ScalarField::ResultName,
        ScalarField::Explanation,
        ScalarField::Domain,
        ScalarField::TheoryStatus,
        ScalarField::ReviewStatus,
        ScalarField::VerificationLanguage,
        ScalarField::VerificationLibrary,
        ScalarField::VerificationCode,
        ScalarField::HistoricalImportance,
        ScalarField::DevelopmentPeriod,
    ];

    /// Input element id on the page.
    pub fn input_id(self) -> &'static str {
        match self {
            ScalarField::ResultId => "result_id",
            ScalarField::ResultName => "result_name",
            ScalarField::Explanation => "explanation",
            ScalarField::Domain => "domain",
            ScalarField::TheoryStatus => "theory_status",
            ScalarField::ReviewStatus => "review_status",
            ScalarField::VerificationLanguage => "prog_language",
            ScalarField::VerificationLibrary => "prog_library",
            ScalarField::VerificationCode => "prog_code",
            ScalarField::HistoricalImportance => "historical_importance",
            ScalarField::DevelopmentPeriod => "development_period",
        }
    }
}

/// Which inputs and sections a page variant renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormLayout {
    scalars: BTreeSet<ScalarField>,
    sections: BTreeSet<RowKind>,
}

impl FormLayout {
    /// Structured editor with every field.
    pub fn full() -> Self {
        Self {
            scalars: ScalarField::ALL.into_iter().collect(),
            sections: RowKind::ALL.into_iter().collect(),
        }
    }

    /// The older visual editor: core text fields plus equations, definitions
    /// and references only.
    pub fn basic() -> Self {
        Self {
            scalars: [
                ScalarField::ResultId,
                ScalarField::ResultName,
                ScalarField::Explanation,
                ScalarField::Domain,
                ScalarField::ReviewStatus,
            ]
            .into_iter()
            .collect(),
            sections: [RowKind::Equation, RowKind::Definition, RowKind::Reference]
                .into_iter()
                .collect(),
        }
    }

    pub fn without_section(mut self, kind: RowKind) -> Self {
        self.sections.remove(&kind);
        self
    }

    pub fn without_scalar(mut self, field: ScalarField) -> Self {
        self.scalars.remove(&field);
        self
    }

    pub fn has_scalar(&self, field: ScalarField) -> bool {
        self.scalars.contains(&field)
    }

    pub fn has_section(&self, kind: RowKind) -> bool {
        self.sections.contains(&kind)
    }
}

/// One repeated sub-form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub handle: RowHandle,
    pub kind: RowKind,
    /// Cosmetic number shown in the row header.
    pub display_index: u32,
    values: BTreeMap<&'static str, String>,
    preview: Option<String>,
}

impl Row {
    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Trimmed value, `None` when blank.
    pub fn filled(&self, field: &str) -> Option<&str> {
        let v = self.value(field).trim();
        (!v.is_empty()).then_some(v)
    }

    pub(crate) fn set(&mut self, field: &'static str, value: String) {
        self.values.insert(field, value);
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub(crate) fn set_preview(&mut self, markup: Option<String>) {
        self.preview = markup;
    }

    pub fn has_required_fields(&self) -> bool {
        self.kind
            .template()
            .required_fields()
            .all(|spec| self.filled(spec.name).is_some())
    }

    pub fn render(&self) -> String {
        self.kind
            .template()
            .render_row(self.handle.id(), self.display_index, |name| {
                self.values.get(name).map(String::as_str)
            })
    }
}

#[derive(Debug, Clone)]
pub struct FormSurface {
    layout: FormLayout,
    scalars: BTreeMap<ScalarField, String>,
    sections: BTreeMap<RowKind, Vec<Row>>,
    next_handle: u64,
}

impl FormSurface {
    pub fn new(layout: FormLayout) -> Self {
        let scalars = ScalarField::ALL
            .into_iter()
            .filter(|f| layout.has_scalar(*f))
            .map(|f| (f, String::new()))
            .collect();
        let sections = RowKind::ALL
            .into_iter()
            .filter(|k| layout.has_section(*k))
            .map(|k| (k, Vec::new()))
            .collect();
        Self { layout, scalars, sections, next_handle: 1 }
    }

    pub fn layout(&self) -> &FormLayout {
        &self.layout
    }

    pub fn scalar(&self, field: ScalarField) -> Option<&str> {
        self.scalars.get(&field).map(String::as_str)
    }

    /// Returns `false` when the page does not render this input.
    pub fn set_scalar(&mut self, field: ScalarField, value: impl Into<String>) -> bool {
        match self.scalars.get_mut(&field) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn has_section(&self, kind: RowKind) -> bool {
        self.sections.contains_key(&kind)
    }

    pub fn rows(&self, kind: RowKind) -> &[Row] {
        self.sections.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn row_count(&self) -> usize {
        self.sections.values().map(Vec::len).sum()
    }

    pub(crate) fn append_row(&mut self, kind: RowKind, display_index: u32) -> Option<RowHandle> {
        let rows = self.sections.get_mut(&kind)?;
        let handle = RowHandle(self.next_handle);
        self.next_handle += 1;
        rows.push(Row {
            handle,
            kind,
            display_index,
            values: BTreeMap::new(),
            preview: None,
        });
        Some(handle)
    }

    pub fn row(&self, handle: RowHandle) -> Option<&Row> {
        self.sections.values().flatten().find(|r| r.handle == handle)
    }

    pub(crate) fn row_mut(&mut self, handle: RowHandle) -> Option<&mut Row> {
        self.sections.values_mut().flatten().find(|r| r.handle == handle)
    }

    pub(crate) fn remove_row(&mut self, handle: RowHandle) -> Option<Row> {
        for rows in self.sections.values_mut() {
            if let Some(pos) = rows.iter().position(|r| r.handle == handle) {
                return Some(rows.remove(pos));
            }
        }
        None
    }

    pub(crate) fn clear_section(&mut self, kind: RowKind) {
        if let Some(rows) = self.sections.get_mut(&kind) {
            rows.clear();
        }
    }

    /// Markup of every row in a section, in order.
    pub fn render_section(&self, kind: RowKind) -> String {
        self.rows(kind).iter().map(Row::render).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrendered_fields_are_absent() {
        let mut surface = FormSurface::new(FormLayout::basic());
        assert_eq!(surface.scalar(ScalarField::ResultName), Some(""));
        assert_eq!(surface.scalar(ScalarField::TheoryStatus), None);
        assert!(!surface.set_scalar(ScalarField::TheoryStatus, "current"));
        assert!(surface.rows(RowKind::DerivationStep).is_empty());
        assert!(surface.append_row(RowKind::DerivationStep, 1).is_none());
    }

    #[test]
    fn test_handles_are_unique_and_removal_keeps_others() {
        let mut surface = FormSurface::new(FormLayout::full());
        let a = surface.append_row(RowKind::Definition, 1).unwrap();
        let b = surface.append_row(RowKind::Definition, 2).unwrap();
        let c = surface.append_row(RowKind::Equation, 1).unwrap();
        assert!(a != b && b != c);

        surface.remove_row(a).unwrap();
        let remaining = surface.rows(RowKind::Definition);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].display_index, 2, "rows are not renumbered");
        assert!(surface.row(c).is_some());
        assert!(surface.remove_row(a).is_none());
    }

    #[test]
    fn test_required_fields_check() {
        let mut surface = FormSurface::new(FormLayout::full());
        let h = surface.append_row(RowKind::Definition, 1).unwrap();
        let row = surface.row_mut(h).unwrap();
        row.set("symbol", "E".to_string());
        row.set("definition", "   ".to_string());
        assert!(!surface.row(h).unwrap().has_required_fields());
    }
}
