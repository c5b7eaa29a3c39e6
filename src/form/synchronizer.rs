//! Two-way mapping between an `Entry` and the form surface.
//!
//! `populate` pushes an entry into the surface, `collect` reduces the surface
//! back into a fresh entry. Rows missing a required field are dropped on
//! collection and empty sections come back as `None`.

use super::rows::RowKind;
use super::surface::{FormLayout, FormSurface, Row, RowHandle, ScalarField};
use crate::entry::{
    Contributor, Definition, DerivationStep, Entry, HistoricalContext, ProgrammaticVerification,
    Reference, ResultEquation, ReviewStatus, TheoryStatus,
};
use crate::error::FormError;
use std::collections::BTreeMap;

/// Receives live math previews for rows with an equation field.
pub trait MathTypesetter {
    fn typeset(&mut self, row: RowHandle, markup: &str);
    fn clear(&mut self, row: RowHandle);
}

/// Typesetter for headless use (CLI, batch).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTypesetter;

impl MathTypesetter for NoopTypesetter {
    fn typeset(&mut self, _row: RowHandle, _markup: &str) {}
    fn clear(&mut self, _row: RowHandle) {}
}

/// Markup handed to the typesetter: the raw equation between math delimiters.
pub fn preview_markup(equation: &str) -> String {
    format!("`{}`", equation.trim())
}

pub struct FormSynchronizer<T: MathTypesetter = NoopTypesetter> {
    surface: FormSurface,
    typesetter: T,
    counters: BTreeMap<RowKind, u32>,
    entry: Entry,
}

impl<T: MathTypesetter> FormSynchronizer<T> {
    pub fn new(layout: FormLayout, typesetter: T) -> Self {
        Self {
            surface: FormSurface::new(layout),
            typesetter,
            counters: BTreeMap::new(),
            entry: Entry::skeleton(),
        }
    }

    pub fn surface(&self) -> &FormSurface {
        &self.surface
    }

    pub fn typesetter(&self) -> &T {
        &self.typesetter
    }

    /// The entry as of the last `populate` or `collect`.
    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn populate(&mut self, entry: &Entry) {
        self.entry = entry.clone();

        let pv = entry.programmatic_verification.as_ref();
        let hc = entry.historical_context.as_ref();
        let scalars: [(ScalarField, String); 11] = [
            (ScalarField::ResultId, entry.result_id.clone()),
            (ScalarField::ResultName, entry.result_name.clone()),
            (ScalarField::Explanation, entry.explanation.clone()),
            (ScalarField::Domain, entry.domain.clone()),
            (
                ScalarField::TheoryStatus,
                entry.theory_status.map(|s| s.as_str()).unwrap_or_default().to_string(),
            ),
            (ScalarField::ReviewStatus, entry.review_status.as_str().to_string()),
            (ScalarField::VerificationLanguage, pv.map(|p| p.language.clone()).unwrap_or_default()),
            (ScalarField::VerificationLibrary, pv.map(|p| p.library.clone()).unwrap_or_default()),
            (ScalarField::VerificationCode, pv.map(|p| p.code.join("\n")).unwrap_or_default()),
            (
                ScalarField::HistoricalImportance,
                hc.and_then(|h| h.importance.clone()).unwrap_or_default(),
            ),
            (
                ScalarField::DevelopmentPeriod,
                hc.and_then(|h| h.development_period.clone()).unwrap_or_default(),
            ),
        ];
        for (field, value) in scalars {
            self.surface.set_scalar(field, value);
        }

        for kind in RowKind::ALL {
            for row in self.surface.rows(kind) {
                if row.preview().is_some() {
                    self.typesetter.clear(row.handle);
                }
            }
            self.surface.clear_section(kind);
            self.counters.remove(&kind);
        }

        for eq in entry.result_equations.iter().flatten() {
            self.fill(
                RowKind::Equation,
                &[
                    ("id", eq.id.as_str()),
                    ("equation", eq.equation.as_str()),
                    ("equation_title", eq.equation_title.as_deref().unwrap_or_default()),
                ],
            );
        }
        for def in entry.definitions.iter().flatten() {
            self.fill(
                RowKind::Definition,
                &[("symbol", def.symbol.as_str()), ("definition", def.definition.as_str())],
            );
        }
        for text in entry.assumptions.iter().flatten() {
            self.fill(RowKind::Assumption, &[("text", text.as_str())]);
        }
        for id in entry.depends_on.iter().flatten() {
            self.fill(RowKind::Dependency, &[("entry_id", id.as_str())]);
        }
        for step in entry.derivation.iter().flatten() {
            let number = step.step.to_string();
            let assumptions = step.assumptions.as_deref().unwrap_or_default().join(", ");
            self.fill(
                RowKind::DerivationStep,
                &[
                    ("step", number.as_str()),
                    ("description", step.description.as_str()),
                    ("equation", step.equation.as_str()),
                    ("equation_proven", step.equation_proven.as_deref().unwrap_or_default()),
                    ("assumptions", assumptions.as_str()),
                ],
            );
        }
        for reference in entry.references.iter().flatten() {
            self.fill(
                RowKind::Reference,
                &[("id", reference.id.as_str()), ("citation", reference.citation.as_str())],
            );
        }
        for contributor in entry.contributors.iter().flatten() {
            self.fill(
                RowKind::Contributor,
                &[
                    ("full_name", contributor.full_name.as_str()),
                    ("identifier", contributor.identifier.as_str()),
                ],
            );
        }
        for id in entry.superseded_by.iter().flatten() {
            self.fill(RowKind::SupersededBy, &[("entry_id", id.as_str())]);
        }
        for insight in hc.and_then(|h| h.key_insights.as_ref()).into_iter().flatten() {
            self.fill(RowKind::KeyInsight, &[("text", insight.as_str())]);
        }

        for kind in RowKind::ALL {
            if !self.surface.has_section(kind) {
                continue;
            }
            let have = self.surface.rows(kind).len();
            for _ in have..kind.template().min_rows {
                self.fill(kind, &[]);
            }
        }

        tracing::debug!(
            result_id = %entry.result_id,
            rows = self.surface.row_count(),
            "form populated"
        );
    }

    /// Append a row, optionally prefilled with `(field, value)` pairs.
    pub fn add_row(&mut self, kind: RowKind, prefill: &[(&str, &str)]) -> Result<RowHandle, FormError> {
        let template = kind.template();
        if !self.surface.has_section(kind) {
            return Err(FormError::SectionNotRendered(template.section_id));
        }

        let mut values = Vec::with_capacity(template.fields.len());
        for (name, value) in prefill {
            let spec = template.field(name).ok_or_else(|| FormError::UnknownField {
                kind: kind.as_str(),
                field: name.to_string(),
            })?;
            values.push((spec.name, value.to_string()));
        }

        let existing = self.surface.rows(kind).len();
        let has_id = values.iter().any(|(n, _)| *n == "id");
        let has_step = values.iter().any(|(n, _)| *n == "step");
        match kind {
            RowKind::Reference if !has_id => {
                values.push(("id", format!("R{}", existing + 1)));
            }
            RowKind::DerivationStep if !has_step => {
                values.push(("step", (existing + 1).to_string()));
            }
            _ => {}
        }

        let counter = self.counters.entry(kind).or_insert(0);
        *counter += 1;
        let display_index = *counter;

        let handle = self
            .surface
            .append_row(kind, display_index)
            .ok_or(FormError::SectionNotRendered(template.section_id))?;
        if let Some(row) = self.surface.row_mut(handle) {
            for (name, value) in values {
                row.set(name, value);
            }
        }
        self.refresh_preview(handle);

        tracing::trace!(kind = kind.as_str(), %handle, "row added");
        Ok(handle)
    }

    /// Input event on one cell of a row.
    pub fn edit_cell(&mut self, handle: RowHandle, field: &str, value: impl Into<String>) -> Result<(), FormError> {
        let row = self
            .surface
            .row_mut(handle)
            .ok_or(FormError::UnknownRow(handle.id()))?;
        let template = row.kind.template();
        let spec = template.field(field).ok_or_else(|| FormError::UnknownField {
            kind: row.kind.as_str(),
            field: field.to_string(),
        })?;
        row.set(spec.name, value.into());

        if template.preview_field == Some(spec.name) {
            self.refresh_preview(handle);
        }
        Ok(())
    }

    /// Input event on a scalar field. Returns `false` when the page lacks it.
    pub fn set_scalar(&mut self, field: ScalarField, value: impl Into<String>) -> bool {
        self.surface.set_scalar(field, value)
    }

    pub fn remove(&mut self, handle: RowHandle) -> Result<(), FormError> {
        let row = self
            .surface
            .remove_row(handle)
            .ok_or(FormError::UnknownRow(handle.id()))?;
        if row.preview().is_some() {
            self.typesetter.clear(handle);
        }
        tracing::trace!(kind = row.kind.as_str(), %handle, "row removed");
        Ok(())
    }

    /// Discard in-progress edits.
    pub fn reset(&mut self, original: &Entry) {
        self.populate(original);
    }

    /// Collect the surface and make the result the current entry.
    pub fn collect(&mut self) -> &Entry {
        self.entry = self.collect_entry();
        &self.entry
    }

    /// Build a fresh entry from the surface without touching the held one.
    pub fn collect_entry(&self) -> Entry {
        let surface = &self.surface;
        let raw = move |field: ScalarField| surface.scalar(field).unwrap_or_default();
        let filled = move |field: ScalarField| {
            surface
                .scalar(field)
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let result_equations = self.collect_rows(RowKind::Equation, |row| {
            Some(ResultEquation {
                id: row.filled("id")?.to_string(),
                equation: row.filled("equation")?.to_string(),
                equation_title: row.filled("equation_title").map(str::to_string),
            })
        });

        let definitions = self.collect_rows(RowKind::Definition, |row| {
            Some(Definition {
                symbol: row.filled("symbol")?.to_string(),
                definition: row.filled("definition")?.to_string(),
            })
        });

        let mut derivation = self.collect_rows(RowKind::DerivationStep, |row| {
            let step = row.filled("step")?.parse::<u32>().ok().filter(|n| *n >= 1)?;
            Some(DerivationStep {
                step,
                description: row.filled("description")?.to_string(),
                equation: row.filled("equation")?.to_string(),
                equation_proven: row.filled("equation_proven").map(str::to_string),
                assumptions: split_list(row.value("assumptions")),
            })
        });
        // stable: equal step numbers keep their row order
        if let Some(steps) = derivation.as_mut() {
            steps.sort_by_key(|s| s.step);
        }

        let mut reference_no = 0;
        let references = self.collect_rows(RowKind::Reference, |row| {
            reference_no += 1;
            Some(Reference {
                id: row
                    .filled("id")
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("R{}", reference_no)),
                citation: row.filled("citation")?.to_string(),
            })
        });

        let contributors = self.collect_rows(RowKind::Contributor, |row| {
            Some(Contributor {
                full_name: row.filled("full_name")?.to_string(),
                identifier: row.filled("identifier")?.to_string(),
            })
        });

        let code: Vec<String> = raw(ScalarField::VerificationCode)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        let language = filled(ScalarField::VerificationLanguage);
        let library = filled(ScalarField::VerificationLibrary);
        let programmatic_verification = if language.is_none() && library.is_none() && code.is_empty() {
            None
        } else {
            Some(ProgrammaticVerification {
                language: language.unwrap_or_default().to_string(),
                library: library.unwrap_or_default().to_string(),
                code,
            })
        };

        let importance = filled(ScalarField::HistoricalImportance).map(str::to_string);
        let development_period = filled(ScalarField::DevelopmentPeriod).map(str::to_string);
        let key_insights = self.collect_text_rows(RowKind::KeyInsight, "text");
        let historical_context =
            if importance.is_none() && development_period.is_none() && key_insights.is_none() {
                None
            } else {
                Some(HistoricalContext { importance, development_period, key_insights })
            };

        Entry {
            result_id: raw(ScalarField::ResultId).trim().to_string(),
            result_name: raw(ScalarField::ResultName).trim().to_string(),
            result_equations,
            explanation: raw(ScalarField::Explanation).to_string(),
            definitions,
            assumptions: self.collect_text_rows(RowKind::Assumption, "text"),
            depends_on: self.collect_text_rows(RowKind::Dependency, "entry_id"),
            derivation,
            programmatic_verification,
            domain: raw(ScalarField::Domain).trim().to_string(),
            theory_status: filled(ScalarField::TheoryStatus).and_then(TheoryStatus::parse),
            superseded_by: self.collect_text_rows(RowKind::SupersededBy, "entry_id"),
            historical_context,
            references,
            contributors,
            review_status: ReviewStatus::parse_lenient(raw(ScalarField::ReviewStatus)),
        }
    }

    fn collect_rows<R>(&self, kind: RowKind, build: impl FnMut(&Row) -> Option<R>) -> Option<Vec<R>> {
        let items: Vec<R> = self
            .surface
            .rows(kind)
            .iter()
            .filter(|row| row.has_required_fields())
            .filter_map(build)
            .collect();
        (!items.is_empty()).then_some(items)
    }

    fn collect_text_rows(&self, kind: RowKind, field: &str) -> Option<Vec<String>> {
        self.collect_rows(kind, |row| row.filled(field).map(str::to_string))
    }

    /// Add a row during populate; sections the page does not render are skipped.
    fn fill(&mut self, kind: RowKind, prefill: &[(&str, &str)]) {
        if !self.surface.has_section(kind) {
            return;
        }
        if let Err(e) = self.add_row(kind, prefill) {
            tracing::debug!("populate skipped a {} row: {}", kind, e);
        }
    }

    fn refresh_preview(&mut self, handle: RowHandle) {
        let Some(row) = self.surface.row_mut(handle) else {
            return;
        };
        let Some(field) = row.kind.template().preview_field else {
            return;
        };
        let markup = row.filled(field).map(preview_markup);
        match &markup {
            Some(markup) => self.typesetter.typeset(handle, markup),
            None if row.preview().is_some() => self.typesetter.clear(handle),
            None => {}
        }
        row.set_preview(markup);
    }
}

/// Comma-separated list, blanks dropped.
fn split_list(raw: &str) -> Option<Vec<String>> {
    let items: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    (!items.is_empty()).then_some(items)
}
