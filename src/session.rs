//! One editing session: the form, the raw JSON pane and the submission state.
//!
//! Owned by the binding layer; there is no process-wide editor.

use crate::config::SubmissionConfig;
use crate::dataset::Dataset;
use crate::entry::{AssumptionCatalog, Entry};
use crate::error::{FormError, LoadError, SubmissionError};
use crate::form::{FormLayout, FormSynchronizer, JsonEditor, MathTypesetter};
use crate::preview::PreviewRenderer;
use crate::submission::{ChangeRequest, DeliveryChannel, Packager, SubmissionKind, SubmissionReceipt};
use chrono::NaiveDate;

pub struct EditorSession<T: MathTypesetter> {
    form: FormSynchronizer<T>,
    kind: SubmissionKind,
    request: ChangeRequest,
    catalog: AssumptionCatalog,
    packager: Packager,
    json: Option<JsonEditor>,
}

impl<T: MathTypesetter> EditorSession<T> {
    /// Blank form for a new contribution.
    pub fn new_entry(layout: FormLayout, typesetter: T, config: SubmissionConfig) -> Self {
        Self::start(layout, typesetter, config, SubmissionKind::NewEntry)
    }

    /// Form prefilled with `original`; submissions are modifications of it.
    pub fn edit(layout: FormLayout, typesetter: T, config: SubmissionConfig, original: Entry) -> Self {
        Self::start(layout, typesetter, config, SubmissionKind::Modification { original })
    }

    /// Edit session for `entries/<id>.json`, with the dataset's assumption
    /// catalog when it is available.
    pub fn open(
        dataset: &Dataset,
        id: &str,
        layout: FormLayout,
        typesetter: T,
        config: SubmissionConfig,
    ) -> Result<Self, LoadError> {
        let loaded = dataset.load_entry(id)?;
        for dropped in &loaded.migration.dropped {
            tracing::warn!("{}: legacy field '{}' was not carried over", id, dropped);
        }
        let mut session = Self::edit(layout, typesetter, config, loaded.entry);
        session.catalog = dataset.load_catalog_or_empty();
        Ok(session)
    }

    fn start(layout: FormLayout, typesetter: T, config: SubmissionConfig, kind: SubmissionKind) -> Self {
        let mut form = FormSynchronizer::new(layout, typesetter);
        form.populate(kind.original().unwrap_or(&Entry::skeleton()));
        Self {
            form,
            kind,
            request: ChangeRequest::default(),
            catalog: AssumptionCatalog::default(),
            packager: Packager::new(config),
            json: None,
        }
    }

    pub fn with_catalog(mut self, catalog: AssumptionCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn form(&self) -> &FormSynchronizer<T> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormSynchronizer<T> {
        &mut self.form
    }

    pub fn kind(&self) -> &SubmissionKind {
        &self.kind
    }

    pub fn request(&self) -> &ChangeRequest {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut ChangeRequest {
        &mut self.request
    }

    /// Collect the form and render the preview fragment.
    pub fn preview(&mut self) -> String {
        let entry = self.form.collect();
        PreviewRenderer::with_catalog(&self.catalog).render(entry)
    }

    /// Collect the form as persisted JSON.
    pub fn export_json(&mut self) -> Result<String, serde_json::Error> {
        self.form.collect().to_pretty_json()
    }

    /// Switch to the raw JSON pane, seeded from the current form state.
    pub fn open_json_pane(&mut self) -> Result<&JsonEditor, FormError> {
        let entry = self.form.collect().clone();
        let editor = match self.json.take() {
            Some(mut editor) => {
                editor.sync_from(&entry)?;
                editor
            }
            None => JsonEditor::new(&entry)?,
        };
        Ok(self.json.insert(editor))
    }

    pub fn json_pane(&self) -> Option<&JsonEditor> {
        self.json.as_ref()
    }

    /// Text typed into the JSON pane. Valid JSON is pushed into the form;
    /// invalid JSON leaves the form on the last good entry.
    pub fn apply_json(&mut self, text: impl Into<String>) -> Result<(), FormError> {
        let editor = match self.json.take() {
            Some(editor) => editor,
            None => JsonEditor::new(self.form.entry())?,
        };
        let entry = self.json.insert(editor).update(text)?.clone();
        self.form.populate(&entry);
        Ok(())
    }

    /// Back to the loaded entry (or a blank form for new entries).
    pub fn reset(&mut self) {
        let original = self.kind.original().cloned().unwrap_or_default();
        self.form.reset(&original);
        if let Some(editor) = self.json.as_mut() {
            if let Err(e) = editor.sync_from(&original) {
                tracing::warn!("JSON pane not reset: {}", e);
            }
        }
        tracing::debug!("Session reset");
    }

    /// Collect, validate, package and deliver once.
    pub fn submit<D: DeliveryChannel + ?Sized>(
        &mut self,
        channel: &mut D,
        today: NaiveDate,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let entry = self.form.collect();
        self.packager.submit(channel, &self.kind, entry, &self.request, today)
    }

    /// `submit` dated today.
    pub fn submit_now<D: DeliveryChannel + ?Sized>(&mut self, channel: &mut D) -> Result<SubmissionReceipt, SubmissionError> {
        self.submit(channel, chrono::Local::now().date_naive())
    }
}
