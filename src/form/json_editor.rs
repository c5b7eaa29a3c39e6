//! Raw JSON editing pane.
//!
//! Every keystroke is re-parsed. A parse failure keeps the last good entry
//! and shows the error inline.

use crate::entry::{parse_entry, Entry};
use crate::error::FormError;
use askama_escape::{escape, Html};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonStatus {
    Valid,
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct JsonEditor {
    text: String,
    last_good: Entry,
    status: JsonStatus,
}

impl JsonEditor {
    pub fn new(entry: &Entry) -> Result<Self, FormError> {
        Ok(Self {
            text: entry.to_pretty_json()?,
            last_good: entry.clone(),
            status: JsonStatus::Valid,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Last entry that parsed successfully.
    pub fn entry(&self) -> &Entry {
        &self.last_good
    }

    pub fn status(&self) -> &JsonStatus {
        &self.status
    }

    pub fn update(&mut self, text: impl Into<String>) -> Result<&Entry, FormError> {
        self.text = text.into();
        match parse_entry(&self.text) {
            Ok((entry, _)) => {
                self.last_good = entry;
                self.status = JsonStatus::Valid;
                Ok(&self.last_good)
            }
            Err(e) => {
                tracing::debug!("JSON editor rejected input: {}", e);
                self.status = JsonStatus::Invalid(e.to_string());
                Err(FormError::InvalidJson(e))
            }
        }
    }

    /// Replace the text with a fresh rendering of `entry` (tab switch from the
    /// structured form).
    pub fn sync_from(&mut self, entry: &Entry) -> Result<(), FormError> {
        self.text = entry.to_pretty_json()?;
        self.last_good = entry.clone();
        self.status = JsonStatus::Valid;
        Ok(())
    }

    pub fn status_html(&self) -> String {
        match &self.status {
            JsonStatus::Valid => "<div class=\"validation-message valid\">✓ Valid JSON</div>".to_string(),
            JsonStatus::Invalid(message) => format!(
                "<div class=\"validation-message invalid\">✗ Invalid JSON: {}</div>",
                escape(message, Html)
            ),
        }
    }
}
