//! Turns a collected entry and its change request into a deliverable payload.

use super::channels::{Delivery, DeliveryChannel, TemplateParams};
use super::diff::{diff_entries, ChangeSummary};
use super::request::{ChangeRequest, SubmissionKind};
use crate::config::SubmissionConfig;
use crate::entry::validate::is_valid_result_id;
use crate::entry::Entry;
use crate::error::SubmissionError;
use chrono::NaiveDate;
use serde_json::{json, Value};

const EMAIL_FOOTER: &str = "---\nSubmitted via TheorIA structured entry editor";
const ISSUE_FOOTER: &str = "---\n*Submitted via TheorIA entry editor*";

/// Everything a channel needs, already formatted.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub kind_label: &'static str,
    pub subject: String,
    /// Pretty-printed entry, exactly as it would be persisted.
    pub entry_json: String,
    /// Email body.
    pub text_body: String,
    /// Issue body.
    pub markdown_body: String,
    pub change_summary: Option<ChangeSummary>,
    pub labels: Vec<String>,
    pub submitted_on: String,
    /// Copied onto the mail so the contributor keeps the thread.
    pub contributor_email: Option<String>,
    pub template_params: TemplateParams,
}

#[derive(Debug)]
pub struct SubmissionReceipt {
    pub payload: Payload,
    pub delivery: Delivery,
}

pub struct Packager {
    config: SubmissionConfig,
}

impl Packager {
    pub fn new(config: SubmissionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    /// Required-field check run before anything is packaged.
    pub fn validate(&self, kind: &SubmissionKind, entry: &Entry, request: &ChangeRequest) -> Result<(), SubmissionError> {
        let missing = match kind {
            SubmissionKind::Modification { .. } => request.missing_fields(),
            SubmissionKind::NewEntry => {
                let mut missing = Vec::new();
                if !is_valid_result_id(entry.result_id.trim()) {
                    missing.push("result_id");
                }
                if entry.result_name.trim().is_empty() {
                    missing.push("result_name");
                }
                missing
            }
        };

        if missing.is_empty() {
            Ok(())
        } else {
            tracing::debug!("Submission blocked, missing: {:?}", missing);
            Err(SubmissionError::Validation { missing })
        }
    }

    pub fn package(
        &self,
        kind: &SubmissionKind,
        entry: &Entry,
        request: &ChangeRequest,
        today: NaiveDate,
    ) -> Result<Payload, SubmissionError> {
        let entry_json = entry.to_pretty_json()?;
        let change_summary = kind.original().map(|original| diff_entries(original, entry));
        let changes = change_summary.as_ref().map(ChangeSummary::to_markdown);
        let submitted_on = today.format("%Y-%m-%d").to_string();

        let labels = match kind {
            SubmissionKind::NewEntry => self.config.new_entry_labels.clone(),
            SubmissionKind::Modification { .. } => self.config.modification_labels.clone(),
        };

        Ok(Payload {
            kind_label: kind.label(),
            subject: format!("{} {}", kind.tag(), entry.result_name.trim()),
            text_body: text_body(kind, entry, request, changes.as_deref(), &entry_json),
            markdown_body: markdown_body(kind, entry, request, changes.as_deref(), &entry_json),
            template_params: template_params(kind, entry, request, &submitted_on)?,
            entry_json,
            change_summary,
            labels,
            submitted_on,
            contributor_email: request.contributor_email.clone(),
        })
    }

    /// Validate, package and deliver once. Nothing reaches the channel when
    /// validation fails; delivery errors are not retried.
    pub fn submit<D: DeliveryChannel + ?Sized>(
        &self,
        channel: &mut D,
        kind: &SubmissionKind,
        entry: &Entry,
        request: &ChangeRequest,
        today: NaiveDate,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        self.validate(kind, entry, request)?;
        let payload = self.package(kind, entry, request, today)?;

        tracing::info!(
            "Delivering {} for '{}' via {}",
            payload.kind_label,
            entry.result_id,
            channel.name()
        );
        let delivery = channel.deliver(&payload)?;
        Ok(SubmissionReceipt { payload, delivery })
    }
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    match value.trim() {
        "" => placeholder,
        v => v,
    }
}

fn text_body(
    kind: &SubmissionKind,
    entry: &Entry,
    request: &ChangeRequest,
    changes: Option<&str>,
    entry_json: &str,
) -> String {
    let mut body = String::with_capacity(entry_json.len() + 512);
    body.push_str(&format!("{}\n\n", kind.label()));
    body.push_str(&format!("Entry ID: {}\n", entry.result_id));
    body.push_str(&format!("Entry Name: {}\n\n", entry.result_name));

    if !request.summary.trim().is_empty() {
        body.push_str(&format!("Change Summary:\n{}\n\n", request.summary.trim()));
    }
    if !request.reason.trim().is_empty() {
        body.push_str(&format!("Reason for Changes:\n{}\n\n", request.reason.trim()));
    }
    if let Some(changes) = changes {
        body.push_str(&format!("Changes Made:\n{}\n\n", changes));
    }

    body.push_str(&format!("Contributor: {}\n", request.contributor_name()));
    if let Some(email) = &request.contributor_email {
        body.push_str(&format!("Contact: {}\n", email));
    }

    let json_title = match kind {
        SubmissionKind::NewEntry => "Entry JSON Content",
        SubmissionKind::Modification { .. } => "Modified JSON Content",
    };
    body.push_str(&format!("\n{}:\n{}\n\n{}", json_title, entry_json, EMAIL_FOOTER));
    body
}

fn markdown_body(
    kind: &SubmissionKind,
    entry: &Entry,
    request: &ChangeRequest,
    changes: Option<&str>,
    entry_json: &str,
) -> String {
    let mut body = String::with_capacity(entry_json.len() + 512);
    body.push_str(&format!("## {}\n\n", kind.label()));
    body.push_str(&format!("**Entry ID:** {}\n", entry.result_id));
    body.push_str(&format!("**Entry Name:** {}\n\n", entry.result_name));

    if !request.summary.trim().is_empty() {
        body.push_str(&format!("## Change Summary\n{}\n\n", request.summary.trim()));
    }
    if !request.reason.trim().is_empty() {
        body.push_str(&format!("## Reason for Changes\n{}\n\n", request.reason.trim()));
    }

    let json_title = match kind {
        SubmissionKind::NewEntry => "Entry Content",
        SubmissionKind::Modification { .. } => "Modified Content",
    };
    body.push_str(&format!("## {}\n\n```json\n{}\n```\n\n", json_title, entry_json));

    if let Some(changes) = changes {
        body.push_str(&format!("## Changes Made\n{}\n\n", changes));
    }

    body.push_str(&format!("**Contributor:** {}\n\n{}", request.contributor_name(), ISSUE_FOOTER));
    body
}

fn template_params(
    kind: &SubmissionKind,
    entry: &Entry,
    request: &ChangeRequest,
    submitted_on: &str,
) -> Result<TemplateParams, SubmissionError> {
    let mut complete = serde_json::to_value(entry)?;
    if let (SubmissionKind::Modification { .. }, Value::Object(map)) = (kind, &mut complete) {
        map.insert(
            "change_summary".to_string(),
            json!({
                "what_changed": request.summary.trim(),
                "why_changed": request.reason.trim(),
            }),
        );
    }

    let mut params = TemplateParams::new();
    params.insert("submission_type", kind.label().to_string());
    params.insert("contributor_name", request.contributor_name().to_string());
    params.insert(
        "contributor_email",
        request
            .contributor_email
            .clone()
            .unwrap_or_else(|| "Not provided".to_string()),
    );
    params.insert("submission_date", submitted_on.to_string());
    params.insert("entry_id", entry.result_id.clone());
    params.insert("entry_title", entry.result_name.clone());
    params.insert("domain", or_placeholder(&entry.domain, "Not specified").to_string());
    params.insert(
        "theory_status",
        entry
            .theory_status
            .map(|s| s.as_str().to_string())
            .unwrap_or_else(|| "Not specified".to_string()),
    );
    params.insert("review_status", entry.review_status.as_str().to_string());
    params.insert("complete_json", serde_json::to_string_pretty(&complete)?);
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeliveryError;

    /// Records every payload it is handed.
    #[derive(Default)]
    struct RecordingChannel {
        delivered: Vec<Payload>,
        fail: bool,
    }

    impl DeliveryChannel for RecordingChannel {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn deliver(&mut self, payload: &Payload) -> Result<Delivery, DeliveryError> {
            if self.fail {
                return Err(DeliveryError::Unavailable {
                    channel: "recording",
                    reason: "offline".to_string(),
                });
            }
            self.delivered.push(payload.clone());
            Ok(Delivery::Sent {
                message_id: format!("msg-{}", self.delivered.len()),
            })
        }
    }

    fn make_test_entry() -> Entry {
        Entry {
            result_id: "ohms_law".to_string(),
            result_name: "Ohm's Law".to_string(),
            domain: "physics.class-ph".to_string(),
            ..Entry::skeleton()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn test_blank_request_blocks_modification() {
        let packager = Packager::new(SubmissionConfig::default());
        let kind = SubmissionKind::Modification { original: make_test_entry() };
        let mut channel = RecordingChannel::default();

        let err = packager
            .submit(&mut channel, &kind, &make_test_entry(), &ChangeRequest::new(" ", "\n", ""), today())
            .unwrap_err();

        match err {
            SubmissionError::Validation { missing } => {
                assert_eq!(missing, vec!["summary", "reason", "contributor"])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(channel.delivered.is_empty());
    }

    #[test]
    fn test_new_entry_needs_valid_id() {
        let packager = Packager::new(SubmissionConfig::default());
        let entry = Entry {
            result_id: "Ohms Law".to_string(),
            ..make_test_entry()
        };
        let err = packager
            .validate(&SubmissionKind::NewEntry, &entry, &ChangeRequest::default())
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Validation { ref missing } if missing == &vec!["result_id"]));

        assert!(packager
            .validate(&SubmissionKind::NewEntry, &make_test_entry(), &ChangeRequest::default())
            .is_ok());
    }

    #[test]
    fn test_modification_payload() {
        let packager = Packager::new(SubmissionConfig::default());
        let original = Entry {
            result_name: "Ohms Law".to_string(),
            ..make_test_entry()
        };
        let kind = SubmissionKind::Modification { original };
        let request = ChangeRequest::new("Fix title", "Apostrophe missing", "Ada Lovelace");

        let payload = packager.package(&kind, &make_test_entry(), &request, today()).unwrap();

        assert_eq!(payload.subject, "[MODIFY] Ohm's Law");
        assert_eq!(payload.kind_label, "Entry Modification");
        assert_eq!(payload.labels, vec!["modification", "entry-edit"]);
        assert!(payload.text_body.starts_with("Entry Modification\n\nEntry ID: ohms_law\n"));
        assert!(payload.text_body.contains("Changes Made:\n- **Name changed:** \"Ohms Law\" → \"Ohm's Law\""));
        assert!(payload.text_body.ends_with(EMAIL_FOOTER));
        assert!(payload.markdown_body.contains("```json\n{\n  \"result_id\": \"ohms_law\""));
        assert!(payload.markdown_body.contains("**Contributor:** Ada Lovelace"));

        let params = &payload.template_params;
        assert_eq!(params["submission_date"], "2024-05-01");
        assert_eq!(params["contributor_email"], "Not provided");
        assert_eq!(params["theory_status"], "Not specified");
        assert_eq!(params["domain"], "physics.class-ph");
        let complete: Value = serde_json::from_str(&params["complete_json"]).unwrap();
        assert_eq!(complete["change_summary"]["why_changed"], "Apostrophe missing");
    }

    #[test]
    fn test_new_entry_payload_has_no_diff() {
        let packager = Packager::new(SubmissionConfig::default());
        let mut channel = RecordingChannel::default();
        let receipt = packager
            .submit(&mut channel, &SubmissionKind::NewEntry, &make_test_entry(), &ChangeRequest::default(), today())
            .unwrap();

        assert_eq!(receipt.delivery, Delivery::Sent { message_id: "msg-1".to_string() });
        assert_eq!(receipt.payload.subject, "[NEW] Ohm's Law");
        assert!(receipt.payload.change_summary.is_none());
        assert!(!receipt.payload.text_body.contains("Changes Made"));
        assert_eq!(receipt.payload.template_params["contributor_name"], "Anonymous");
        let complete: Value = serde_json::from_str(&receipt.payload.template_params["complete_json"]).unwrap();
        assert!(complete.get("change_summary").is_none());
    }

    #[test]
    fn test_delivery_failure_is_reported_once() {
        let packager = Packager::new(SubmissionConfig::default());
        let mut channel = RecordingChannel { fail: true, ..Default::default() };
        let err = packager
            .submit(&mut channel, &SubmissionKind::NewEntry, &make_test_entry(), &ChangeRequest::default(), today())
            .unwrap_err();
        assert!(matches!(err, SubmissionError::Delivery(_)));
        assert!(err.user_message().starts_with("Submission failed"));
    }
}
