//! What the contributor is asking for.

use crate::entry::Entry;

/// Change-request block filled in next to the edited entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeRequest {
    pub summary: String,
    pub reason: String,
    pub contributor: String,
    pub contributor_email: Option<String>,
}

impl ChangeRequest {
    pub fn new(summary: impl Into<String>, reason: impl Into<String>, contributor: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            reason: reason.into(),
            contributor: contributor.into(),
            contributor_email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        let email = email.into();
        self.contributor_email = (!email.trim().is_empty()).then_some(email);
        self
    }

    /// Required fields that are empty after trimming.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("summary", &self.summary),
            ("reason", &self.reason),
            ("contributor", &self.contributor),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn contributor_name(&self) -> &str {
        match self.contributor.trim() {
            "" => "Anonymous",
            name => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionKind {
    NewEntry,
    /// Edit of a persisted entry; the original is kept for the diff.
    Modification { original: Entry },
}

impl SubmissionKind {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionKind::NewEntry => "New Entry Submission",
            SubmissionKind::Modification { .. } => "Entry Modification",
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            SubmissionKind::NewEntry => "[NEW]",
            SubmissionKind::Modification { .. } => "[MODIFY]",
        }
    }

    pub fn original(&self) -> Option<&Entry> {
        match self {
            SubmissionKind::NewEntry => None,
            SubmissionKind::Modification { original } => Some(original),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_counts_as_missing() {
        let request = ChangeRequest::new("  ", "typo", "\t");
        assert_eq!(request.missing_fields(), vec!["summary", "contributor"]);
        assert_eq!(request.contributor_name(), "Anonymous");
    }

    #[test]
    fn test_blank_email_is_dropped() {
        let request = ChangeRequest::new("s", "r", "Ada").with_email(" ");
        assert_eq!(request.contributor_email, None);
        let request = request.with_email("ada@example.org");
        assert_eq!(request.contributor_email.as_deref(), Some("ada@example.org"));
    }
}
