//! Error types for every stage of the contribution pipeline.
//!
//! Library code returns these typed errors; the binaries wrap them in
//! `anyhow` with context.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to assemble the layered configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Figment(#[from] figment::Error),
}

/// Failure to fetch or parse a persisted entry or catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("'{0}' is not a valid entry id")]
    InvalidId(String),

    #[error("entry file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// User-facing notice with a link back to a page that always works.
    pub fn notice(&self, back_href: &str) -> UserNotice {
        let message = match self {
            LoadError::InvalidId(id) => format!("\"{}\" is not a valid entry identifier.", id),
            LoadError::NotFound { .. } => "The requested entry does not exist.".to_string(),
            LoadError::Io { .. } => "The entry could not be read.".to_string(),
            LoadError::Malformed { .. } => "The entry file is not valid JSON.".to_string(),
        };
        UserNotice {
            title: "Error loading entry".to_string(),
            message,
            back_href: back_href.to_string(),
            back_label: "Back to entries".to_string(),
        }
    }
}

/// Error raised by the form synchronizer and the JSON editor.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("section '{0}' is not rendered on this page")]
    SectionNotRendered(&'static str),

    #[error("no row with handle #{0}")]
    UnknownRow(u64),

    #[error("row kind '{kind}' has no field '{field}'")]
    UnknownField { kind: &'static str, field: String },

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Delivery failure reported by a submission channel.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("{channel} rejected the submission: {reason}")]
    Rejected { channel: &'static str, reason: String },

    #[error("{channel} is unavailable: {reason}")]
    Unavailable { channel: &'static str, reason: String },
}

/// Error raised while validating, packaging or delivering a change request.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("missing required fields: {}", missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    #[error("failed to serialize entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

impl SubmissionError {
    /// Text shown to the contributor. Delivery failures get a generic notice.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Validation { missing } => format!(
                "Please fill in all required fields ({}) before submitting.",
                missing.join(", ")
            ),
            SubmissionError::Serialize(_) => {
                "The entry could not be prepared for submission.".to_string()
            }
            SubmissionError::Delivery(_) => {
                "Submission failed. Please try again later or contact the maintainers directly."
                    .to_string()
            }
        }
    }
}

/// Fatal error of the site index batch.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("cannot read entries directory {}: {source}", path.display())]
    EntriesDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render index page: {0}")]
    Render(#[from] askama::Error),

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Message surfaced to the user when something cannot be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserNotice {
    pub title: String,
    pub message: String,
    pub back_href: String,
    pub back_label: String,
}

impl UserNotice {
    pub fn to_html(&self) -> String {
        use askama_escape::{escape, Html};

        let mut html = String::with_capacity(256);
        html.push_str("<div class=\"error-notice\">\n");
        html.push_str(&format!("<h2>{}</h2>\n", escape(&self.title, Html)));
        html.push_str(&format!("<p>{}</p>\n", escape(&self.message, Html)));
        html.push_str(&format!(
            "<p><a href=\"{}\">{}</a></p>\n",
            escape(&self.back_href, Html),
            escape(&self.back_label, Html)
        ));
        html.push_str("</div>\n");
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_notice_links_back() {
        let err = LoadError::NotFound { path: PathBuf::from("entries/nope.json") };
        let html = err.notice("index.html").to_html();
        assert!(html.contains("Error loading entry"));
        assert!(html.contains("href=\"index.html\""));
        assert!(html.contains("does not exist"));
    }

    #[test]
    fn test_delivery_failure_message_is_generic() {
        let err = SubmissionError::from(DeliveryError::Unavailable {
            channel: "messaging",
            reason: "HTTP 503 from upstream".to_string(),
        });
        let message = err.user_message();
        assert!(message.starts_with("Submission failed"));
        assert!(!message.contains("503"), "internal reason must not leak: {}", message);
    }
}
