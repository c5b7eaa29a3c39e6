//! Delivery channels for a packaged submission.
//!
//! The compose-URL channels never talk to the network: they hand back a URL
//! the caller opens (mail client, issue tracker). The messaging channel
//! forwards named template fields to an injected transactional-email client.

use super::packager::Payload;
use crate::config::SubmissionConfig;
use crate::error::DeliveryError;
use std::collections::BTreeMap;
use urlencoding::encode;

/// Outcome of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// A URL the caller must open to finish the submission.
    OpenUrl(String),
    /// Sent by a remote service.
    Sent { message_id: String },
}

pub trait DeliveryChannel {
    fn name(&self) -> &'static str;

    fn deliver(&mut self, payload: &Payload) -> Result<Delivery, DeliveryError>;
}

/// `mailto:` compose URL addressed to the maintainers.
#[derive(Debug, Clone)]
pub struct MailtoChannel {
    to: String,
    cc: Vec<String>,
}

impl MailtoChannel {
    pub fn new(config: &SubmissionConfig) -> Self {
        Self {
            to: config.maintainer_email.clone(),
            cc: config.cc.clone(),
        }
    }

    pub fn compose_url(&self, payload: &Payload) -> String {
        let mut url = format!("mailto:{}?", self.to);
        let cc: Vec<&str> = self
            .cc
            .iter()
            .map(String::as_str)
            .chain(payload.contributor_email.as_deref().map(str::trim))
            .filter(|address| !address.is_empty())
            .collect();
        if !cc.is_empty() {
            url.push_str(&format!("cc={}&", encode(&cc.join(","))));
        }
        url.push_str(&format!(
            "subject={}&body={}",
            encode(&payload.subject),
            encode(&payload.text_body)
        ));
        url
    }
}

impl DeliveryChannel for MailtoChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    fn deliver(&mut self, payload: &Payload) -> Result<Delivery, DeliveryError> {
        Ok(Delivery::OpenUrl(self.compose_url(payload)))
    }
}

/// Prefilled "new issue" URL on the dataset repository.
#[derive(Debug, Clone)]
pub struct IssueChannel {
    repository: String,
}

impl IssueChannel {
    pub fn new(config: &SubmissionConfig) -> Self {
        Self {
            repository: config.issue_repository.clone(),
        }
    }

    pub fn issue_url(&self, payload: &Payload) -> String {
        format!(
            "https://github.com/{}/issues/new?title={}&labels={}&body={}",
            self.repository,
            encode(&payload.subject),
            encode(&payload.labels.join(",")),
            encode(&payload.markdown_body)
        )
    }
}

impl DeliveryChannel for IssueChannel {
    fn name(&self) -> &'static str {
        "issue"
    }

    fn deliver(&mut self, payload: &Payload) -> Result<Delivery, DeliveryError> {
        if self.repository.trim().is_empty() {
            return Err(DeliveryError::Unavailable {
                channel: "issue",
                reason: "no issue repository configured".to_string(),
            });
        }
        Ok(Delivery::OpenUrl(self.issue_url(payload)))
    }
}

/// Named fields handed to a messaging template.
pub type TemplateParams = BTreeMap<&'static str, String>;

/// Transactional-email service (service id + template id + named fields).
pub trait MessagingClient {
    /// Returns the service's message id.
    fn send(&mut self, service_id: &str, template_id: &str, params: &TemplateParams) -> Result<String, String>;
}

pub struct MessagingChannel<C: MessagingClient> {
    client: C,
    service_id: String,
    template_id: String,
    to_email: String,
}

impl<C: MessagingClient> MessagingChannel<C> {
    pub fn new(config: &SubmissionConfig, client: C) -> Self {
        Self {
            client,
            service_id: config.messaging_service_id.clone(),
            template_id: config.messaging_template_id.clone(),
            to_email: config.maintainer_email.clone(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: MessagingClient> DeliveryChannel for MessagingChannel<C> {
    fn name(&self) -> &'static str {
        "messaging"
    }

    fn deliver(&mut self, payload: &Payload) -> Result<Delivery, DeliveryError> {
        let mut params = payload.template_params.clone();
        params.insert("to_email", self.to_email.clone());

        match self.client.send(&self.service_id, &self.template_id, &params) {
            Ok(message_id) => {
                tracing::info!("Submission sent via {} ({})", self.service_id, message_id);
                Ok(Delivery::Sent { message_id })
            }
            Err(reason) => {
                tracing::warn!("Messaging delivery failed: {}", reason);
                Err(DeliveryError::Rejected {
                    channel: "messaging",
                    reason,
                })
            }
        }
    }
}
