//! Change-request packaging and delivery.

pub mod channels;
pub mod diff;
pub mod packager;
pub mod request;

pub use channels::{
    Delivery, DeliveryChannel, IssueChannel, MailtoChannel, MessagingChannel, MessagingClient, TemplateParams,
};
pub use diff::{diff_entries, ChangeSummary, DiffField, FieldChange};
pub use packager::{Packager, Payload, SubmissionReceipt};
pub use request::{ChangeRequest, SubmissionKind};
