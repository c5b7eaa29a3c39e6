//! TheorIA contribution front-end.
//!
//! Library side of the dataset contribution tools:
//! - `entry/`: schema types, legacy migration, validation, assumption catalog
//! - `form/`: the two-way form synchronizer and the raw JSON pane
//! - `preview/`: read-only HTML preview with equation reflow
//! - `submission/`: change-request packaging and delivery channels
//! - `indexer/`: the static browse-all page batch
//!
//! Binaries: `generate_index` (site index) and `entry_tool` (preview, check,
//! export from the command line).

pub mod config;
pub mod dataset;
pub mod entry;
pub mod error;
pub mod form;
pub mod indexer;
pub mod preview;
pub mod session;
pub mod submission;

pub use config::ContribConfig;
pub use dataset::{Dataset, LoadedEntry};
pub use entry::{parse_entry, AssumptionCatalog, Entry};
pub use error::{ConfigError, DeliveryError, FormError, IndexError, LoadError, SubmissionError, UserNotice};
pub use form::{FormLayout, FormSynchronizer, JsonEditor, MathTypesetter, NoopTypesetter, RowHandle, RowKind};
pub use indexer::{IndexReport, SiteIndexer};
pub use preview::{render_preview, PreviewRenderer};
pub use session::EditorSession;
pub use submission::{ChangeRequest, Packager, SubmissionKind};
