//! Contribution form: row templates, the in-memory surface, the two-way
//! synchronizer and the raw JSON pane.

pub mod json_editor;
pub mod rows;
pub mod surface;
pub mod synchronizer;

pub use json_editor::{JsonEditor, JsonStatus};
pub use rows::{FieldSpec, InputKind, RowKind, RowTemplate};
pub use surface::{FormLayout, FormSurface, Row, RowHandle, ScalarField};
pub use synchronizer::{FormSynchronizer, MathTypesetter, NoopTypesetter};
