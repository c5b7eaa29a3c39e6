//! Read-only HTML rendering of an entry.

pub mod reflow;
pub mod renderer;

pub use reflow::{equation_html, reflow_lines, DISPLAY_WIDTH};
pub use renderer::{render_preview, PreviewRenderer};
