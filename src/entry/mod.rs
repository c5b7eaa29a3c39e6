//! Entry model: schema types, legacy migration, validation and the global
//! assumption catalog.

pub mod catalog;
pub mod migrate;
pub mod types;
pub mod validate;

pub use catalog::{AssumptionCatalog, GlobalAssumption, ResolvedAssumption};
pub use migrate::{parse_entry, MigrationReport, SchemaVersion};
pub use types::*;
pub use validate::{validate_entry, Severity, ValidationIssue};
