//! Reading form fields back out of PDFs and diffing them against a spec

pub mod error;
pub mod fields;
pub mod reconcile;
pub mod text;

pub use error::ReconcileError;
pub use fields::{extract_fields, ExtractedField, ExtractedFields};
pub use reconcile::{reconcile, reconcile_fields, slug, ReconciliationReport, RenameSuggestion};
