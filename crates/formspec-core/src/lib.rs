//! Form spec front end: extraction, parsing, unit normalization and validation
//!
//! Raw text goes through [`extract`] and [`parse`] into a generic tree, which
//! [`validate`] checks and normalizes into a [`NormalizedSpec`]. That is the
//! only form the render engines, exporters and reconciler accept.

pub mod error;
pub mod extract;
pub mod model;
pub mod options;
pub mod parse;
pub mod sample;
pub mod spec;
pub mod text;
pub mod units;
pub mod validate;
mod value;

pub use error::SpecError;
pub use extract::{extract, Extracted, PayloadKind};
pub use model::{
    DocumentSettings, Element, Field, FieldKind, FontSettings, FontSpec, FormSpec, Label, Margin,
    Orientation, Page, PageSize, WidgetKind, WidgetPlan,
};
pub use options::ValidationOptions;
pub use parse::parse;
pub use spec::NormalizedSpec;
pub use units::{normalize_units, Unit, UnitNormalization, MM_PER_PT};
pub use validate::{validate, FieldStats, ValidationReport};

/// Parse then validate raw text in one step.
///
/// Parse failures become a report with no normalized document.
pub fn validate_text(text: &str, options: &ValidationOptions) -> ValidationReport {
    match parse(text) {
        Ok(spec) => validate(&serde_json::Value::Object(spec), options),
        Err(err) => ValidationReport::from_parse_error(&err),
    }
}
