//! Structural and semantic validation of a parsed spec
//!
//! [`validate`] never fails: every finding is data in the returned
//! [`ValidationReport`]. Errors block generation, warnings do not (unless the
//! caller opts into strict mode).

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::SpecError;
use crate::model::{Orientation, PageSize};
use crate::options::ValidationOptions;
use crate::spec::NormalizedSpec;
use crate::units::normalize_units;
use crate::value::{display, number, scalar_text};

/// Field types the validator recognises; anything else counts as `unknown`
pub const RECOGNIZED_FIELD_TYPES: [&str; 5] = ["text", "textarea", "checkbox", "dropdown", "radio"];

/// Field types that require a non-empty `options` list
const CHOICE_FIELD_TYPES: [&str; 2] = ["dropdown", "radio"];

pub const UNKNOWN_FIELD_TYPE: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldStats {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub unique_ids: usize,
}

impl Default for FieldStats {
    fn default() -> Self {
        let by_type = RECOGNIZED_FIELD_TYPES
            .iter()
            .chain(std::iter::once(&UNKNOWN_FIELD_TYPE))
            .map(|kind| (kind.to_string(), 0))
            .collect();
        Self {
            total: 0,
            by_type,
            unique_ids: 0,
        }
    }
}

impl FieldStats {
    fn record(&mut self, kind: &str) {
        self.total += 1;
        *self.by_type.entry(kind.to_string()).or_insert(0) += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub normalized: Option<NormalizedSpec>,
    pub field_stats: FieldStats,
}

impl ValidationReport {
    fn fatal(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            errors,
            warnings,
            normalized: None,
            field_stats: FieldStats::default(),
        }
    }

    /// Report for text that never made it past the parser
    pub fn from_parse_error(error: &SpecError) -> Self {
        Self::fatal(error.messages(), Vec::new())
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.normalized.is_some()
    }

    /// Whether generation must be refused; strict mode also refuses on warnings
    pub fn blocks_generation(&self, strict: bool) -> bool {
        !self.is_valid() || (strict && !self.warnings.is_empty())
    }
}

/// Multiset of field ids in first-seen order
#[derive(Debug, Default)]
struct IdTally {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl IdTally {
    fn add(&mut self, id: &str) {
        let count = self.counts.entry(id.to_string()).or_insert(0);
        if *count == 0 {
            self.order.push(id.to_string());
        }
        *count += 1;
    }

    fn unique(&self) -> usize {
        self.order.len()
    }

    /// Ids seen more than once, with their counts
    fn duplicates(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order.iter().filter_map(|id| {
            let count = self.counts.get(id).copied().unwrap_or(0);
            (count > 1).then_some((id.as_str(), count))
        })
    }
}

/// Validate `spec`, normalizing a private copy of it.
///
/// The normalized document is absent only when the input is not an object or
/// has no usable `pages`; any other finding still yields it.
pub fn validate(spec: &Value, options: &ValidationOptions) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let Some(root) = spec.as_object() else {
        return ValidationReport::fatal(vec!["Spec is not an object.".to_string()], warnings);
    };

    let mut document = match root.get("document") {
        Some(Value::Object(doc)) => doc.clone(),
        None | Some(Value::Null) => Map::new(),
        Some(_) => {
            warnings.push("Invalid 'document' value, using defaults.".to_string());
            Map::new()
        }
    };

    let page_size = match scalar_text(document.get("page_size")) {
        None => options.page_fallback,
        Some(raw) => PageSize::parse(&raw).unwrap_or_else(|| {
            warnings.push(format!(
                "Unsupported page_size '{}', falling back to A4.",
                raw.to_uppercase()
            ));
            PageSize::A4
        }),
    };
    document.insert("page_size".into(), Value::String(page_size.as_str().into()));

    let orientation = match scalar_text(document.get("orientation")) {
        None => Orientation::Portrait,
        Some(raw) => Orientation::parse(&raw).unwrap_or_else(|| {
            warnings.push(format!(
                "Unsupported orientation '{}', using portrait.",
                raw.to_lowercase()
            ));
            Orientation::Portrait
        }),
    };
    document.insert("orientation".into(), Value::String(orientation.as_str().into()));

    let mut copy = root.clone();
    copy.insert("document".into(), Value::Object(document));
    let normalization = normalize_units(copy, options.unit_fallback);
    warnings.extend(normalization.warnings);
    errors.extend(normalization.errors);
    let normalized = normalization.spec;

    let pages = match normalized.get("pages") {
        Some(Value::Array(pages)) if !pages.is_empty() => pages,
        _ => {
            errors.push("Missing or empty 'pages' array.".to_string());
            return ValidationReport::fatal(errors, warnings);
        }
    };

    let mut stats = FieldStats::default();
    let mut ids = IdTally::default();

    for (pi, page) in pages.iter().enumerate().map(|(i, p)| (i + 1, p)) {
        let Some(page) = page.as_object() else {
            errors.push(format!("Page {pi} is not an object."));
            continue;
        };
        let Some(Value::Array(elements)) = page.get("elements") else {
            errors.push(format!("Page {pi}: missing/invalid 'elements' array."));
            continue;
        };

        for (ei, element) in elements.iter().enumerate().map(|(i, e)| (i + 1, e)) {
            let Some(element) = element.as_object() else {
                warnings.push(format!("Page {pi} element {ei}: not an object, skipped."));
                continue;
            };
            let kind = scalar_text(element.get("type"))
                .unwrap_or_default()
                .to_lowercase();
            if kind != "label" && kind != "field" {
                warnings.push(format!(
                    "Page {pi} element {ei}: unknown type '{}'.",
                    display(element.get("type"))
                ));
                continue;
            }

            if number(element.get("x")).is_none() || number(element.get("y")).is_none() {
                errors.push(format!("Page {pi} element {ei}: missing numeric x/y."));
            }

            if kind == "label" {
                let has_text = matches!(element.get("text"), Some(Value::String(text)) if !text.is_empty());
                if !has_text {
                    warnings.push(format!("Page {pi} label {ei}: missing text."));
                }
                continue;
            }

            for key in ["w", "h"] {
                if number(element.get(key)).is_none() {
                    errors.push(format!("Page {pi} field {ei}: missing numeric {key}."));
                }
            }

            let id = match element.get("id") {
                Some(Value::String(id)) if !id.trim().is_empty() => Some(id.as_str()),
                _ => None,
            };
            match id {
                Some(id) => ids.add(id),
                None => errors.push(format!("Page {pi} field {ei}: missing string id.")),
            }
            let shown_id = id.map(str::to_string).unwrap_or_else(|| display(element.get("id")));

            let field_type = scalar_text(element.get("field_type"))
                .unwrap_or_default()
                .to_lowercase();
            if RECOGNIZED_FIELD_TYPES.contains(&field_type.as_str()) {
                stats.record(&field_type);
            } else {
                stats.record(UNKNOWN_FIELD_TYPE);
                warnings.push(format!(
                    "Field '{shown_id}': unsupported field_type '{field_type}' (fallback)."
                ));
            }

            if CHOICE_FIELD_TYPES.contains(&field_type.as_str()) {
                let has_options = matches!(element.get("options"), Some(Value::Array(opts)) if !opts.is_empty());
                if !has_options {
                    errors.push(format!(
                        "Field '{shown_id}': '{field_type}' requires non-empty options."
                    ));
                }
            }
        }
    }

    for (id, count) in ids.duplicates() {
        errors.push(format!("Duplicate field id '{id}' ({count} occurrences)."));
    }
    stats.unique_ids = ids.unique();

    debug!(
        errors = errors.len(),
        warnings = warnings.len(),
        fields = stats.total,
        "validated spec"
    );

    ValidationReport {
        errors,
        warnings,
        normalized: Some(NormalizedSpec::new(normalized)),
        field_stats: stats,
    }
}
