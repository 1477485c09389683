//! Spec-versus-PDF field name reconciliation
//!
//! Rename suggestions are a heuristic aid only: a missing spec name is paired
//! with the first extra PDF name whose alphanumeric slug contains, or is
//! contained in, its own slug. Short names produce false positives
//! (`id` matches `Valid`); nothing here scores or ranks candidates.

use std::collections::{BTreeMap, HashSet};

use formspec_core::NormalizedSpec;
use serde::Serialize;
use tracing::info;

use crate::error::ReconcileError;
use crate::fields::{extract_fields, ExtractedField, ExtractedFields};

/// Missing names considered for rename suggestions
pub const SUGGESTION_LIMIT: usize = 40;

/// Extracted fields echoed back in the report
pub const SAMPLE_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameSuggestion {
    pub spec: String,
    pub pdf: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub spec_field_count: usize,
    pub pdf_field_count: usize,
    pub missing_in_pdf: Vec<String>,
    pub extra_in_pdf: Vec<String>,
    pub rename_suggestions: Vec<RenameSuggestion>,
    pub pdf_fields_sample: BTreeMap<String, ExtractedField>,
}

impl ReconciliationReport {
    /// Whether both sides expose exactly the same names
    pub fn is_aligned(&self) -> bool {
        self.missing_in_pdf.is_empty() && self.extra_in_pdf.is_empty()
    }
}

/// Diff the spec's field names against the fields found in `pdf`.
pub fn reconcile(spec: &NormalizedSpec, pdf: &[u8]) -> Result<ReconciliationReport, ReconcileError> {
    let extracted = extract_fields(pdf)?;
    let report = reconcile_fields(&spec.field_names(), &extracted);
    info!(
        missing = report.missing_in_pdf.len(),
        extra = report.extra_in_pdf.len(),
        suggestions = report.rename_suggestions.len(),
        "reconciled spec against PDF"
    );
    Ok(report)
}

/// Diff an ordered list of spec names against already extracted fields
pub fn reconcile_fields(spec_names: &[String], extracted: &ExtractedFields) -> ReconciliationReport {
    let spec_set: HashSet<&str> = spec_names.iter().map(String::as_str).collect();
    let pdf_set: HashSet<&str> = extracted.names.iter().map(String::as_str).collect();

    let mut missing_in_pdf: Vec<String> = spec_set
        .iter()
        .filter(|name| !pdf_set.contains(*name))
        .map(|name| name.to_string())
        .collect();
    missing_in_pdf.sort();

    let mut extra_in_pdf: Vec<String> = pdf_set
        .iter()
        .filter(|name| !spec_set.contains(*name))
        .map(|name| name.to_string())
        .collect();
    extra_in_pdf.sort();

    let rename_suggestions = suggest_renames(&missing_in_pdf, &extra_in_pdf);

    ReconciliationReport {
        spec_field_count: spec_names.len(),
        pdf_field_count: extracted.raw_count,
        missing_in_pdf,
        extra_in_pdf,
        rename_suggestions,
        pdf_fields_sample: extracted
            .fields
            .iter()
            .take(SAMPLE_SIZE)
            .map(|(name, field)| (name.clone(), field.clone()))
            .collect(),
    }
}

fn suggest_renames(missing: &[String], extra: &[String]) -> Vec<RenameSuggestion> {
    let extra_slugs: Vec<(&String, String)> = extra.iter().map(|name| (name, slug(name))).collect();

    missing
        .iter()
        .take(SUGGESTION_LIMIT)
        .filter_map(|spec_name| {
            let spec_slug = slug(spec_name);
            if spec_slug.is_empty() {
                return None;
            }
            extra_slugs
                .iter()
                .find(|(_, pdf_slug)| {
                    !pdf_slug.is_empty()
                        && (pdf_slug.contains(spec_slug.as_str()) || spec_slug.contains(pdf_slug.as_str()))
                })
                .map(|(pdf_name, _)| RenameSuggestion {
                    spec: spec_name.clone(),
                    pdf: (*pdf_name).clone(),
                })
        })
        .collect()
}

/// Lowercase and strip everything but ASCII letters and digits
pub fn slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .collect()
}
