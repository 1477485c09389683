//! Client-side jsPDF script and the label-to-field association it relies on

use formspec_core::text::sanitize_latin1;
use formspec_core::{Element, Field, Label, NormalizedSpec, WidgetKind};
use serde::Serialize;

use crate::template::fill_slots;

const CLIENT_TEMPLATE: &str = include_str!("../templates/client.js");

/// How far (spec units) a label may sit below a field's top and still label it
const LABEL_BELOW_SLACK: f64 = 2.0;
/// How far (spec units) a label may sit right of a field's left edge
const LABEL_RIGHT_SLACK: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClientFieldType {
    Text,
    Checkbox,
    Dropdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientField {
    pub label: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: ClientFieldType,
    pub value: String,
    pub checked: bool,
    pub multiline: bool,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientStructure {
    pub title: String,
    pub fields: Vec<ClientField>,
}

/// The label best describing `field`: above it (`label.y <= field.y + 2`),
/// left-ish (`label.x <= field.x + 20`), lowest `2·|Δy| + |Δx|`.
/// Ties keep the earlier label.
pub fn label_for_field<'a>(field: &Field, labels: &[&'a Label]) -> Option<&'a Label> {
    let mut best: Option<(&'a Label, f64)> = None;
    for &label in labels {
        if label.y > field.y + LABEL_BELOW_SLACK || label.x > field.x + LABEL_RIGHT_SLACK {
            continue;
        }
        let score = (field.y - label.y).abs() * 2.0 + (field.x - label.x).abs();
        if best.map_or(true, |(_, best_score)| score < best_score) {
            best = Some((label, score));
        }
    }
    best.map(|(label, _)| label)
}

/// Flatten every page into a labelled field list; labels only match fields on their own page
pub fn infer_client_structure(spec: &NormalizedSpec) -> ClientStructure {
    let form = spec.form();
    let title = form
        .document
        .title
        .clone()
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| "Dynamic Form".to_string());

    let mut fields = Vec::new();
    for page in &form.pages {
        let labels: Vec<&Label> = page.labels().collect();
        for element in &page.elements {
            let Element::Field(field) = element else {
                continue;
            };
            let label = label_for_field(field, &labels)
                .map(|label| sanitize_latin1(&label.text))
                .filter(|text| !text.trim().is_empty())
                .unwrap_or_else(|| field.name.clone());

            let (field_type, multiline) = match field.widget().kind {
                WidgetKind::TextInput { multiline } => (ClientFieldType::Text, multiline),
                WidgetKind::Choice => (ClientFieldType::Dropdown, false),
                WidgetKind::Checkbox => (ClientFieldType::Checkbox, false),
            };
            fields.push(ClientField {
                label,
                name: field.name.clone(),
                field_type,
                value: field.value_text(),
                checked: field.is_checked(),
                multiline,
                options: field.options.clone(),
            });
        }
    }

    ClientStructure { title, fields }
}

/// jsPDF script with the spec and its inferred field list embedded as JSON
pub fn client_script(spec: &NormalizedSpec) -> String {
    let structure = infer_client_structure(spec);
    let structure_json = serde_json::to_string_pretty(&structure).unwrap_or_else(|_| "{}".to_string());
    let spec_json = serde_json::to_string_pretty(spec.as_map()).unwrap_or_else(|_| "{}".to_string());

    fill_slots(
        CLIENT_TEMPLATE,
        &[
            ("__VERSION__", env!("CARGO_PKG_VERSION")),
            ("__SPEC__", spec_json.as_str()),
            ("__STRUCTURE__", structure_json.as_str()),
        ],
    )
}
