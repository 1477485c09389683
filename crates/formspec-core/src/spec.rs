//! The normalized spec and its typed reading

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{
    DocumentSettings, Element, Field, FieldKind, FontSettings, FontSpec, FormSpec, Label, Margin,
    Orientation, Page, PageSize,
};
use crate::units::Unit;
use crate::value::{display, number, scalar_text, truthy};

const DEFAULT_FIELD_WIDTH: f64 = 40.0;
const DEFAULT_FIELD_HEIGHT: f64 = 8.0;

/// A spec after default coercion and unit normalization.
///
/// Only [`crate::validate`] produces one, so every holder knows the geometry
/// is in a single unit. The generic tree is kept intact for exporters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedSpec(Map<String, Value>);

impl NormalizedSpec {
    pub(crate) fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// The unit all geometry is expressed in
    pub fn unit(&self) -> Unit {
        self.0
            .get("document")
            .and_then(|doc| scalar_text(doc.get("unit")))
            .map(|raw| Unit::coerce(&raw))
            .unwrap_or_default()
    }

    /// Typed view; missing values fall back to engine defaults
    pub fn form(&self) -> FormSpec {
        let document = self.0.get("document").and_then(Value::as_object);
        let fonts = self.0.get("fonts").and_then(Value::as_object);
        let pages = match self.0.get("pages") {
            Some(Value::Array(pages)) => pages.iter().map(read_page).collect(),
            _ => Vec::new(),
        };
        FormSpec {
            document: read_document(document, self.unit()),
            fonts: read_fonts(fonts),
            pages,
        }
    }

    /// Field names (`name`, else `id`) in spec order, deduplicated
    pub fn field_names(&self) -> Vec<String> {
        self.form().field_names()
    }
}

fn read_document(document: Option<&Map<String, Value>>, unit: Unit) -> DocumentSettings {
    let get = |key: &str| document.and_then(|doc| doc.get(key));
    let margin = get("margin").and_then(Value::as_object);
    let side = |key: &str| number(margin.and_then(|m| m.get(key))).unwrap_or(0.0);

    DocumentSettings {
        title: scalar_text(get("title")),
        page_size: scalar_text(get("page_size"))
            .and_then(|raw| PageSize::parse(&raw))
            .unwrap_or_default(),
        orientation: scalar_text(get("orientation"))
            .and_then(|raw| Orientation::parse(&raw))
            .unwrap_or_default(),
        unit,
        margin: Margin {
            left: side("left"),
            top: side("top"),
            right: side("right"),
            bottom: side("bottom"),
        },
    }
}

fn read_fonts(fonts: Option<&Map<String, Value>>) -> FontSettings {
    let defaults = FontSettings::default();
    let read = |key: &str, fallback: FontSpec, fallback_size: f64| {
        let section = fonts.and_then(|f| f.get(key)).and_then(Value::as_object);
        FontSpec {
            family: scalar_text(section.and_then(|s| s.get("family"))).unwrap_or(fallback.family),
            size: number(section.and_then(|s| s.get("size")))
                .filter(|size| *size > 0.0)
                .unwrap_or(fallback_size),
        }
    };
    let default = read("default", defaults.default.clone(), defaults.default.size);
    let cjk_size = default.size;
    FontSettings {
        cjk: read("cjk", defaults.cjk, cjk_size),
        default,
    }
}

fn read_page(page: &Value) -> Page {
    let elements = match page.get("elements") {
        Some(Value::Array(elements)) => elements.iter().map(read_element).collect(),
        _ => Vec::new(),
    };
    Page {
        number: page.get("number").and_then(Value::as_i64),
        elements,
    }
}

fn read_element(element: &Value) -> Element {
    let Some(map) = element.as_object() else {
        return Element::Unsupported {
            kind: "non-object".to_string(),
        };
    };
    let kind = scalar_text(map.get("type")).unwrap_or_default().to_lowercase();
    match kind.as_str() {
        "label" => Element::Label(read_label(map)),
        "field" => Element::Field(read_field(map)),
        _ => Element::Unsupported {
            kind: display(map.get("type")),
        },
    }
}

fn read_label(map: &Map<String, Value>) -> Label {
    Label {
        text: scalar_text(map.get("text")).unwrap_or_default(),
        x: number(map.get("x")).unwrap_or(0.0),
        y: number(map.get("y")).unwrap_or(0.0),
        size: number(map.get("size")).filter(|size| *size > 0.0),
        style: scalar_text(map.get("style"))
            .unwrap_or_default()
            .to_uppercase(),
    }
}

fn read_field(map: &Map<String, Value>) -> Field {
    let id = scalar_text(map.get("id")).unwrap_or_default();
    let name = scalar_text(map.get("name")).unwrap_or_else(|| id.clone());
    let kind = FieldKind::parse(&scalar_text(map.get("field_type")).unwrap_or_else(|| "text".into()));
    let options = match map.get("options") {
        Some(Value::Array(items)) => items.iter().filter_map(|item| scalar_text(Some(item))).collect(),
        _ => Vec::new(),
    };
    let multiline = truthy(map.get("multiline")) || kind == FieldKind::Textarea;

    Field {
        x: number(map.get("x")).unwrap_or(0.0),
        y: number(map.get("y")).unwrap_or(0.0),
        w: number(map.get("w")).unwrap_or(DEFAULT_FIELD_WIDTH),
        h: number(map.get("h")).unwrap_or(DEFAULT_FIELD_HEIGHT),
        value: map.get("value").filter(|v| !v.is_null()).cloned(),
        required: truthy(map.get("required")),
        id,
        name,
        kind,
        options,
        multiline,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn normalized(value: Value) -> NormalizedSpec {
        NormalizedSpec::new(value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_form_reads_typed_elements() {
        let spec = normalized(json!({
            "document": {"unit": "pt", "page_size": "LETTER", "orientation": "landscape", "title": "T"},
            "fonts": {"default": {"family": "Inter", "size": 10}},
            "pages": [{"number": 1, "elements": [
                {"type": "label", "text": "Name", "x": 1, "y": 2, "style": "b"},
                {"type": "field", "field_type": "TextArea", "id": "notes", "x": 1, "y": 2, "w": 3, "h": 4},
                {"type": "Field", "field_type": "dropdown", "id": "kind", "name": "Kind", "options": ["a", 2],
                 "x": 0, "y": 0, "w": 1, "h": 1, "value": "a"},
                {"type": "image"},
                "stray"
            ]}]
        }));
        let form = spec.form();

        assert_eq!(form.document.page_size, PageSize::Letter);
        assert_eq!(form.document.orientation, Orientation::Landscape);
        assert_eq!(form.document.unit, Unit::Pt);
        assert_eq!(form.fonts.default.family, "Inter");
        assert_eq!(form.fonts.cjk.family, "NotoSansTC");
        assert_eq!(form.fonts.cjk.size, 10.0);

        let elements = &form.pages[0].elements;
        assert_eq!(elements.len(), 5);
        match &elements[0] {
            Element::Label(label) => {
                assert_eq!(label.style, "B");
                assert!(label.is_bold());
            }
            other => panic!("expected label, got {other:?}"),
        }
        match &elements[1] {
            Element::Field(field) => {
                assert_eq!(field.kind, FieldKind::Textarea);
                assert!(field.multiline);
                assert_eq!(field.name, "notes");
            }
            other => panic!("expected field, got {other:?}"),
        }
        match &elements[2] {
            Element::Field(field) => {
                assert_eq!(field.options, vec!["a".to_string(), "2".to_string()]);
                assert_eq!(field.name, "Kind");
            }
            other => panic!("expected field, got {other:?}"),
        }
        assert_eq!(
            elements[3],
            Element::Unsupported {
                kind: "image".into()
            }
        );
        assert_eq!(
            elements[4],
            Element::Unsupported {
                kind: "non-object".into()
            }
        );
    }

    #[test]
    fn test_field_defaults() {
        let spec = normalized(json!({"pages": [{"elements": [{"type": "field", "id": "a"}]}]}));
        let form = spec.form();
        let field = form.fields().next().unwrap();
        assert_eq!(field.kind, FieldKind::Text);
        assert_eq!((field.w, field.h), (40.0, 8.0));
        assert_eq!(form.document.page_size, PageSize::A4);
        assert_eq!(form.fonts.default.size, 11.0);
    }

    #[test]
    fn test_field_names_dedup_in_order() {
        let spec = normalized(json!({"pages": [
            {"elements": [
                {"type": "field", "id": "b", "name": "Beta"},
                {"type": "field", "id": "a"},
                {"type": "label", "text": "x"}
            ]},
            {"elements": [
                {"type": "field", "id": "b2", "name": "Beta"},
                {"type": "field"}
            ]}
        ]}));
        assert_eq!(spec.field_names(), vec!["Beta".to_string(), "a".to_string()]);
    }
}
