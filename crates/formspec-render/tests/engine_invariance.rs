//! Both engines must put the same things in the same places.

use std::collections::HashMap;

use formspec_core::{validate, NormalizedSpec, ValidationOptions};
use formspec_render::{EngineKind, RenderEngine, SimpleCanvasEngine, VectorCanvasEngine};
use lopdf::content::Content;
use lopdf::{Document, Object};
use serde_json::{json, Value};

const TOLERANCE: f32 = 0.01;

fn normalized(spec: Value) -> NormalizedSpec {
    let report = validate(&spec, &ValidationOptions::default());
    assert!(report.errors.is_empty(), "{:?}", report.errors);
    report.normalized.unwrap()
}

fn render_both(spec: &NormalizedSpec) -> Vec<Document> {
    let engines: [Box<dyn RenderEngine>; 2] =
        [Box::new(SimpleCanvasEngine::new()), Box::new(VectorCanvasEngine::new())];
    engines
        .iter()
        .map(|engine| {
            let rendered = engine.render(spec, &HashMap::new()).unwrap();
            Document::load_mem(&rendered.pdf).unwrap()
        })
        .collect()
}

/// Operands of every `Td` on every page, in page order
fn text_positions(doc: &Document) -> Vec<(f32, f32)> {
    let mut positions = Vec::new();
    for page_id in doc.get_pages().values() {
        let content = Content::decode(&doc.get_page_content(*page_id).unwrap()).unwrap();
        for op in content.operations.iter().filter(|op| op.operator == "Td") {
            positions.push((
                op.operands[0].as_float().unwrap(),
                op.operands[1].as_float().unwrap(),
            ));
        }
    }
    positions
}

fn rects(doc: &Document) -> Vec<[f32; 4]> {
    let catalog = doc.catalog().unwrap();
    let acroform = match catalog.get(b"AcroForm").unwrap() {
        Object::Reference(id) => doc.get_object(*id).unwrap(),
        other => other,
    };
    let fields = acroform.as_dict().unwrap().get(b"Fields").unwrap().as_array().unwrap();
    fields
        .iter()
        .map(|field| {
            let dict = doc.get_object(field.as_reference().unwrap()).unwrap().as_dict().unwrap();
            let values: Vec<f32> = dict
                .get(b"Rect")
                .unwrap()
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_float().unwrap())
                .collect();
            [values[0], values[1], values[2], values[3]]
        })
        .collect()
}

fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < TOLERANCE, "{a} vs {b}");
}

#[test]
fn label_at_12_14_lands_in_the_same_place() {
    let spec = normalized(json!({
        "document": {"page_size": "A4", "unit": "mm"},
        "fonts": {"default": {"family": "DejaVuSans", "size": 11}},
        "pages": [{"elements": [
            {"type": "label", "text": "Applicant", "x": 12, "y": 14, "size": 11},
        ]}]
    }));
    let docs = render_both(&spec);
    let simple = text_positions(&docs[0]);
    let vector = text_positions(&docs[1]);
    assert_eq!(simple.len(), 1);
    assert_eq!(vector.len(), 1);

    assert_close(simple[0].0, vector[0].0);
    assert_close(simple[0].1, vector[0].1);

    // top of the line is 14 mm below the page top, baseline 0.8 em lower
    let page_height = 297.0 / 0.3527777778_f32;
    let expected = page_height - 14.0 / 0.3527777778 - 0.8 * 11.0;
    assert_close(vector[0].1, expected);
}

#[test]
fn widget_rects_match_across_engines() {
    let spec = normalized(json!({
        "document": {"page_size": "LETTER", "orientation": "landscape", "unit": "mm"},
        "pages": [
            {"elements": [
                {"type": "field", "id": "Full_Name", "field_type": "text", "x": 20, "y": 30, "w": 80, "h": 9},
                {"type": "field", "id": "Confirm", "field_type": "checkbox", "x": 20, "y": 50, "w": 5, "h": 5},
            ]},
            {"elements": [
                {"type": "field", "id": "Kind", "field_type": "dropdown", "x": 5, "y": 5, "w": 40, "h": 8, "options": ["A", "B"]},
            ]}
        ]
    }));
    let docs = render_both(&spec);
    let simple = rects(&docs[0]);
    let vector = rects(&docs[1]);
    assert_eq!(simple.len(), 3);
    assert_eq!(vector.len(), 3);
    for (a, b) in simple.iter().zip(&vector) {
        for i in 0..4 {
            assert_close(a[i], b[i]);
        }
    }

    // landscape letter is 612 pt tall; the field's top edge sits 30 mm down
    let top = 612.0 - 30.0 / 0.3527777778_f32;
    assert_close(simple[0][3], top);
    assert_close(simple[0][3] - simple[0][1], 9.0 / 0.3527777778);
}

#[test]
fn page_count_and_order_match() {
    let spec = normalized(json!({
        "pages": [
            {"elements": [{"type": "label", "text": "one", "x": 1, "y": 1}]},
            {"elements": []},
            {"elements": [{"type": "label", "text": "three", "x": 1, "y": 1}]},
        ]
    }));
    for doc in render_both(&spec) {
        assert_eq!(doc.get_pages().len(), 3);
    }
}

#[test]
fn engines_report_their_kind() {
    assert_eq!(SimpleCanvasEngine::new().kind(), EngineKind::Simple);
    assert_eq!(VectorCanvasEngine::new().kind(), EngineKind::Vector);
}
