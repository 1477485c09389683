//! AcroForm field extraction
//!
//! Reads `/Root /AcroForm /Fields` out of arbitrary PDF bytes. Malformed
//! entries degrade to empty attributes; only a file lopdf cannot load at all
//! is an error.

use std::collections::{BTreeMap, HashSet};

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ReconcileError;
use crate::text::decode_text_string;

/// Nesting limit for `/Kids` walks
const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedField {
    /// Bare PDF field type name (`Tx`, `Ch`, `Btn`, `Sig`), empty when absent
    pub field_type: String,
    /// Fully qualified field name
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedFields {
    pub fields: BTreeMap<String, ExtractedField>,
    /// Field names, sorted
    pub names: Vec<String>,
    pub raw_count: usize,
}

impl ExtractedFields {
    fn from_fields(fields: BTreeMap<String, ExtractedField>) -> Self {
        let names = fields.keys().cloned().collect();
        let raw_count = fields.len();
        Self {
            fields,
            names,
            raw_count,
        }
    }
}

/// Extract every terminal AcroForm field from `pdf`.
pub fn extract_fields(pdf: &[u8]) -> Result<ExtractedFields, ReconcileError> {
    let doc = Document::load_mem(pdf).map_err(|e| ReconcileError::UnreadablePdf(e.to_string()))?;

    let Some(catalog) = catalog(&doc) else {
        warn!("PDF has no readable catalog; no fields extracted");
        return Ok(ExtractedFields::default());
    };
    let Some(acroform) = catalog
        .get(b"AcroForm")
        .ok()
        .and_then(|obj| resolve(&doc, obj))
        .and_then(|obj| obj.as_dict().ok())
    else {
        debug!("PDF has no AcroForm");
        return Ok(ExtractedFields::default());
    };

    let roots = acroform
        .get(b"Fields")
        .ok()
        .and_then(|obj| resolve(&doc, obj))
        .and_then(|obj| obj.as_array().ok())
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    let mut walker = FieldWalker {
        doc: &doc,
        visited: HashSet::new(),
        fields: BTreeMap::new(),
    };
    for root in roots {
        walker.walk(root, None, None, 0);
    }

    debug!(fields = walker.fields.len(), "extracted AcroForm fields");
    Ok(ExtractedFields::from_fields(walker.fields))
}

struct FieldWalker<'a> {
    doc: &'a Document,
    visited: HashSet<ObjectId>,
    fields: BTreeMap<String, ExtractedField>,
}

impl<'a> FieldWalker<'a> {
    fn walk(&mut self, node: &'a Object, parent: Option<&str>, inherited_type: Option<&str>, depth: usize) {
        if depth > MAX_DEPTH {
            warn!(depth, "AcroForm field tree too deep; stopping");
            return;
        }
        if let Object::Reference(id) = node {
            if !self.visited.insert(*id) {
                return;
            }
        }
        let Some(dict) = resolve(self.doc, node).and_then(|obj| obj.as_dict().ok()) else {
            return;
        };

        let partial = dict.get(b"T").ok().map(|obj| self.text(obj));
        let name = match (parent, partial) {
            (Some(parent), Some(partial)) => format!("{parent}.{partial}"),
            (None, Some(partial)) => partial,
            (Some(parent), None) => parent.to_string(),
            (None, None) => String::new(),
        };
        let field_type = dict
            .get(b"FT")
            .ok()
            .and_then(|obj| resolve(self.doc, obj))
            .and_then(|obj| obj.as_name().ok())
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .or_else(|| inherited_type.map(str::to_string));

        let kids = self.kids(dict);
        let named_kids: Vec<&'a Object> = kids
            .iter()
            .copied()
            .filter(|kid| self.has_partial_name(kid))
            .collect();

        if named_kids.is_empty() {
            if name.is_empty() {
                debug!("skipping unnamed AcroForm entry");
                return;
            }
            let value = dict
                .get(b"V")
                .ok()
                .map(|obj| self.value(obj))
                .unwrap_or_default();
            self.fields.insert(
                name.clone(),
                ExtractedField {
                    field_type: field_type.unwrap_or_default(),
                    name,
                    value,
                },
            );
            return;
        }

        let parent_name = (!name.is_empty()).then_some(name.as_str());
        for kid in named_kids {
            self.walk(kid, parent_name, field_type.as_deref(), depth + 1);
        }
    }

    fn kids(&self, dict: &'a Dictionary) -> Vec<&'a Object> {
        dict.get(b"Kids")
            .ok()
            .and_then(|obj| resolve(self.doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .map(|kids| kids.iter().collect())
            .unwrap_or_default()
    }

    fn has_partial_name(&self, node: &Object) -> bool {
        resolve(self.doc, node)
            .and_then(|obj| obj.as_dict().ok())
            .is_some_and(|dict| dict.has(b"T"))
    }

    fn text(&self, obj: &Object) -> String {
        match resolve(self.doc, obj) {
            Some(Object::String(bytes, _)) => decode_text_string(bytes),
            Some(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
            _ => String::new(),
        }
    }

    /// Text form of a field value; anything unreadable becomes empty
    fn value(&self, obj: &Object) -> String {
        match resolve(self.doc, obj) {
            Some(Object::String(bytes, _)) => decode_text_string(bytes),
            Some(Object::Name(name)) => String::from_utf8_lossy(name).into_owned(),
            Some(Object::Integer(i)) => i.to_string(),
            Some(Object::Real(r)) => r.to_string(),
            Some(Object::Boolean(b)) => b.to_string(),
            Some(Object::Array(items)) => items
                .iter()
                .map(|item| self.value(item))
                .collect::<Vec<_>>()
                .join(", "),
            _ => String::new(),
        }
    }
}

fn catalog(doc: &Document) -> Option<&Dictionary> {
    let root = doc.trailer.get(b"Root").ok()?;
    resolve(doc, root)?.as_dict().ok()
}

/// Follow a reference chain to the object it names
fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    let mut current = obj;
    for _ in 0..MAX_DEPTH {
        match current {
            Object::Reference(id) => current = doc.get_object(*id).ok()?,
            other => return Some(other),
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::StringFormat;
    use pretty_assertions::assert_eq;

    fn literal(text: &str) -> Object {
        Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
    }

    fn name(value: &str) -> Object {
        Object::Name(value.as_bytes().to_vec())
    }

    /// Minimal one-page document whose AcroForm lists `fields`
    fn document_with(build: impl FnOnce(&mut Document) -> Vec<Object>) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", name("Page")),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
        ]));
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", name("Pages")),
                ("Count", Object::Integer(1)),
                ("Kids", Object::Array(vec![Object::Reference(page_id)])),
            ])),
        );
        let fields = build(&mut doc);
        let acroform_id = doc.add_object(Dictionary::from_iter(vec![("Fields", Object::Array(fields))]));
        let catalog_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", name("Catalog")),
            ("Pages", Object::Reference(pages_id)),
            ("AcroForm", Object::Reference(acroform_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_flat_fields() {
        let pdf = document_with(|doc| {
            let a = doc.add_object(Dictionary::from_iter(vec![
                ("FT", name("Tx")),
                ("T", literal("Full_Name")),
                ("V", literal("Ada")),
            ]));
            let b = doc.add_object(Dictionary::from_iter(vec![
                ("FT", name("Btn")),
                ("T", literal("Confirm")),
                ("V", name("Yes")),
            ]));
            vec![Object::Reference(a), Object::Reference(b)]
        });
        let extracted = extract_fields(&pdf).unwrap();
        assert_eq!(extracted.names, vec!["Confirm".to_string(), "Full_Name".to_string()]);
        assert_eq!(extracted.raw_count, 2);
        assert_eq!(
            extracted.fields["Full_Name"],
            ExtractedField {
                field_type: "Tx".into(),
                name: "Full_Name".into(),
                value: "Ada".into(),
            }
        );
        assert_eq!(extracted.fields["Confirm"].value, "Yes");
    }

    #[test]
    fn test_nested_kids_inherit_type() {
        let pdf = document_with(|doc| {
            let first = doc.add_object(Dictionary::from_iter(vec![("T", literal("first"))]));
            let widget = doc.add_object(Dictionary::from_iter(vec![("Subtype", name("Widget"))]));
            let last = doc.add_object(Dictionary::from_iter(vec![
                ("T", literal("last")),
                ("Kids", Object::Array(vec![Object::Reference(widget)])),
                ("V", Object::Array(vec![literal("a"), literal("b")])),
            ]));
            let parent = doc.add_object(Dictionary::from_iter(vec![
                ("FT", name("Tx")),
                ("T", literal("applicant")),
                (
                    "Kids",
                    Object::Array(vec![Object::Reference(first), Object::Reference(last)]),
                ),
            ]));
            vec![Object::Reference(parent)]
        });
        let extracted = extract_fields(&pdf).unwrap();
        assert_eq!(
            extracted.names,
            vec!["applicant.first".to_string(), "applicant.last".to_string()]
        );
        assert_eq!(extracted.fields["applicant.first"].field_type, "Tx");
        assert_eq!(extracted.fields["applicant.last"].value, "a, b");
    }

    #[test]
    fn test_malformed_entries_default_to_empty() {
        let pdf = document_with(|doc| {
            let no_type = doc.add_object(Dictionary::from_iter(vec![
                ("T", literal("Loose")),
                ("V", Object::Dictionary(Dictionary::new())),
            ]));
            vec![
                Object::Reference(no_type),
                Object::Integer(7),
                Object::Reference((999, 0)),
            ]
        });
        let extracted = extract_fields(&pdf).unwrap();
        assert_eq!(extracted.names, vec!["Loose".to_string()]);
        assert_eq!(extracted.fields["Loose"].field_type, "");
        assert_eq!(extracted.fields["Loose"].value, "");
    }

    #[test]
    fn test_document_without_acroform() {
        let pdf = {
            let mut doc = Document::with_version("1.7");
            let pages_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", name("Pages")),
                ("Count", Object::Integer(0)),
                ("Kids", Object::Array(vec![])),
            ]));
            let catalog_id = doc.add_object(Dictionary::from_iter(vec![
                ("Type", name("Catalog")),
                ("Pages", Object::Reference(pages_id)),
            ]));
            doc.trailer.set("Root", Object::Reference(catalog_id));
            let mut buffer = Vec::new();
            doc.save_to(&mut buffer).unwrap();
            buffer
        };
        assert_eq!(extract_fields(&pdf).unwrap(), ExtractedFields::default());
    }

    #[test]
    fn test_garbage_is_unreadable() {
        let err = extract_fields(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ReconcileError::UnreadablePdf(_)));
    }
}
