//! Top-down drawing canvas over `lopdf`
//!
//! Positions are kept in spec units measured from the top-left corner and
//! only turned into PDF user space (`(H - y) * k`) when an operator is
//! emitted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use formspec_core::text::latin1_bytes;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::appearance::{
    checkbox_off_stream, checkbox_on_stream, field_da, is_plain_ascii, utf16_text, ANNOT_PRINT, CHECKBOX_OFF,
    CHECKBOX_ON, FLAG_COMBO, FLAG_MULTILINE, FORM_DA, PRODUCER,
};
use crate::compose::FormSurface;
use crate::error::RenderError;
use crate::fonts::{BuiltinFont, FontAvailability, FontFace, GlyphSet};
use crate::geometry::{PageGeometry, BASELINE_RATIO};
use crate::plan::{LabelFont, LabelRun, Placeholder, WidgetBody, WidgetSpec};

struct PageBuffer {
    id: ObjectId,
    operations: Vec<Operation>,
    annots: Vec<ObjectId>,
}

struct EmbeddedFont {
    id: ObjectId,
    resource: String,
    glyphs: GlyphSet,
}

pub(crate) struct SimpleCanvas<'f> {
    doc: Document,
    fonts: &'f dyn FontAvailability,
    /// Points per spec unit
    k: f64,
    /// Page width in spec units
    w: f64,
    /// Page height in spec units
    h: f64,
    pages_id: ObjectId,
    pages: Vec<PageBuffer>,
    helv: ObjectId,
    zadb: ObjectId,
    builtin: BTreeMap<BuiltinFont, ObjectId>,
    embedded: BTreeMap<String, EmbeddedFont>,
    fields: Vec<ObjectId>,
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

fn literal(text: &str) -> Object {
    Object::String(text.as_bytes().to_vec(), StringFormat::Literal)
}

/// PDF text string: plain ASCII as a literal, anything else as UTF-16BE
fn text_string(text: &str) -> Object {
    if is_plain_ascii(text) {
        literal(text)
    } else {
        Object::String(utf16_text(text), StringFormat::Hexadecimal)
    }
}

fn builtin_dict(font: BuiltinFont) -> Dictionary {
    let mut dict = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_name(),
    };
    if font.is_text_font() {
        dict.set("Encoding", "WinAnsiEncoding");
    }
    dict
}

impl<'f> SimpleCanvas<'f> {
    pub(crate) fn new(geometry: &PageGeometry, fonts: &'f dyn FontAvailability) -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let (w, h) = geometry.size_in_units();

        let helv = doc.add_object(builtin_dict(BuiltinFont::Helvetica));
        let zadb = doc.add_object(builtin_dict(BuiltinFont::ZapfDingbats));
        let builtin = BTreeMap::from([(BuiltinFont::Helvetica, helv), (BuiltinFont::ZapfDingbats, zadb)]);

        Self {
            doc,
            fonts,
            k: geometry.scale(),
            w,
            h,
            pages_id,
            pages: Vec::new(),
            helv,
            zadb,
            builtin,
            embedded: BTreeMap::new(),
            fields: Vec::new(),
        }
    }

    /// User-space y of a top-down position
    fn native_y(&self, y: f64) -> f64 {
        (self.h - y) * self.k
    }

    fn current(&mut self) -> Result<&mut PageBuffer, RenderError> {
        self.pages.last_mut().ok_or(RenderError::NoPage)
    }

    fn use_builtin(&mut self, font: BuiltinFont) {
        if !self.builtin.contains_key(&font) {
            let id = self.doc.add_object(builtin_dict(font));
            self.builtin.insert(font, id);
        }
    }

    fn face(&self, family: &str) -> Result<&'f FontFace, RenderError> {
        self.fonts
            .face(family)
            .ok_or_else(|| RenderError::MissingFace(family.to_string()))
    }

    fn text_op(&mut self, x: f64, baseline: f64, resource: &str, size: f64, text: Object) -> Result<(), RenderError> {
        let x = x * self.k;
        let y = self.native_y(baseline);
        self.current()?.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(resource.as_bytes().to_vec()), real(size)]),
            Operation::new("Td", vec![real(x), real(y)]),
            Operation::new("Tj", vec![text]),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    fn appearance(&mut self, w: f64, h: f64, stream: Vec<u8>) -> ObjectId {
        let zadb = self.zadb;
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![real(0.0), real(0.0), real(w), real(h)],
            "Resources" => dictionary! {
                "Font" => dictionary! { "ZaDb" => Object::Reference(zadb) },
            },
        };
        self.doc.add_object(Stream::new(dict, stream))
    }

    fn font_resources(&self) -> Dictionary {
        let mut fonts = Dictionary::new();
        for (font, id) in &self.builtin {
            fonts.set(font.resource_name(), Object::Reference(*id));
        }
        for font in self.embedded.values() {
            fonts.set(font.resource.as_str(), Object::Reference(font.id));
        }
        fonts
    }

    fn write_embedded(&mut self) -> Result<(), RenderError> {
        let embedded = std::mem::take(&mut self.embedded);
        for (family, font) in &embedded {
            let face = self.face(family)?;
            let base_font = face.base_font_name();
            let metrics = face.metrics();

            let file_id = self.doc.add_object(Stream::new(
                dictionary! { "Length1" => face.data().len() as i64 },
                face.data().to_vec(),
            ));
            let descriptor_id = self.doc.add_object(dictionary! {
                "Type" => "FontDescriptor",
                "FontName" => Object::Name(base_font.as_bytes().to_vec()),
                "Flags" => if metrics.fixed_pitch { 33 } else { 32 },
                "FontBBox" => metrics.bbox.iter().map(|v| real(*v as f64)).collect::<Vec<_>>(),
                "ItalicAngle" => 0,
                "Ascent" => real(metrics.ascent as f64),
                "Descent" => real(metrics.descent as f64),
                "CapHeight" => real(metrics.cap_height as f64),
                "StemV" => 80,
                "FontFile2" => Object::Reference(file_id),
            });

            let mut widths = Vec::new();
            for (gid, width) in font.glyphs.widths(face) {
                widths.push(Object::Integer(gid as i64));
                widths.push(Object::Array(vec![real(width as f64)]));
            }
            let cid_id = self.doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "CIDFontType2",
                "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
                "CIDSystemInfo" => dictionary! {
                    "Registry" => literal("Adobe"),
                    "Ordering" => literal("Identity"),
                    "Supplement" => 0,
                },
                "FontDescriptor" => Object::Reference(descriptor_id),
                "CIDToGIDMap" => "Identity",
                "W" => widths,
            });
            let to_unicode_id = self.doc.add_object(Stream::new(
                Dictionary::new(),
                font.glyphs.to_unicode_cmap().into_bytes(),
            ));

            self.doc.objects.insert(
                font.id,
                Object::Dictionary(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type0",
                    "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
                    "Encoding" => "Identity-H",
                    "DescendantFonts" => vec![Object::Reference(cid_id)],
                    "ToUnicode" => Object::Reference(to_unicode_id),
                }),
            );
        }
        self.embedded = embedded;
        Ok(())
    }

    /// Write every deferred object and serialize the document
    pub(crate) fn finish(mut self, title: Option<&str>, created_at: DateTime<Utc>) -> Result<Vec<u8>, RenderError> {
        if self.pages.is_empty() {
            self.begin_page()?;
        }
        self.write_embedded()?;

        let fonts = self.font_resources();
        let media_box = vec![real(0.0), real(0.0), real(self.w * self.k), real(self.h * self.k)];
        let pages = std::mem::take(&mut self.pages);
        let mut kids = Vec::with_capacity(pages.len());
        for page in pages {
            let content = Content {
                operations: page.operations,
            }
            .encode()
            .map_err(|e| RenderError::ContentEncoding(e.to_string()))?;
            let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

            let mut dict = dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(self.pages_id),
                "MediaBox" => media_box.clone(),
                "Contents" => Object::Reference(content_id),
                "Resources" => dictionary! { "Font" => fonts.clone() },
            };
            if !page.annots.is_empty() {
                dict.set(
                    "Annots",
                    page.annots.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
                );
            }
            self.doc.objects.insert(page.id, Object::Dictionary(dict));
            kids.push(Object::Reference(page.id));
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let acroform_id = self.doc.add_object(dictionary! {
            "Fields" => self.fields.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "DA" => literal(FORM_DA),
            "DR" => dictionary! {
                "Font" => dictionary! {
                    "Helv" => Object::Reference(self.helv),
                    "ZaDb" => Object::Reference(self.zadb),
                },
            },
        });
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(self.pages_id),
            "AcroForm" => Object::Reference(acroform_id),
        });
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut info = dictionary! {
            "Producer" => literal(PRODUCER),
            "CreationDate" => literal(&created_at.format("D:%Y%m%d%H%M%SZ").to_string()),
        };
        if let Some(title) = title {
            info.set("Title", text_string(title));
        }
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", Object::Reference(info_id));

        let mut buffer = Vec::new();
        self.doc
            .save_to(&mut buffer)
            .map_err(|e| RenderError::Serialization(e.to_string()))?;
        Ok(buffer)
    }
}

impl FormSurface for SimpleCanvas<'_> {
    fn begin_page(&mut self) -> Result<(), RenderError> {
        let id = self.doc.new_object_id();
        self.pages.push(PageBuffer {
            id,
            operations: Vec::new(),
            annots: Vec::new(),
        });
        Ok(())
    }

    fn draw_label(&mut self, x: f64, y: f64, run: &LabelRun) -> Result<usize, RenderError> {
        self.current()?;
        let (resource, text, missing) = match &run.font {
            LabelFont::Builtin(font) => {
                self.use_builtin(*font);
                let bytes = latin1_bytes(&run.text);
                (font.resource_name().to_string(), Object::String(bytes, StringFormat::Literal), 0)
            }
            LabelFont::Embedded(family) => {
                let face = self.face(family)?;
                let next = self.embedded.len() + 1;
                if !self.embedded.contains_key(family) {
                    let id = self.doc.new_object_id();
                    self.embedded.insert(
                        family.clone(),
                        EmbeddedFont {
                            id,
                            resource: format!("F{next}"),
                            glyphs: GlyphSet::default(),
                        },
                    );
                }
                let font = self
                    .embedded
                    .get_mut(family)
                    .ok_or_else(|| RenderError::MissingFace(family.clone()))?;
                let encoded = font.glyphs.encode(face, &run.text);
                (
                    font.resource.clone(),
                    Object::String(encoded.bytes, StringFormat::Hexadecimal),
                    encoded.missing,
                )
            }
        };

        // text line top to baseline, converted back into spec units
        let baseline = y + BASELINE_RATIO * run.size / self.k;
        self.text_op(x, baseline, &resource, run.size, text)?;
        Ok(missing)
    }

    fn add_widget(&mut self, widget: &WidgetSpec) -> Result<(), RenderError> {
        let frame = widget.frame;
        let page_id = self.current()?.id;
        let (w_pt, h_pt) = (frame.w * self.k, frame.h * self.k);
        let rect = vec![
            real(frame.x * self.k),
            real(self.native_y(frame.y + frame.h)),
            real((frame.x + frame.w) * self.k),
            real(self.native_y(frame.y)),
        ];

        let mut dict = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "T" => text_string(&widget.name),
            "Rect" => rect,
            "P" => Object::Reference(page_id),
            "F" => ANNOT_PRINT,
            "DA" => literal(&field_da(widget.font_size)),
        };

        match &widget.body {
            WidgetBody::Text { multiline, value } => {
                dict.set("FT", "Tx");
                if *multiline {
                    dict.set("Ff", FLAG_MULTILINE);
                }
                if !value.is_empty() {
                    dict.set("V", text_string(value));
                }
            }
            WidgetBody::Choice { options, value } => {
                dict.set("FT", "Ch");
                dict.set("Ff", FLAG_COMBO);
                dict.set("Opt", options.iter().map(|o| text_string(o)).collect::<Vec<_>>());
                if !value.is_empty() {
                    dict.set("V", text_string(value));
                }
            }
            WidgetBody::Checkbox { checked } => {
                let on = self.appearance(w_pt, h_pt, checkbox_on_stream(w_pt, h_pt));
                let off = self.appearance(w_pt, h_pt, checkbox_off_stream(w_pt, h_pt));
                let state = if *checked { CHECKBOX_ON } else { CHECKBOX_OFF };
                dict.set("FT", "Btn");
                dict.set("V", Object::Name(state.to_vec()));
                dict.set("AS", Object::Name(state.to_vec()));
                dict.set(
                    "AP",
                    dictionary! {
                        "N" => dictionary! {
                            "Yes" => Object::Reference(on),
                            "Off" => Object::Reference(off),
                        },
                    },
                );
            }
        }

        let id = self.doc.add_object(dict);
        self.current()?.annots.push(id);
        self.fields.push(id);
        Ok(())
    }

    fn draw_placeholder(&mut self, placeholder: &Placeholder) -> Result<(), RenderError> {
        let frame = placeholder.frame;
        let (w_pt, h_pt) = frame.extent_points(self.k);
        let x = frame.x * self.k;
        let top = self.native_y(frame.y);
        self.current()?.operations.extend([
            Operation::new("q", vec![]),
            Operation::new("G", vec![real(0.5)]),
            Operation::new("w", vec![real(0.5)]),
            Operation::new("re", vec![real(x), real(top - h_pt), real(w_pt), real(h_pt)]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ]);

        let caption = Object::String(latin1_bytes(&placeholder.caption), StringFormat::Literal);
        // one point of padding inside the border
        let baseline = frame.y + (1.0 + BASELINE_RATIO * placeholder.size) / self.k;
        self.text_op(frame.x + 1.0 / self.k, baseline, "Helv", placeholder.size, caption)
    }
}
