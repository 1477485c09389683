//! Bottom-up drawing surface over `pdf-writer`
//!
//! Every top-down position is converted to points and flipped once, through
//! [`label_y_native`] and [`field_y_native`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use formspec_core::text::latin1_bytes;
use pdf_writer::types::{CidFontType, FieldType, FontFlags, SystemInfo};
use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::appearance::{
    checkbox_off_stream, checkbox_on_stream, field_da, ANNOT_PRINT, CHECKBOX_OFF, CHECKBOX_ON, FLAG_COMBO,
    FLAG_MULTILINE, FORM_DA, PRODUCER,
};
use crate::compose::FormSurface;
use crate::error::RenderError;
use crate::fonts::{BuiltinFont, FontAvailability, FontFace, GlyphSet};
use crate::geometry::{baseline_drop, field_y_native, label_y_native, PageGeometry};
use crate::plan::{LabelFont, LabelRun, Placeholder, WidgetBody, WidgetSpec};

struct VectorPage {
    id: Ref,
    content: Content,
    annots: Vec<Ref>,
}

struct EmbeddedFont {
    id: Ref,
    resource: String,
    glyphs: GlyphSet,
}

pub(crate) struct VectorSurface<'f> {
    pdf: Pdf,
    alloc: Ref,
    geometry: PageGeometry,
    fonts: &'f dyn FontAvailability,
    page_tree: Ref,
    pages: Vec<VectorPage>,
    builtin: BTreeMap<BuiltinFont, Ref>,
    embedded: BTreeMap<String, EmbeddedFont>,
    fields: Vec<Ref>,
}

impl<'f> VectorSurface<'f> {
    pub(crate) fn new(geometry: PageGeometry, fonts: &'f dyn FontAvailability) -> Self {
        let mut alloc = Ref::new(1);
        let page_tree = alloc.bump();
        let mut surface = Self {
            pdf: Pdf::new(),
            alloc,
            geometry,
            fonts,
            page_tree,
            pages: Vec::new(),
            builtin: BTreeMap::new(),
            embedded: BTreeMap::new(),
            fields: Vec::new(),
        };
        surface.use_builtin(BuiltinFont::Helvetica);
        surface.use_builtin(BuiltinFont::ZapfDingbats);
        surface
    }

    fn use_builtin(&mut self, font: BuiltinFont) -> Ref {
        if let Some(id) = self.builtin.get(&font) {
            return *id;
        }
        let id = self.alloc.bump();
        let mut type1 = self.pdf.type1_font(id);
        type1.base_font(Name(font.base_name().as_bytes()));
        if font.is_text_font() {
            type1.pair(Name(b"Encoding"), Name(b"WinAnsiEncoding"));
        }
        type1.finish();
        self.builtin.insert(font, id);
        id
    }

    fn current(&mut self) -> Result<&mut VectorPage, RenderError> {
        self.pages.last_mut().ok_or(RenderError::NoPage)
    }

    fn face(&self, family: &str) -> Result<&'f FontFace, RenderError> {
        self.fonts
            .face(family)
            .ok_or_else(|| RenderError::MissingFace(family.to_string()))
    }

    fn show(&mut self, x: f32, baseline: f32, resource: &str, size: f32, bytes: &[u8]) -> Result<(), RenderError> {
        let content = &mut self.current()?.content;
        content.begin_text();
        content.set_font(Name(resource.as_bytes()), size);
        content.next_line(x, baseline);
        content.show(Str(bytes));
        content.end_text();
        Ok(())
    }

    fn appearance(&mut self, w: f32, h: f32, stream: &[u8]) -> Ref {
        let id = self.alloc.bump();
        let zadb = self.use_builtin(BuiltinFont::ZapfDingbats);
        let mut xobject = self.pdf.form_xobject(id, stream);
        xobject.bbox(Rect::new(0.0, 0.0, w, h));
        xobject.resources().fonts().pair(Name(b"ZaDb"), zadb);
        xobject.finish();
        id
    }

    fn write_embedded(&mut self) -> Result<(), RenderError> {
        let embedded = std::mem::take(&mut self.embedded);
        for (family, font) in &embedded {
            let face = self.face(family)?;
            let base_font = face.base_font_name();
            let metrics = face.metrics();
            let cid_id = self.alloc.bump();
            let descriptor_id = self.alloc.bump();
            let file_id = self.alloc.bump();
            let to_unicode_id = self.alloc.bump();

            self.pdf
                .type0_font(font.id)
                .base_font(Name(base_font.as_bytes()))
                .encoding_predefined(Name(b"Identity-H"))
                .descendant_font(cid_id)
                .to_unicode(to_unicode_id);

            let mut cid = self.pdf.cid_font(cid_id);
            cid.subtype(CidFontType::Type2)
                .base_font(Name(base_font.as_bytes()))
                .system_info(SystemInfo {
                    registry: Str(b"Adobe"),
                    ordering: Str(b"Identity"),
                    supplement: 0,
                })
                .font_descriptor(descriptor_id)
                .cid_to_gid_map_predefined(Name(b"Identity"));
            {
                let mut widths = cid.widths();
                for (gid, width) in font.glyphs.widths(face) {
                    widths.consecutive(gid, [width]);
                }
            }
            cid.finish();

            let flags = if metrics.fixed_pitch {
                FontFlags::NON_SYMBOLIC | FontFlags::FIXED_PITCH
            } else {
                FontFlags::NON_SYMBOLIC
            };
            let [x0, y0, x1, y1] = metrics.bbox;
            self.pdf
                .font_descriptor(descriptor_id)
                .name(Name(base_font.as_bytes()))
                .flags(flags)
                .bbox(Rect::new(x0, y0, x1, y1))
                .italic_angle(0.0)
                .ascent(metrics.ascent)
                .descent(metrics.descent)
                .cap_height(metrics.cap_height)
                .stem_v(80.0)
                .font_file2(file_id);

            self.pdf
                .stream(file_id, face.data())
                .pair(Name(b"Length1"), face.data().len() as i32);

            let cmap = font.glyphs.to_unicode_cmap();
            self.pdf.stream(to_unicode_id, cmap.as_bytes());
        }
        self.embedded = embedded;
        Ok(())
    }

    pub(crate) fn finish(mut self, title: Option<&str>, created_at: DateTime<Utc>) -> Result<Vec<u8>, RenderError> {
        if self.pages.is_empty() {
            self.begin_page()?;
        }
        self.write_embedded()?;

        let mut resources: Vec<(String, Ref)> = self
            .builtin
            .iter()
            .map(|(font, id)| (font.resource_name().to_string(), *id))
            .collect();
        resources.extend(self.embedded.values().map(|font| (font.resource.clone(), font.id)));

        let media_box = Rect::new(0.0, 0.0, self.geometry.width as f32, self.geometry.height as f32);
        let pages = std::mem::take(&mut self.pages);
        let kids: Vec<Ref> = pages.iter().map(|page| page.id).collect();
        for page in pages {
            let content_id = self.alloc.bump();
            self.pdf.stream(content_id, &page.content.finish());

            let mut writer = self.pdf.page(page.id);
            writer.media_box(media_box).parent(self.page_tree).contents(content_id);
            {
                let mut res = writer.resources();
                let mut fonts = res.fonts();
                for (name, id) in &resources {
                    fonts.pair(Name(name.as_bytes()), *id);
                }
            }
            if !page.annots.is_empty() {
                writer.annotations(page.annots.iter().copied());
            }
            writer.finish();
        }
        self.pdf.pages(self.page_tree).kids(kids.iter().copied()).count(kids.len() as i32);

        let helv = self.use_builtin(BuiltinFont::Helvetica);
        let zadb = self.use_builtin(BuiltinFont::ZapfDingbats);
        let acroform_id = self.alloc.bump();
        {
            let mut acroform = self.pdf.indirect(acroform_id).dict();
            acroform.insert(Name(b"Fields")).array().items(self.fields.iter().copied());
            acroform.pair(Name(b"DA"), Str(FORM_DA.as_bytes()));
            let mut dr = acroform.insert(Name(b"DR")).dict();
            dr.insert(Name(b"Font"))
                .dict()
                .pair(Name(b"Helv"), helv)
                .pair(Name(b"ZaDb"), zadb);
        }

        let catalog_id = self.alloc.bump();
        self.pdf
            .catalog(catalog_id)
            .pages(self.page_tree)
            .pair(Name(b"AcroForm"), acroform_id);

        let info_id = self.alloc.bump();
        let date = created_at.format("D:%Y%m%d%H%M%SZ").to_string();
        let mut info = self.pdf.document_info(info_id);
        info.producer(TextStr(PRODUCER));
        info.pair(Name(b"CreationDate"), Str(date.as_bytes()));
        if let Some(title) = title {
            info.title(TextStr(title));
        }
        info.finish();

        Ok(self.pdf.finish())
    }
}

impl FormSurface for VectorSurface<'_> {
    fn begin_page(&mut self) -> Result<(), RenderError> {
        let id = self.alloc.bump();
        self.pages.push(VectorPage {
            id,
            content: Content::new(),
            annots: Vec::new(),
        });
        Ok(())
    }

    fn draw_label(&mut self, x: f64, y: f64, run: &LabelRun) -> Result<usize, RenderError> {
        self.current()?;
        let (resource, bytes, missing) = match &run.font {
            LabelFont::Builtin(font) => {
                self.use_builtin(*font);
                (font.resource_name().to_string(), latin1_bytes(&run.text), 0)
            }
            LabelFont::Embedded(family) => {
                let face = self.face(family)?;
                if !self.embedded.contains_key(family) {
                    let id = self.alloc.bump();
                    let resource = format!("F{}", self.embedded.len() + 1);
                    self.embedded.insert(
                        family.clone(),
                        EmbeddedFont {
                            id,
                            resource,
                            glyphs: GlyphSet::default(),
                        },
                    );
                }
                let font = self
                    .embedded
                    .get_mut(family)
                    .ok_or_else(|| RenderError::MissingFace(family.clone()))?;
                let encoded = font.glyphs.encode(face, &run.text);
                (font.resource.clone(), encoded.bytes, encoded.missing)
            }
        };

        let x_pt = self.geometry.to_points(x);
        let top = label_y_native(self.geometry.height, self.geometry.to_points(y));
        let baseline = top - baseline_drop(run.size);
        self.show(x_pt as f32, baseline as f32, &resource, run.size as f32, &bytes)?;
        Ok(missing)
    }

    fn add_widget(&mut self, widget: &WidgetSpec) -> Result<(), RenderError> {
        let frame = widget.frame;
        let page_id = self.current()?.id;
        let x = self.geometry.to_points(frame.x);
        let w = self.geometry.to_points(frame.w);
        let h = self.geometry.to_points(frame.h);
        let bottom = field_y_native(self.geometry.height, self.geometry.to_points(frame.y), h);
        let rect = Rect::new(x as f32, bottom as f32, (x + w) as f32, (bottom + h) as f32);

        let checkbox_states = match widget.body {
            WidgetBody::Checkbox { .. } => {
                let on = self.appearance(w as f32, h as f32, &checkbox_on_stream(w, h));
                let off = self.appearance(w as f32, h as f32, &checkbox_off_stream(w, h));
                Some((on, off))
            }
            _ => None,
        };

        let id = self.alloc.bump();
        let da = field_da(widget.font_size);
        let mut field = self.pdf.form_field(id);
        field.partial_name(TextStr(&widget.name));
        field
            .pair(Name(b"Type"), Name(b"Annot"))
            .pair(Name(b"Subtype"), Name(b"Widget"))
            .pair(Name(b"Rect"), rect)
            .pair(Name(b"P"), page_id)
            .pair(Name(b"F"), ANNOT_PRINT as i32)
            .pair(Name(b"DA"), Str(da.as_bytes()));

        match &widget.body {
            WidgetBody::Text { multiline, value } => {
                field.field_type(FieldType::Text);
                if *multiline {
                    field.pair(Name(b"Ff"), FLAG_MULTILINE as i32);
                }
                if !value.is_empty() {
                    field.pair(Name(b"V"), TextStr(value));
                }
            }
            WidgetBody::Choice { options, value } => {
                field.field_type(FieldType::Choice);
                field.pair(Name(b"Ff"), FLAG_COMBO as i32);
                field
                    .insert(Name(b"Opt"))
                    .array()
                    .items(options.iter().map(|option| TextStr(option)));
                if !value.is_empty() {
                    field.pair(Name(b"V"), TextStr(value));
                }
            }
            WidgetBody::Checkbox { checked } => {
                field.field_type(FieldType::Button);
                let state = Name(if *checked { CHECKBOX_ON } else { CHECKBOX_OFF });
                field.pair(Name(b"V"), state).pair(Name(b"AS"), state);
                if let Some((on, off)) = checkbox_states {
                    let mut ap = field.insert(Name(b"AP")).dict();
                    ap.insert(Name(b"N"))
                        .dict()
                        .pair(Name(CHECKBOX_ON), on)
                        .pair(Name(CHECKBOX_OFF), off);
                    ap.finish();
                }
            }
        }
        field.finish();

        self.current()?.annots.push(id);
        self.fields.push(id);
        Ok(())
    }

    fn draw_placeholder(&mut self, placeholder: &Placeholder) -> Result<(), RenderError> {
        let frame = placeholder.frame;
        let (w, h) = frame.extent_points(self.geometry.scale());
        let x = self.geometry.to_points(frame.x);
        let top = label_y_native(self.geometry.height, self.geometry.to_points(frame.y));

        let content = &mut self.current()?.content;
        content.save_state();
        content.set_stroke_gray(0.5);
        content.set_line_width(0.5);
        content.rect(x as f32, (top - h) as f32, w as f32, h as f32);
        content.stroke();
        content.restore_state();

        // one point of padding inside the border
        let baseline = top - 1.0 - baseline_drop(placeholder.size);
        let caption = latin1_bytes(&placeholder.caption);
        self.show((x + 1.0) as f32, baseline as f32, "Helv", placeholder.size as f32, &caption)
    }
}
