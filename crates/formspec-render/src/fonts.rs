//! Font provisioning and TrueType embedding support
//!
//! Engines never load fonts themselves. Callers hand over a
//! [`FontAvailability`] oracle, usually a [`FontLibrary`] filled from
//! TrueType bytes; an empty library means every label goes through the
//! built-in Helvetica path.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::debug;
use ttf_parser::{Face, GlyphId};

use crate::error::FontError;

/// Answers whether a font family can be used for text
pub trait FontAvailability {
    fn is_available(&self, family: &str) -> bool;

    /// Parsed face for `family`, when the oracle also carries font data
    fn face(&self, _family: &str) -> Option<&FontFace> {
        None
    }
}

/// Availability table without font data; embedding always fails
impl FontAvailability for HashMap<String, bool> {
    fn is_available(&self, family: &str) -> bool {
        self.get(family).copied().unwrap_or(false)
    }
}

/// Standard 14 fonts the engines rely on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BuiltinFont {
    Helvetica,
    HelveticaBold,
    ZapfDingbats,
}

impl BuiltinFont {
    pub fn base_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helvetica",
            BuiltinFont::HelveticaBold => "Helvetica-Bold",
            BuiltinFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Resource name used in content streams and `/DR`
    pub fn resource_name(&self) -> &'static str {
        match self {
            BuiltinFont::Helvetica => "Helv",
            BuiltinFont::HelveticaBold => "HeBo",
            BuiltinFont::ZapfDingbats => "ZaDb",
        }
    }

    /// Whether the font takes a WinAnsi `/Encoding` entry
    pub fn is_text_font(&self) -> bool {
        !matches!(self, BuiltinFont::ZapfDingbats)
    }
}

/// Metrics in glyph space (1000 units per em)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceMetrics {
    pub ascent: f32,
    pub descent: f32,
    pub cap_height: f32,
    pub bbox: [f32; 4],
    pub fixed_pitch: bool,
}

/// A validated TrueType face registered under a family name
#[derive(Clone)]
pub struct FontFace {
    family: String,
    data: Arc<Vec<u8>>,
    metrics: FaceMetrics,
    units_per_em: u16,
}

impl std::fmt::Debug for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontFace")
            .field("family", &self.family)
            .field("bytes", &self.data.len())
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl FontFace {
    pub fn parse(family: impl Into<String>, data: Vec<u8>) -> Result<Self, FontError> {
        let family = family.into();
        let face = Face::parse(&data, 0).map_err(|e| FontError::InvalidFont {
            family: family.clone(),
            reason: e.to_string(),
        })?;

        let units_per_em = face.units_per_em().max(1);
        let scale = 1000.0 / units_per_em as f32;
        let bbox = face.global_bounding_box();
        let ascent = face.ascender() as f32 * scale;
        let metrics = FaceMetrics {
            ascent,
            descent: face.descender() as f32 * scale,
            cap_height: face
                .capital_height()
                .map(|h| h as f32 * scale)
                .unwrap_or(ascent),
            bbox: [
                bbox.x_min as f32 * scale,
                bbox.y_min as f32 * scale,
                bbox.x_max as f32 * scale,
                bbox.y_max as f32 * scale,
            ],
            fixed_pitch: face.is_monospaced(),
        };

        Ok(Self {
            family,
            data: Arc::new(data),
            metrics,
            units_per_em,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn metrics(&self) -> &FaceMetrics {
        &self.metrics
    }

    /// `/BaseFont` name: the family with anything outside `[A-Za-z0-9-]` removed
    pub fn base_font_name(&self) -> String {
        let name: String = self
            .family
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '-')
            .collect();
        if name.is_empty() {
            "EmbeddedFont".to_string()
        } else {
            name
        }
    }

    fn with_face<R>(&self, f: impl FnOnce(&Face<'_>) -> R) -> Option<R> {
        Face::parse(&self.data, 0).ok().map(|face| f(&face))
    }

    /// Horizontal advance of `gid` in glyph space
    pub fn advance(&self, gid: u16) -> f32 {
        let scale = 1000.0 / self.units_per_em as f32;
        self.with_face(|face| face.glyph_hor_advance(GlyphId(gid)).unwrap_or(0))
            .unwrap_or(0) as f32
            * scale
    }
}

/// Family name to parsed face
#[derive(Debug, Clone, Default)]
pub struct FontLibrary {
    faces: BTreeMap<String, FontFace>,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register TrueType bytes under `family`, replacing any previous face
    pub fn add(&mut self, family: impl Into<String>, data: Vec<u8>) -> Result<(), FontError> {
        let face = FontFace::parse(family, data)?;
        debug!(family = face.family(), bytes = face.data().len(), "registered font");
        self.faces.insert(face.family.clone(), face);
        Ok(())
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.faces.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl FontAvailability for FontLibrary {
    fn is_available(&self, family: &str) -> bool {
        self.faces.contains_key(family)
    }

    fn face(&self, family: &str) -> Option<&FontFace> {
        self.faces.get(family)
    }
}

/// Text encoded as two-byte glyph ids for an Identity-H font
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EncodedText {
    pub bytes: Vec<u8>,
    /// Characters the face has no glyph for; drawn as glyph 0
    pub missing: usize,
}

/// Glyphs used from one embedded face, with the character each one shows
#[derive(Debug, Clone, Default)]
pub(crate) struct GlyphSet {
    glyphs: BTreeMap<u16, char>,
}

impl GlyphSet {
    pub(crate) fn encode(&mut self, face: &FontFace, text: &str) -> EncodedText {
        let ids: Vec<Option<u16>> = face
            .with_face(|parsed| {
                text.chars()
                    .map(|ch| parsed.glyph_index(ch).map(|gid| gid.0))
                    .collect()
            })
            .unwrap_or_else(|| text.chars().map(|_| None).collect());

        let mut bytes = Vec::with_capacity(ids.len() * 2);
        let mut missing = 0;
        for (ch, gid) in text.chars().zip(ids) {
            let gid = match gid {
                Some(gid) => {
                    self.glyphs.entry(gid).or_insert(ch);
                    gid
                }
                None => {
                    missing += 1;
                    0
                }
            };
            bytes.extend_from_slice(&gid.to_be_bytes());
        }
        EncodedText { bytes, missing }
    }

    /// `(gid, advance)` for every used glyph, in glyph order
    pub(crate) fn widths(&self, face: &FontFace) -> Vec<(u16, f32)> {
        self.glyphs.keys().map(|&gid| (gid, face.advance(gid))).collect()
    }

    /// ToUnicode CMap mapping each used glyph back to its character
    pub(crate) fn to_unicode_cmap(&self) -> String {
        let entries: Vec<(u16, char)> = self.glyphs.iter().map(|(g, c)| (*g, *c)).collect();

        let mut out = String::new();
        out.push_str("/CIDInit /ProcSet findresource begin\n");
        out.push_str("12 dict begin\n");
        out.push_str("begincmap\n");
        out.push_str("/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        out.push_str("/CMapName /Adobe-Identity-UCS def\n");
        out.push_str("/CMapType 2 def\n");
        out.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        for chunk in entries.chunks(100) {
            out.push_str(&format!("{} beginbfchar\n", chunk.len()));
            for (gid, ch) in chunk {
                let mut units = [0u16; 2];
                let hex: String = ch
                    .encode_utf16(&mut units)
                    .iter()
                    .map(|unit| format!("{unit:04X}"))
                    .collect();
                out.push_str(&format!("<{gid:04X}> <{hex}>\n"));
            }
            out.push_str("endbfchar\n");
        }

        out.push_str("endcmap\n");
        out.push_str("CMapName currentdict /CMap defineresource pop\n");
        out.push_str("end\nend\n");
        out
    }
}
