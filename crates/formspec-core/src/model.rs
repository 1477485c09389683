//! Typed view of a normalized spec
//!
//! The generic tree stays the source of truth (unknown keys survive
//! normalization); these types are what the engines and exporters read.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::units::{Unit, MM_PER_PT};

/// Supported paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum PageSize {
    #[default]
    A4,
    #[serde(rename = "LETTER")]
    Letter,
}

impl PageSize {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_uppercase().as_str() {
            "A4" => Some(PageSize::A4),
            "LETTER" => Some(PageSize::Letter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::Letter => "LETTER",
        }
    }

    /// Portrait (width, height) in points
    pub fn portrait_points(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (210.0 / MM_PER_PT, 297.0 / MM_PER_PT),
            PageSize::Letter => (612.0, 792.0),
        }
    }

    /// (width, height) in points for the given orientation
    pub fn points(&self, orientation: Orientation) -> (f64, f64) {
        let (w, h) = self.portrait_points();
        match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }
}

impl From<String> for PageSize {
    fn from(raw: String) -> Self {
        PageSize::parse(&raw).unwrap_or_default()
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageSize::parse(s).ok_or_else(|| format!("Unknown page size: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "portrait" => Some(Orientation::Portrait),
            "landscape" => Some(Orientation::Landscape),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

/// Declared `field_type` of a field element
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Text,
    Textarea,
    Checkbox,
    Dropdown,
    Radio,
    Combo,
    Other(String),
}

impl FieldKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "text" => FieldKind::Text,
            "textarea" => FieldKind::Textarea,
            "checkbox" => FieldKind::Checkbox,
            "dropdown" => FieldKind::Dropdown,
            "radio" => FieldKind::Radio,
            "combo" => FieldKind::Combo,
            other => FieldKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Dropdown => "dropdown",
            FieldKind::Radio => "radio",
            FieldKind::Combo => "combo",
            FieldKind::Other(raw) => raw,
        }
    }

    /// Whether the field needs a non-empty `options` list
    pub fn is_choice(&self) -> bool {
        matches!(self, FieldKind::Dropdown | FieldKind::Radio | FieldKind::Combo)
    }
}

/// The interactive widget a field becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    TextInput { multiline: bool },
    Choice,
    Checkbox,
}

/// Widget selection for a field; `fallback` marks an unrecognised type rendered as text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetPlan {
    pub kind: WidgetKind,
    pub fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Margin {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSettings {
    pub title: Option<String>,
    pub page_size: PageSize,
    pub orientation: Orientation,
    pub unit: Unit,
    pub margin: Margin,
}

impl DocumentSettings {
    /// Page (width, height) in points
    pub fn page_points(&self) -> (f64, f64) {
        self.page_size.points(self.orientation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSpec {
    pub family: String,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FontSettings {
    pub default: FontSpec,
    pub cjk: FontSpec,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            default: FontSpec {
                family: "DejaVuSans".to_string(),
                size: 11.0,
            },
            cjk: FontSpec {
                family: "NotoSansTC".to_string(),
                size: 11.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Label {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub size: Option<f64>,
    pub style: String,
}

impl Label {
    pub fn is_bold(&self) -> bool {
        self.style.contains('B')
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub id: String,
    /// AcroForm field name; the `id` when no name is declared
    pub name: String,
    #[serde(serialize_with = "serialize_kind")]
    pub kind: FieldKind,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub options: Vec<String>,
    pub value: Option<Value>,
    pub multiline: bool,
    pub required: bool,
}

fn serialize_kind<S: serde::Serializer>(kind: &FieldKind, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(kind.as_str())
}

impl Field {
    pub fn widget(&self) -> WidgetPlan {
        let (kind, fallback) = match &self.kind {
            FieldKind::Text => (
                WidgetKind::TextInput {
                    multiline: self.multiline,
                },
                false,
            ),
            FieldKind::Textarea => (WidgetKind::TextInput { multiline: true }, false),
            FieldKind::Checkbox => (WidgetKind::Checkbox, false),
            FieldKind::Dropdown | FieldKind::Radio | FieldKind::Combo => (WidgetKind::Choice, false),
            FieldKind::Other(_) => (
                WidgetKind::TextInput {
                    multiline: self.multiline,
                },
                true,
            ),
        };
        WidgetPlan { kind, fallback }
    }

    /// Text form of the scalar `value`, empty when absent
    pub fn value_text(&self) -> String {
        match &self.value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn is_checked(&self) -> bool {
        crate::value::truthy(self.value.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Label(Label),
    Field(Field),
    /// Anything that is neither a label nor a field; engines log and skip it
    Unsupported { kind: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub number: Option<i64>,
    pub elements: Vec<Element>,
}

impl Page {
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.elements.iter().filter_map(|el| match el {
            Element::Label(label) => Some(label),
            _ => None,
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.elements.iter().filter_map(|el| match el {
            Element::Field(field) => Some(field),
            _ => None,
        })
    }
}

/// Typed form of a normalized spec
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSpec {
    pub document: DocumentSettings,
    pub fonts: FontSettings,
    pub pages: Vec<Page>,
}

impl FormSpec {
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.pages.iter().flat_map(Page::fields)
    }

    /// Field names in spec order, first occurrence wins
    pub fn field_names(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.fields()
            .filter(|field| !field.name.is_empty())
            .filter(|field| seen.insert(field.name.as_str()))
            .map(|field| field.name.clone())
            .collect()
    }
}
