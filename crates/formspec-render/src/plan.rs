//! Engine-neutral decisions for labels and fields
//!
//! Both engines draw exactly what these plans say, so font choice,
//! sanitization, widget typing and placeholder rules cannot drift apart.

use formspec_core::text::{contains_cjk, sanitize_latin1};
use formspec_core::{Field, FontSettings, Label, WidgetKind};

use crate::fonts::{BuiltinFont, FontAvailability};
use crate::geometry::Frame;

/// Font a label is drawn with
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LabelFont {
    Embedded(String),
    Builtin(BuiltinFont),
}

/// A label ready to draw: resolved font, size in points and final text
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LabelRun {
    pub font: LabelFont,
    pub size: f64,
    pub text: String,
    /// Log lines produced while choosing the font
    pub notes: Vec<String>,
}

pub(crate) fn plan_label(label: &Label, settings: &FontSettings, fonts: &dyn FontAvailability) -> LabelRun {
    let base = settings.default.size;
    let size = label
        .size
        .filter(|size| size.is_finite() && *size > 0.0)
        .unwrap_or(base);
    let cjk_ok = fonts.is_available(&settings.cjk.family);
    let default_ok = fonts.is_available(&settings.default.family);

    let family = if contains_cjk(&label.text) && cjk_ok {
        Some(settings.cjk.family.as_str())
    } else if default_ok {
        Some(settings.default.family.as_str())
    } else {
        None
    };

    let mut notes = Vec::new();
    match family {
        Some(family) if fonts.face(family).is_some() => {
            if label.is_bold() {
                notes.push(format!("style 'B' unavailable for {family}; used regular"));
            }
            LabelRun {
                font: LabelFont::Embedded(family.to_string()),
                size,
                text: label.text.clone(),
                notes,
            }
        }
        Some(family) => {
            notes.push(format!("font {family} could not be embedded; using Helvetica"));
            LabelRun {
                font: LabelFont::Builtin(BuiltinFont::Helvetica),
                size: base,
                text: sanitize_latin1(&label.text),
                notes,
            }
        }
        None => {
            let text = sanitize_latin1(&label.text);
            if !cjk_ok && !default_ok {
                notes.push("sanitized label text (no unicode fonts available)".to_string());
            } else if text != label.text {
                notes.push("sanitized label text for built-in font".to_string());
            }
            let font = if label.is_bold() {
                BuiltinFont::HelveticaBold
            } else {
                BuiltinFont::Helvetica
            };
            LabelRun {
                font: LabelFont::Builtin(font),
                size,
                text,
                notes,
            }
        }
    }
}

/// Content of an interactive widget
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WidgetBody {
    Text { multiline: bool, value: String },
    Choice { options: Vec<String>, value: String },
    Checkbox { checked: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WidgetSpec {
    pub name: String,
    pub frame: Frame,
    pub body: WidgetBody,
    /// Default appearance font size in points
    pub font_size: f64,
}

/// Why a field became a placeholder instead of a widget
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Placeholder {
    pub frame: Frame,
    pub caption: String,
    pub size: f64,
    pub reason: String,
}

/// Bordered stand-in for a field that could not become a widget
pub(crate) fn placeholder(field: &Field, settings: &FontSettings, reason: String) -> Placeholder {
    Placeholder {
        frame: Frame {
            x: field.x,
            y: field.y,
            w: field.w,
            h: field.h,
        },
        caption: sanitize_latin1(&format!("[{}] {}", field.kind.as_str(), field.name)),
        size: (settings.default.size - 1.0).max(7.0),
        reason,
    }
}

pub(crate) enum FieldPlan {
    Widget { widget: WidgetSpec, fallback: bool },
    Placeholder(Placeholder),
}

pub(crate) fn plan_field(field: &Field, settings: &FontSettings) -> FieldPlan {
    let base = settings.default.size;
    let frame = Frame {
        x: field.x,
        y: field.y,
        w: field.w,
        h: field.h,
    };
    let plan = field.widget();

    let failure = if field.name.trim().is_empty() {
        Some("empty field name".to_string())
    } else if !frame.has_area() {
        Some(format!("invalid size {}x{}", field.w, field.h))
    } else if plan.kind == WidgetKind::Choice && field.options.is_empty() {
        Some("choice field without options".to_string())
    } else {
        None
    };

    if let Some(reason) = failure {
        return FieldPlan::Placeholder(placeholder(field, settings, reason));
    }

    let body = match plan.kind {
        WidgetKind::TextInput { multiline } => WidgetBody::Text {
            multiline,
            value: field.value_text(),
        },
        WidgetKind::Choice => WidgetBody::Choice {
            options: field.options.clone(),
            value: field.value_text(),
        },
        WidgetKind::Checkbox => WidgetBody::Checkbox {
            checked: field.is_checked(),
        },
    };

    FieldPlan::Widget {
        widget: WidgetSpec {
            name: field.name.clone(),
            frame,
            body,
            font_size: base.max(8.0),
        },
        fallback: plan.fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formspec_core::FieldKind;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn label(text: &str, style: &str) -> Label {
        Label {
            text: text.to_string(),
            x: 10.0,
            y: 10.0,
            size: Some(14.0),
            style: style.to_string(),
        }
    }

    fn field(kind: FieldKind) -> Field {
        Field {
            id: "f1".to_string(),
            name: "Full_Name".to_string(),
            kind,
            x: 10.0,
            y: 20.0,
            w: 60.0,
            h: 8.0,
            options: Vec::new(),
            value: None,
            multiline: false,
            required: false,
        }
    }

    fn availability(pairs: &[(&str, bool)]) -> HashMap<String, bool> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_no_fonts_sanitizes_and_logs() {
        let run = plan_label(&label("Name — 姓名…", ""), &FontSettings::default(), &HashMap::new());
        assert_eq!(run.font, LabelFont::Builtin(BuiltinFont::Helvetica));
        assert_eq!(run.text, "Name - ...");
        assert_eq!(run.size, 14.0);
        assert_eq!(run.notes, vec!["sanitized label text (no unicode fonts available)"]);
    }

    #[test]
    fn test_bold_builtin() {
        let run = plan_label(&label("Title", "B"), &FontSettings::default(), &HashMap::new());
        assert_eq!(run.font, LabelFont::Builtin(BuiltinFont::HelveticaBold));
    }

    #[test]
    fn test_cjk_only_available_leaves_latin_on_builtin() {
        let fonts = availability(&[("NotoSansTC", true)]);
        let run = plan_label(&label("Plain “quoted”", ""), &FontSettings::default(), &fonts);
        assert_eq!(run.font, LabelFont::Builtin(BuiltinFont::Helvetica));
        assert_eq!(run.text, "Plain \"quoted\"");
        assert_eq!(run.notes, vec!["sanitized label text for built-in font"]);
    }

    #[test]
    fn test_available_without_face_falls_back_to_base_size() {
        let fonts = availability(&[("NotoSansTC", true), ("DejaVuSans", true)]);
        let run = plan_label(&label("姓名", "B"), &FontSettings::default(), &fonts);
        assert_eq!(run.font, LabelFont::Builtin(BuiltinFont::Helvetica));
        assert_eq!(run.size, 11.0);
        assert_eq!(run.text, "");
        assert_eq!(run.notes, vec!["font NotoSansTC could not be embedded; using Helvetica"]);
    }

    #[test]
    fn test_text_and_fallback_widgets() {
        let mut f = field(FieldKind::Textarea);
        f.value = Some(serde_json::json!("hello"));
        let FieldPlan::Widget { widget, fallback } = plan_field(&f, &FontSettings::default()) else {
            panic!("expected widget");
        };
        assert!(!fallback);
        assert_eq!(
            widget.body,
            WidgetBody::Text {
                multiline: true,
                value: "hello".to_string()
            }
        );
        assert_eq!(widget.font_size, 11.0);

        let FieldPlan::Widget { fallback, .. } =
            plan_field(&field(FieldKind::Other("signature".into())), &FontSettings::default())
        else {
            panic!("expected widget");
        };
        assert!(fallback);
    }

    #[test]
    fn test_checkbox_value() {
        let mut f = field(FieldKind::Checkbox);
        f.value = Some(serde_json::json!(true));
        let FieldPlan::Widget { widget, .. } = plan_field(&f, &FontSettings::default()) else {
            panic!("expected widget");
        };
        assert_eq!(widget.body, WidgetBody::Checkbox { checked: true });
    }

    #[test]
    fn test_placeholders() {
        let settings = FontSettings::default();

        let FieldPlan::Placeholder(p) = plan_field(&field(FieldKind::Combo), &settings) else {
            panic!("expected placeholder");
        };
        assert_eq!(p.caption, "[combo] Full_Name");
        assert_eq!(p.size, 10.0);
        assert_eq!(p.reason, "choice field without options");

        let mut f = field(FieldKind::Text);
        f.w = 0.0;
        assert!(matches!(plan_field(&f, &settings), FieldPlan::Placeholder(_)));

        let mut f = field(FieldKind::Text);
        f.name = " ".to_string();
        let FieldPlan::Placeholder(p) = plan_field(&f, &settings) else {
            panic!("expected placeholder");
        };
        assert_eq!(p.reason, "empty field name");
    }
}
