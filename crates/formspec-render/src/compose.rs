//! The element walk shared by both engines
//!
//! [`compose`] decides what every element becomes and logs it; a
//! [`FormSurface`] only knows how to put that on its own canvas.

use formspec_core::{Element, FontSettings, FormSpec};
use tracing::info;

use crate::error::RenderError;
use crate::fonts::FontAvailability;
use crate::log::RenderLog;
use crate::plan::{placeholder, plan_field, plan_label, FieldPlan, LabelFont, LabelRun, Placeholder, WidgetSpec};

/// Drawing backend for one engine. Coordinates are spec units from the top-left corner.
pub(crate) trait FormSurface {
    fn begin_page(&mut self) -> Result<(), RenderError>;

    /// Draw `run` with its text line's top at (`x`, `y`); returns the number of missing glyphs
    fn draw_label(&mut self, x: f64, y: f64, run: &LabelRun) -> Result<usize, RenderError>;

    fn add_widget(&mut self, widget: &WidgetSpec) -> Result<(), RenderError>;

    fn draw_placeholder(&mut self, placeholder: &Placeholder) -> Result<(), RenderError>;
}

pub(crate) fn compose(
    form: &FormSpec,
    fonts: &dyn FontAvailability,
    surface: &mut dyn FormSurface,
    log: &mut RenderLog,
) -> Result<(), RenderError> {
    log_font_registration(&form.fonts, fonts, log);

    for (page_index, page) in form.pages.iter().enumerate() {
        let page_no = Some(page_index + 1);
        surface.begin_page()?;

        for (element_index, element) in page.elements.iter().enumerate() {
            let at = Some(element_index + 1);
            match element {
                Element::Label(label) => {
                    if !(label.x.is_finite() && label.y.is_finite()) {
                        log.degraded(page_no, at, "skipped label with unplaceable position");
                        continue;
                    }
                    let run = plan_label(label, &form.fonts, fonts);
                    for note in &run.notes {
                        log.degraded(page_no, at, note);
                    }
                    match surface.draw_label(label.x, label.y, &run) {
                        Ok(0) => {}
                        Ok(missing) => {
                            let family = match &run.font {
                                LabelFont::Embedded(family) => family.as_str(),
                                LabelFont::Builtin(font) => font.base_name(),
                            };
                            log.degraded(page_no, at, format!("{missing} glyph(s) missing from {family}"));
                        }
                        Err(err) => log.degraded(page_no, at, format!("label render failed: {err}")),
                    }
                }
                Element::Field(field) => {
                    if !(field.x.is_finite() && field.y.is_finite()) {
                        log.degraded(
                            page_no,
                            at,
                            format!("skipped field {} with unplaceable position", field.id),
                        );
                        continue;
                    }
                    match plan_field(field, &form.fonts) {
                        FieldPlan::Widget { widget, fallback } => {
                            if fallback {
                                log.degraded(
                                    page_no,
                                    at,
                                    format!("fallback field type '{}' -> text for {}", field.kind.as_str(), field.id),
                                );
                            }
                            if let Err(err) = surface.add_widget(&widget) {
                                log.degraded(page_no, at, format!("field render failed {}: {err}", field.id));
                                surface.draw_placeholder(&placeholder(field, &form.fonts, err.to_string()))?;
                            }
                        }
                        FieldPlan::Placeholder(stand_in) => {
                            log.degraded(
                                page_no,
                                at,
                                format!("field render failed {}: {}", field.id, stand_in.reason),
                            );
                            surface.draw_placeholder(&stand_in)?;
                        }
                    }
                }
                Element::Unsupported { kind } => {
                    log.degraded(page_no, at, format!("skipped unsupported element '{kind}'"));
                }
            }
        }
    }

    info!(pages = form.pages.len(), "composed form");
    Ok(())
}

fn log_font_registration(settings: &FontSettings, fonts: &dyn FontAvailability, log: &mut RenderLog) {
    let mut families = vec![settings.default.family.as_str()];
    if settings.cjk.family != settings.default.family {
        families.push(settings.cjk.family.as_str());
    }
    for family in families {
        if fonts.face(family).is_some() {
            log.note(None, None, format!("font registered {family}"));
        } else if fonts.is_available(family) {
            log.degraded(None, None, format!("font {family} available but not embeddable"));
        } else {
            log.degraded(None, None, format!("font missing {family}"));
        }
    }
}
