//! Engine A: top-down canvas
//!
//! Draws in the spec's own convention (origin top-left, y down) and lets the
//! canvas convert when operators are written.

mod canvas;

use chrono::{DateTime, Utc};
use formspec_core::NormalizedSpec;
use tracing::info;

use crate::compose::compose;
use crate::error::RenderError;
use crate::fonts::FontAvailability;
use crate::geometry::PageGeometry;
use crate::log::RenderLog;
use crate::{EngineKind, RenderEngine, RenderedPdf};

use canvas::SimpleCanvas;

#[derive(Debug, Clone, Default)]
pub struct SimpleCanvasEngine {
    created_at: Option<DateTime<Utc>>,
}

impl SimpleCanvasEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the `CreationDate` instead of reading the clock
    pub fn with_timestamp(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at: Some(created_at),
        }
    }
}

impl RenderEngine for SimpleCanvasEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Simple
    }

    fn render(&self, spec: &NormalizedSpec, fonts: &dyn FontAvailability) -> Result<RenderedPdf, RenderError> {
        let form = spec.form();
        let geometry = PageGeometry::for_document(&form.document);
        let mut log = RenderLog::new(self.kind().log_source());

        let mut canvas = SimpleCanvas::new(&geometry, fonts);
        compose(&form, fonts, &mut canvas, &mut log)?;
        let pdf = canvas.finish(
            form.document.title.as_deref(),
            self.created_at.unwrap_or_else(Utc::now),
        )?;

        info!(engine = "simple", bytes = pdf.len(), "rendered form");
        Ok(RenderedPdf {
            pdf,
            log: log.into_entries(),
        })
    }
}
