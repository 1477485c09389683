//! Engine B: bottom-up vector canvas
//!
//! Works natively in PDF user space (origin bottom-left, y up), so every
//! spec position goes through the flip in [`crate::geometry`].

mod surface;

use chrono::{DateTime, Utc};
use formspec_core::NormalizedSpec;
use tracing::info;

use crate::compose::compose;
use crate::error::RenderError;
use crate::fonts::FontAvailability;
use crate::geometry::PageGeometry;
use crate::log::RenderLog;
use crate::{EngineKind, RenderEngine, RenderedPdf};

use surface::VectorSurface;

#[derive(Debug, Clone, Default)]
pub struct VectorCanvasEngine {
    created_at: Option<DateTime<Utc>>,
}

impl VectorCanvasEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timestamp(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at: Some(created_at),
        }
    }
}

impl RenderEngine for VectorCanvasEngine {
    fn kind(&self) -> EngineKind {
        EngineKind::Vector
    }

    fn render(&self, spec: &NormalizedSpec, fonts: &dyn FontAvailability) -> Result<RenderedPdf, RenderError> {
        let form = spec.form();
        let geometry = PageGeometry::for_document(&form.document);
        let mut log = RenderLog::new(self.kind().log_source());

        let mut surface = VectorSurface::new(geometry, fonts);
        compose(&form, fonts, &mut surface, &mut log)?;
        let pdf = surface.finish(
            form.document.title.as_deref(),
            self.created_at.unwrap_or_else(Utc::now),
        )?;

        info!(engine = "vector", bytes = pdf.len(), "rendered form");
        Ok(RenderedPdf {
            pdf,
            log: log.into_entries(),
        })
    }
}
