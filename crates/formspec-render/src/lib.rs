//! PDF generation for form specs
//!
//! Two interchangeable engines turn a [`NormalizedSpec`] into a PDF with live
//! AcroForm fields:
//!
//! - [`SimpleCanvasEngine`]: top-down canvas written with `lopdf`
//! - [`VectorCanvasEngine`]: bottom-up canvas written with `pdf-writer`
//!
//! [`generate`] wraps validation, the strict-mode gate, rendering and the
//! `/NeedAppearances` post-processor into one call.
//!
//! [`NormalizedSpec`]: formspec_core::NormalizedSpec

pub mod appearance;
mod compose;
pub mod engine;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod log;
pub mod pipeline;
mod plan;
pub mod postprocess;
pub mod simple;
pub mod vector;

pub use engine::{EngineKind, RenderEngine, RenderedPdf};
pub use error::{FontError, GenerateError, RenderError};
pub use fonts::{BuiltinFont, FontAvailability, FontFace, FontLibrary};
pub use geometry::{PageGeometry, BASELINE_RATIO};
pub use log::RenderLogEntry;
pub use pipeline::{generate, generate_from_text, GenerateOptions, GenerateOutcome, GeneratedPdf};
pub use postprocess::force_manual_appearance_regeneration;
pub use simple::SimpleCanvasEngine;
pub use vector::VectorCanvasEngine;
