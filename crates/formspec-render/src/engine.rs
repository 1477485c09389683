//! The engine capability and the two interchangeable implementations' selector

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use formspec_core::NormalizedSpec;
use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::fonts::FontAvailability;
use crate::log::RenderLogEntry;
use crate::simple::SimpleCanvasEngine;
use crate::vector::VectorCanvasEngine;

/// A finished document plus everything the engine had to say about it
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub pdf: Vec<u8>,
    pub log: Vec<RenderLogEntry>,
}

/// Turns a normalized spec into a PDF with live AcroForm fields.
///
/// Implementations must agree on field names, widget types, page order and
/// visual placement; only the drawing backend differs.
pub trait RenderEngine {
    fn kind(&self) -> EngineKind;

    fn render(&self, spec: &NormalizedSpec, fonts: &dyn FontAvailability) -> Result<RenderedPdf, RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Top-down canvas (Engine A)
    #[default]
    Simple,
    /// Bottom-up vector canvas (Engine B)
    Vector,
}

impl EngineKind {
    pub const ALL: [EngineKind; 2] = [EngineKind::Simple, EngineKind::Vector];

    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Simple => "simple",
            EngineKind::Vector => "vector",
        }
    }

    /// Prefix carried by every render-log line
    pub fn log_source(&self) -> &'static str {
        match self {
            EngineKind::Simple => "simple-canvas",
            EngineKind::Vector => "vector-canvas",
        }
    }

    pub fn engine(&self, created_at: Option<DateTime<Utc>>) -> Box<dyn RenderEngine> {
        match (self, created_at) {
            (EngineKind::Simple, Some(at)) => Box::new(SimpleCanvasEngine::with_timestamp(at)),
            (EngineKind::Simple, None) => Box::new(SimpleCanvasEngine::new()),
            (EngineKind::Vector, Some(at)) => Box::new(VectorCanvasEngine::with_timestamp(at)),
            (EngineKind::Vector, None) => Box::new(VectorCanvasEngine::new()),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple" | "a" => Ok(EngineKind::Simple),
            "vector" | "b" => Ok(EngineKind::Vector),
            _ => Err(format!("Unknown engine: {} (expected simple or vector)", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_engine_kind() {
        assert_eq!("Vector".parse::<EngineKind>(), Ok(EngineKind::Vector));
        assert_eq!("a".parse::<EngineKind>(), Ok(EngineKind::Simple));
        assert!("laser".parse::<EngineKind>().is_err());
    }

    #[test]
    fn test_engine_reports_its_kind() {
        for kind in EngineKind::ALL {
            assert_eq!(kind.engine(None).kind(), kind);
        }
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&EngineKind::Vector).unwrap(), "\"vector\"");
        let kind: EngineKind = serde_json::from_str("\"simple\"").unwrap();
        assert_eq!(kind, EngineKind::Simple);
    }
}
