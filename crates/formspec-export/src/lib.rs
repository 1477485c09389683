//! Standalone generator scripts for a normalized form spec
//!
//! Each script embeds the spec and reproduces one engine's rules (font
//! choice, coordinate flip, fallback typing) outside this workspace.

pub mod client;
pub mod literal;
pub mod python;
mod template;

use std::fmt;
use std::str::FromStr;

use formspec_core::NormalizedSpec;
use formspec_render::EngineKind;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use client::{client_script, infer_client_structure, label_for_field, ClientField, ClientFieldType, ClientStructure};
pub use literal::python_literal;
pub use python::{simple_canvas_script, vector_canvas_script};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptKind {
    /// fpdf2, top-down
    SimpleCanvas,
    /// ReportLab, bottom-up
    VectorCanvas,
    /// jsPDF in the browser
    Client,
}

impl ScriptKind {
    pub const ALL: [ScriptKind; 3] = [ScriptKind::SimpleCanvas, ScriptKind::VectorCanvas, ScriptKind::Client];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptKind::SimpleCanvas => "simple-canvas",
            ScriptKind::VectorCanvas => "vector-canvas",
            ScriptKind::Client => "client",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            ScriptKind::SimpleCanvas | ScriptKind::VectorCanvas => "generate_dynamic_form.py",
            ScriptKind::Client => "generate_dynamic_form.js",
        }
    }

    pub fn render(&self, spec: &NormalizedSpec) -> String {
        let source = match self {
            ScriptKind::SimpleCanvas => simple_canvas_script(spec),
            ScriptKind::VectorCanvas => vector_canvas_script(spec),
            ScriptKind::Client => client_script(spec),
        };
        debug!(kind = self.as_str(), bytes = source.len(), "exported script");
        source
    }
}

/// The Python script matching a render engine
pub fn script_for_engine(engine: EngineKind) -> ScriptKind {
    match engine {
        EngineKind::Simple => ScriptKind::SimpleCanvas,
        EngineKind::Vector => ScriptKind::VectorCanvas,
    }
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "simple-canvas" | "simple" | "fpdf2" => Ok(ScriptKind::SimpleCanvas),
            "vector-canvas" | "vector" | "reportlab" => Ok(ScriptKind::VectorCanvas),
            "client" | "js" | "jspdf" => Ok(ScriptKind::Client),
            _ => Err(format!("Unknown script kind: {}", s)),
        }
    }
}
