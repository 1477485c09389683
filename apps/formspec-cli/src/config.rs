//! TOML configuration for the `formspec` binary
//!
//! Every section is optional; command-line flags override whatever the
//! file sets.

use anyhow::Context;
use formspec_core::ValidationOptions;
use formspec_render::{EngineKind, GenerateOptions};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Unit and page-size fallbacks
    pub validation: ValidationOptions,
    pub render: RenderConfig,
    pub fonts: FontConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// The file at `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            validation: self.validation,
            engine: self.render.engine,
            strict: self.render.strict,
            need_appearances: self.render.need_appearances,
            created_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub engine: EngineKind,
    /// Refuse to render on validation warnings
    pub strict: bool,
    pub need_appearances: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            strict: false,
            need_appearances: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Directory holding the font files; no fonts are loaded without it
    pub dir: Option<PathBuf>,
    /// Font family -> file name inside `dir`
    pub files: BTreeMap<String, String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        let files = [
            ("DejaVuSans", "DejaVuSans.ttf"),
            ("NotoSansTC", "NotoSansTC-Regular.ttf"),
        ]
        .into_iter()
        .map(|(family, file)| (family.to_string(), file.to_string()))
        .collect();
        Self { dir: None, files }
    }
}
