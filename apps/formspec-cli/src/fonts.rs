//! Reads configured font files from disk into a [`FontLibrary`]

use anyhow::Context;
use formspec_render::FontLibrary;
use std::fs;
use tracing::{debug, info, warn};

use crate::config::FontConfig;

/// Load every configured family whose file exists under `config.dir`.
///
/// Missing files are skipped; faces `ttf-parser` rejects are skipped with a
/// warning so the engines fall back to the built-in fonts.
pub fn load_fonts(config: &FontConfig) -> anyhow::Result<FontLibrary> {
    let mut library = FontLibrary::new();
    let Some(dir) = config.dir.as_deref() else {
        debug!("no font directory configured");
        return Ok(library);
    };

    for (family, file) in &config.files {
        let path = dir.join(file);
        if !path.is_file() {
            debug!(family = %family, path = %path.display(), "font file not found");
            continue;
        }
        let data = fs::read(&path)
            .with_context(|| format!("Failed to read font file: {}", path.display()))?;
        if let Err(err) = library.add(family.clone(), data) {
            warn!(family = %family, "skipping font: {err}");
        }
    }

    info!(
        families = ?library.families().collect::<Vec<_>>(),
        "font library loaded"
    );
    Ok(library)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_no_dir_gives_empty_library() {
        let library = load_fonts(&FontConfig::default()).unwrap();
        assert!(library.is_empty());
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let config = FontConfig {
            dir: Some(PathBuf::from("/nonexistent/fonts")),
            ..FontConfig::default()
        };
        let library = load_fonts(&config).unwrap();
        assert!(library.is_empty());
    }

    #[test]
    #[ignore = "needs DejaVuSans.ttf under /usr/share/fonts/truetype/dejavu"]
    fn test_system_dejavu() {
        let dir = PathBuf::from("/usr/share/fonts/truetype/dejavu");
        assert!(dir.join("DejaVuSans.ttf").is_file(), "fonts-dejavu not installed");
        let config = FontConfig {
            dir: Some(dir),
            ..FontConfig::default()
        };
        let library = load_fonts(&config).unwrap();
        assert_eq!(library.families().collect::<Vec<_>>(), vec!["DejaVuSans"]);
    }
}
