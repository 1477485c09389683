//! Render log
//!
//! Every line an engine emits is kept as a [`RenderLogEntry`] carrying its
//! 1-based page and element position, and is mirrored to `tracing`.

use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RenderLogEntry {
    pub page: Option<usize>,
    pub element: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for RenderLogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.page, self.element) {
            (Some(page), Some(element)) => write!(f, "page {page} element {element}: {}", self.message),
            (Some(page), None) => write!(f, "page {page}: {}", self.message),
            _ => f.write_str(&self.message),
        }
    }
}

/// Log collector for one render; `source` prefixes every message
#[derive(Debug)]
pub(crate) struct RenderLog {
    source: &'static str,
    entries: Vec<RenderLogEntry>,
}

impl RenderLog {
    pub(crate) fn new(source: &'static str) -> Self {
        Self {
            source,
            entries: Vec::new(),
        }
    }

    fn push(&mut self, page: Option<usize>, element: Option<usize>, message: &str) -> &RenderLogEntry {
        self.entries.push(RenderLogEntry {
            page,
            element,
            message: format!("{}: {message}", self.source),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub(crate) fn note(&mut self, page: Option<usize>, element: Option<usize>, message: impl AsRef<str>) {
        let entry = self.push(page, element, message.as_ref());
        debug!("{entry}");
    }

    /// Degraded output: fallbacks, placeholders, skipped elements
    pub(crate) fn degraded(&mut self, page: Option<usize>, element: Option<usize>, message: impl AsRef<str>) {
        let entry = self.push(page, element, message.as_ref());
        warn!("{entry}");
    }

    pub(crate) fn into_entries(self) -> Vec<RenderLogEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display() {
        let mut log = RenderLog::new("simple-canvas");
        log.note(None, None, "font missing DejaVuSans");
        log.degraded(Some(2), Some(5), "field render failed");
        log.note(Some(1), None, "page started");
        let lines: Vec<String> = log.into_entries().iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "simple-canvas: font missing DejaVuSans",
                "page 2 element 5: simple-canvas: field render failed",
                "page 1: simple-canvas: page started",
            ]
        );
    }

    #[test]
    fn test_entries_sort_by_position() {
        let mut entries = vec![
            RenderLogEntry { page: Some(2), element: Some(1), message: "b".into() },
            RenderLogEntry { page: Some(1), element: Some(3), message: "a".into() },
            RenderLogEntry { page: None, element: None, message: "global".into() },
        ];
        entries.sort();
        assert_eq!(entries[0].message, "global");
        assert_eq!(entries[1].page, Some(1));
    }
}
