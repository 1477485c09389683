use formspec_core::SpecError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FontError {
    #[error("Invalid font data for {family}: {reason}")]
    InvalidFont { family: String, reason: String },
}

/// Whole-document failures; per-element problems never surface here
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to encode content stream: {0}")]
    ContentEncoding(String),

    #[error("Failed to write PDF: {0}")]
    Serialization(String),

    #[error("Element drawn before any page was started")]
    NoPage,

    #[error("No embeddable face for font family {0}")]
    MissingFace(String),
}

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
