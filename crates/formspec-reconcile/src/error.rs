use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The bytes could not be parsed as a PDF at all
    #[error("Cannot reconcile: unreadable PDF: {0}")]
    UnreadablePdf(String),
}
