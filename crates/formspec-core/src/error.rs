use thiserror::Error;

/// Parse-time failures. Both are fatal: no normalized document can be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    #[error("Spec is empty.")]
    EmptySpec,

    #[error("Invalid spec format: {}", .0.join("; "))]
    InvalidSpecFormat(Vec<String>),
}

impl SpecError {
    /// The individual messages, suitable for a validation report's error list
    pub fn messages(&self) -> Vec<String> {
        match self {
            SpecError::EmptySpec => vec![self.to_string()],
            SpecError::InvalidSpecFormat(messages) => messages.clone(),
        }
    }
}
