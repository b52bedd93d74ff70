use std::fmt::Display;

/// Failure reported by a storage collaborator. Carries full diagnostic text,
/// which services log but never hand to end users.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{context}: {message}")]
pub struct StoreError {
    pub context: &'static str,
    pub message: String,
}

impl StoreError {
    pub fn new(context: &'static str, error: impl Display) -> Self {
        StoreError {
            context,
            message: error.to_string(),
        }
    }
}
