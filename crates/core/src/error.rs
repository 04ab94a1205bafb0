#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No active session with id '{id}'")]
    SessionNotFound { id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}
