use models::errors::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Reading or writing the backing file failed; the committed state is intact.
    #[error("storage io error: {0}")]
    StorageIo(String),
    /// The backing file exists but does not hold a valid item collection.
    #[error("corrupt store: {0}")]
    CorruptStore(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn io(context: impl std::fmt::Display, err: std::io::Error) -> Self {
        Self::StorageIo(format!("{context}: {err}"))
    }
}

impl From<ModelError> for ServiceError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Validation(msg) => Self::Validation(msg),
            ModelError::Integrity(msg) => Self::CorruptStore(msg),
        }
    }
}
