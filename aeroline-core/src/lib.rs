pub mod models;
pub mod validation;
pub mod scheduling;
pub mod booking;
pub mod reference;
pub mod repository;
pub mod memory;
pub mod password;
pub mod services;

pub use validation::ValidationErrors;
pub use repository::Repository;
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Internal service error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a validation failure on a single field.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        CoreError::Validation(ValidationErrors::single(field, message))
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        CoreError::Validation(errors)
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
