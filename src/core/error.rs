use super::validation::ValidationErrors;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrmError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Email already registered")]
    DuplicateEmail(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{reason}")]
    StageTransitionRejected { reason: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    RemoteValidation(String),

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("A submission is already in progress")]
    SubmissionInFlight,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, CrmError>;

impl CrmError {
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Network failures (including client-side timeouts) may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Field-scoped validation problems are shown next to the form inputs,
    /// everything else is a single user-visible message.
    pub fn is_field_scoped(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<ValidationErrors> for CrmError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

impl<T> From<std::sync::PoisonError<T>> for CrmError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<std::io::Error> for CrmError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CrmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
