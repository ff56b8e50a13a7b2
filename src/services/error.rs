use thiserror::Error;
use uuid::Uuid;

use crate::auth::{JwtError, PasswordError};
use crate::database::DatabaseError;

/// Failure taxonomy of the staffing core. Every operation returns one of
/// these as a value; nothing is retried internally.
#[derive(Debug, Error)]
pub enum StaffingError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("no account registered for '{0}'")]
    AccountNotFound(String),

    #[error("{kind} {id} belongs to another owner")]
    Forbidden { kind: &'static str, id: Uuid },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: Uuid },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error(
        "section {section_id} would carry {requested_total} periods, above its capacity of {capacity}"
    )]
    CapacityExceeded {
        section_id: Uuid,
        attached_total: i32,
        requested_total: i32,
        capacity: i32,
    },

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl StaffingError {
    pub fn not_found<T: crate::database::models::OwnedEntity>(id: Uuid) -> Self {
        StaffingError::NotFound { kind: T::KIND, id }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        StaffingError::ValidationFailed(message.into())
    }
}

pub type StaffingResult<T> = Result<T, StaffingError>;
