//! Authentication errors.

use mart_commerce::{ErrorKind, UserId};
use thiserror::Error;

/// Authentication and account error type.
///
/// Display strings are user-facing flash messages.
#[derive(Error, Debug)]
pub enum AuthError {
    /// A required form field was blank.
    #[error("All fields are required.")]
    MissingFields,

    /// The email belongs to another account.
    #[error("Email already exists.")]
    EmailExists,

    /// Password shorter than the minimum length.
    #[error("Password must be at least 6 characters.")]
    WeakPassword,

    /// Unknown email or wrong password. Deliberately generic.
    #[error("Invalid email or password.")]
    InvalidCredentials,

    /// Current password did not verify during a password change.
    #[error("Old password is incorrect.")]
    WrongPassword,

    /// New password and its confirmation differ.
    #[error("New passwords do not match.")]
    Mismatch,

    /// New password equals the current one.
    #[error("New password cannot be the same as old password.")]
    NoOpChange,

    /// The action would leave the store without an admin.
    #[error("At least one admin must remain.")]
    LastAdminProtected,

    #[error("User not found.")]
    UserNotFound(UserId),

    /// No user is logged in.
    #[error("Please log in to view this page.")]
    Unauthenticated,

    /// The logged-in user lacks the required role.
    #[error("Access denied.")]
    Forbidden,

    #[error("Unknown role: {0}")]
    InvalidRole(String),

    /// Password hashing failed.
    #[error("password hash error: {0}")]
    Hash(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl AuthError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::MissingFields
            | AuthError::EmailExists
            | AuthError::WeakPassword
            | AuthError::Mismatch
            | AuthError::NoOpChange
            | AuthError::InvalidRole(_) => ErrorKind::Validation,
            AuthError::InvalidCredentials
            | AuthError::WrongPassword
            | AuthError::Unauthenticated => ErrorKind::Auth,
            AuthError::Forbidden => ErrorKind::Permission,
            AuthError::LastAdminProtected => ErrorKind::Invariant,
            AuthError::UserNotFound(_) => ErrorKind::NotFound,
            AuthError::Hash(_) | AuthError::DatabaseError(_) => ErrorKind::Persistence,
        }
    }

    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        self.kind() == ErrorKind::Auth
    }

    /// Check if this is a permission error.
    pub fn is_permission_error(&self) -> bool {
        matches!(self, AuthError::Forbidden)
    }
}

impl From<mart_db::DbError> for AuthError {
    fn from(e: mart_db::DbError) -> Self {
        if e.is_unique_violation() {
            AuthError::EmailExists
        } else {
            AuthError::DatabaseError(e.to_string())
        }
    }
}
