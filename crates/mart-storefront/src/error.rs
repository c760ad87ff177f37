//! Handler errors.

use mart_auth::AuthError;
use mart_commerce::{CommerceError, ErrorKind};
use mart_reports::ReportError;
use thiserror::Error;

/// A request that could not be answered with a page or a redirect.
///
/// Handlers recover validation and business-rule failures themselves, so
/// in practice this carries persistence failures.
#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("Failed to build page context: {0}")]
    Context(#[from] serde_json::Error),
}

impl StorefrontError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorefrontError::Commerce(e) => e.kind(),
            StorefrontError::Auth(e) => e.kind(),
            StorefrontError::Report(e) => e.kind(),
            StorefrontError::Context(_) => ErrorKind::Persistence,
        }
    }

    /// HTTP status a server should answer with.
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::Auth => 401,
            ErrorKind::Permission => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Stock | ErrorKind::Invariant => 409,
            ErrorKind::Persistence => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Domain errors a handler may turn into a flash message.
pub(crate) trait Classified: std::error::Error + Into<StorefrontError> {
    fn kind(&self) -> ErrorKind;
}

impl Classified for CommerceError {
    fn kind(&self) -> ErrorKind {
        CommerceError::kind(self)
    }
}

impl Classified for AuthError {
    fn kind(&self) -> ErrorKind {
        AuthError::kind(self)
    }
}

impl Classified for ReportError {
    fn kind(&self) -> ErrorKind {
        ReportError::kind(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mart_commerce::ProductId;

    #[test]
    fn test_status_codes() {
        let not_found: StorefrontError = CommerceError::ProductNotFound(ProductId::new(1)).into();
        assert_eq!(not_found.status_code(), 404);

        let db: StorefrontError = CommerceError::DatabaseError("disk full".into()).into();
        assert_eq!(db.kind(), ErrorKind::Persistence);
        assert_eq!(db.status_code(), 500);

        let forbidden: StorefrontError = AuthError::Forbidden.into();
        assert_eq!(forbidden.status_code(), 403);

        let last_admin: StorefrontError = AuthError::LastAdminProtected.into();
        assert_eq!(last_admin.status_code(), 409);
    }

    #[test]
    fn test_transparent_messages() {
        let err: StorefrontError = AuthError::WeakPassword.into();
        assert_eq!(err.to_string(), "Password must be at least 6 characters.");
    }
}
