//! Report errors.

use mart_auth::AuthError;
use mart_commerce::{CommerceError, ErrorKind};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The PDF writer could not format a page.
    #[error("failed to render document: {0}")]
    Render(#[from] std::fmt::Error),
}

impl ReportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReportError::Commerce(e) => e.kind(),
            ReportError::Auth(e) => e.kind(),
            ReportError::Render(_) => ErrorKind::Persistence,
        }
    }
}
