//! Commerce error types.

use crate::ids::{OrderId, ProductId};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Coarse classification shared by every domain error in the workspace.
///
/// Request handlers use it to decide between a flash-and-redirect and a
/// failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// The addressed record does not exist (or is not visible to the caller).
    NotFound,
    /// Not enough stock to satisfy a request.
    Stock,
    /// Authentication failed.
    Auth,
    /// The caller lacks the role for the action.
    Permission,
    /// The action would break a store-wide invariant.
    Invariant,
    /// The database failed.
    Persistence,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Stock => "stock",
            ErrorKind::Auth => "auth",
            ErrorKind::Permission => "permission",
            ErrorKind::Invariant => "invariant",
            ErrorKind::Persistence => "persistence",
        }
    }

    /// Whether a handler should turn this into a flash message.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ErrorKind::Persistence)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in catalog, cart, checkout and order operations.
///
/// Display strings are user-facing flash messages.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not found in the catalog.
    #[error("Product not found.")]
    ProductNotFound(ProductId),

    /// A cart operation named a product that does not exist.
    #[error("Item not found.")]
    ItemNotFound(ProductId),

    /// Order not found, or not owned by the caller.
    #[error("Order not found.")]
    OrderNotFound(OrderId),

    /// Requested quantity exceeds current stock.
    #[error("Only {available} left in stock.")]
    OutOfStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Checkout with nothing in the cart.
    #[error("Your cart is empty.")]
    EmptyCart,

    /// Quantity must be positive.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Form input rejected at the boundary.
    #[error("{0}")]
    Validation(String),

    /// The order transaction was rolled back.
    #[error("Failed to place order. Please try again.")]
    OrderCreationFailed(String),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Database error.
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl CommerceError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommerceError::ProductNotFound(_)
            | CommerceError::ItemNotFound(_)
            | CommerceError::OrderNotFound(_) => ErrorKind::NotFound,
            CommerceError::OutOfStock { .. } => ErrorKind::Stock,
            CommerceError::EmptyCart
            | CommerceError::InvalidQuantity(_)
            | CommerceError::Validation(_)
            | CommerceError::Overflow => ErrorKind::Validation,
            CommerceError::OrderCreationFailed(_) | CommerceError::DatabaseError(_) => {
                ErrorKind::Persistence
            }
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        CommerceError::Validation(message.into())
    }
}

impl From<mart_db::DbError> for CommerceError {
    fn from(e: mart_db::DbError) -> Self {
        CommerceError::DatabaseError(e.to_string())
    }
}
