//! Type-safe SQLite database layer for FreshMart.
//!
//! Wraps an `sqlx` SQLite pool behind a small, ergonomic API: parameters
//! are passed as [`Value`]s (usually through the [`params!`] macro) and
//! rows come back either raw or deserialized into any `serde` type.
//!
//! # Example
//!
//! ```rust,ignore
//! use mart_db::{Db, params};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Product {
//!     id: i64,
//!     name: String,
//!     price_cents: i64,
//! }
//!
//! let db = Db::connect("sqlite:freshmart.db").await?;
//! db.migrate().await?;
//!
//! let id = db
//!     .insert(
//!         "INSERT INTO products (name, price_cents, stock) VALUES (?, ?, ?)",
//!         params!["Apples", 349, 40],
//!     )
//!     .await?;
//!
//! let products: Vec<Product> = db
//!     .query_as("SELECT id, name, price_cents FROM products WHERE stock > ?", params![0])
//!     .await?;
//! ```

mod db;
mod error;
pub mod schema;
mod types;

pub use db::{Db, DbOptions, Tx};
pub use error::DbError;
pub use types::{QueryResult, Row, Value};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{params, Db, DbError, QueryResult, Row, Tx, Value};
}

/// Create a parameter list for SQL queries.
///
/// # Example
///
/// ```rust,ignore
/// use mart_db::params;
///
/// let params = params!["value1", 42, 3.14];
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[]
    };
    ($($param:expr),+ $(,)?) => {
        &[$($crate::Value::from($param)),+]
    };
}
