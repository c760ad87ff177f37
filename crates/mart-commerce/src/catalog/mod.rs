//! Product catalog module.
//!
//! Contains the product type, listing queries and the product store.

mod product;
mod query;
mod store;

pub use product::{Product, ProductDraft, ProductForm};
pub use query::{CatalogParams, CatalogQuery, ProductSort, StockBucket};
pub use store::ProductStore;
