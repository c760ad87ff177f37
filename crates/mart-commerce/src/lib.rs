//! Storefront domain logic for FreshMart.
//!
//! - **Catalog**: products, filtered listings, admin CRUD, stock
//! - **Cart**: per-user carts bounded by live stock
//! - **Checkout**: delivery methods and the order placement pipeline
//! - **Order**: history, admin listing and edits with total recomputation
//! - **Dashboard**: aggregate figures for staff and customers
//!
//! Every store wraps a [`mart_db::Db`] handle and is cheap to clone.
//!
//! # Example
//!
//! ```rust,ignore
//! use mart_commerce::prelude::*;
//!
//! let carts = CartStore::new(db.clone());
//! carts.add(user_id, product_id, 2).await?;
//!
//! let pipeline = OrderPipeline::new(db.clone());
//! let placed = pipeline
//!     .place_order(user_id, &CheckoutForm::new(DeliveryMethod::Express, "1 Main St"))
//!     .await?;
//! println!("Total: {}", placed.quote.total);
//! ```

pub mod error;
pub mod form;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod dashboard;
pub mod order;

pub use error::{CommerceError, ErrorKind};
pub use ids::*;
pub use money::Money;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CommerceError, ErrorKind};
    pub use crate::ids::*;
    pub use crate::money::Money;

    // Catalog
    pub use crate::catalog::{
        CatalogParams, CatalogQuery, Product, ProductDraft, ProductForm, ProductSort,
        ProductStore, StockBucket,
    };

    // Cart
    pub use crate::cart::{
        items_total, parse_add_quantity, parse_update_quantity, Cart, CartAddition, CartLine,
        CartStore, PricedLine,
    };

    // Checkout
    pub use crate::checkout::{
        CheckoutForm, DeliveryMethod, OrderPipeline, OrderQuote, PlacedOrder, PICKUP_ADDRESS,
    };

    // Orders
    pub use crate::order::{
        Order, OrderLine, OrderParams, OrderQuery, OrderSort, OrderStatus, OrderStore,
        OrderUpdate, OrderUpdateForm, OrderWithCustomer,
    };

    // Dashboard
    pub use crate::dashboard::{CustomerStats, Dashboard, StoreStats};
}
