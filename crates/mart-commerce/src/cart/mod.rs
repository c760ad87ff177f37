//! Shopping cart module.
//!
//! Contains the cart types, shared line pricing, and the cart store.

#[allow(clippy::module_inception)]
mod cart;
mod pricing;
mod store;

pub use cart::{parse_add_quantity, parse_update_quantity, Cart, CartLine};
pub use pricing::{items_total, PricedLine};
pub use store::{CartAddition, CartStore};
