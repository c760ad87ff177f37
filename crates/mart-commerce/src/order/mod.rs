//! Orders module.
//!
//! Placed orders, their captured lines, admin listing queries and edits.

mod model;
mod query;
mod store;

pub use model::{
    NewOrder, NewOrderLine, Order, OrderLine, OrderStatus, OrderUpdate, OrderUpdateForm,
    OrderWithCustomer,
};
pub use query::{parse_day, OrderParams, OrderQuery, OrderSort};
pub use store::OrderStore;
