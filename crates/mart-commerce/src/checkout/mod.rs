//! Checkout module.
//!
//! Delivery methods, the checkout form, and the order placement pipeline.

mod delivery;
mod pipeline;
mod request;

pub use delivery::{DeliveryMethod, PICKUP_ADDRESS};
pub use pipeline::{OrderPipeline, OrderQuote, PlacedOrder, STOCK_UPDATE_WARNING};
pub use request::{CheckoutForm, DeliveryDetails};
