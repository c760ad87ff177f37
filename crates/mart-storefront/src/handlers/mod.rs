//! Route handlers, grouped by area.

mod account;
mod admin;
mod auth;
mod cart;
mod checkout;
mod shop;

pub use cart::QuantityForm;

#[cfg(test)]
pub(crate) mod testing;
