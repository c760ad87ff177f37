//! Cart and cart line types.

use crate::cart::{items_total, PricedLine};
use crate::error::CommerceError;
use crate::form::parse_leading_int;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A user's cart as read from the database, joined with live product data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn new(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    /// The cart every anonymous visitor sees.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Number of distinct products.
    pub fn unique_item_count(&self) -> usize {
        self.lines.len()
    }

    pub fn get_line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    /// Sum of line subtotals at current catalog prices.
    pub fn subtotal(&self) -> Result<Money, CommerceError> {
        items_total(&self.lines)
    }
}

/// One product in a cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    /// Product name (denormalized for display).
    pub name: String,
    /// Current catalog price.
    pub price: Money,
    pub quantity: i64,
    /// Current catalog stock.
    pub stock: i64,
    pub image: Option<String>,
}

impl CartLine {
    /// Line subtotal.
    pub fn total(&self) -> Money {
        self.price * self.quantity
    }
}

impl PricedLine for CartLine {
    fn unit_price(&self) -> Money {
        self.price
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }
}

/// Read the quantity of an add-to-cart form.
///
/// Missing or non-numeric input means one unit; zero or negative input is
/// rejected.
pub fn parse_add_quantity(input: Option<&str>) -> Result<i64, CommerceError> {
    match input.and_then(parse_leading_int) {
        None => Ok(1),
        Some(quantity) if quantity > 0 => Ok(quantity),
        Some(quantity) => Err(CommerceError::InvalidQuantity(quantity)),
    }
}

/// Read the quantity of an update-cart form. Anything below one becomes one.
pub fn parse_update_quantity(input: Option<&str>) -> i64 {
    input.and_then(parse_leading_int).unwrap_or(1).max(1)
}
