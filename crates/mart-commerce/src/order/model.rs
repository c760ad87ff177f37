//! Order types.

use crate::cart::PricedLine;
use crate::checkout::DeliveryMethod;
use crate::error::CommerceError;
use crate::form::non_empty;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value))
    }

    /// Check if this is a terminal status.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub delivery_address: String,
    pub delivery_method: DeliveryMethod,
    pub delivery_fee: Money,
    /// Items total plus delivery fee.
    pub total: Money,
    pub status: OrderStatus,
    /// Unix timestamp of placement.
    pub created_at: i64,
}

impl Order {
    pub fn created_at_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.created_at, 0)
            .single()
            .unwrap_or_default()
    }

    /// Items total implied by the stored figures.
    pub fn items_total(&self) -> Money {
        Money::new(self.total.amount_cents - self.delivery_fee.amount_cents)
    }
}

/// An order joined with the account that placed it.
///
/// The account fields are empty when the user has since been deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderWithCustomer {
    #[serde(flatten)]
    pub order: Order,
    pub username: Option<String>,
    pub email: Option<String>,
}

/// A purchased line with its price captured at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Product name at purchase time.
    pub product_name: String,
    pub quantity: i64,
    /// Unit price at purchase time.
    pub price: Money,
}

impl OrderLine {
    pub fn total(&self) -> Money {
        self.price * self.quantity
    }
}

impl PricedLine for OrderLine {
    fn unit_price(&self) -> Money {
        self.price
    }

    fn quantity(&self) -> i64 {
        self.quantity
    }
}

/// A line to be written with a new order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub price: Money,
}

/// Header and lines of an order about to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: UserId,
    pub delivery_address: String,
    pub delivery_method: DeliveryMethod,
    pub delivery_fee: Money,
    pub total: Money,
    pub created_at: i64,
    pub lines: Vec<NewOrderLine>,
}

/// Admin edit form as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderUpdateForm {
    pub delivery_address: String,
    pub delivery_fee: String,
    pub status: String,
}

impl OrderUpdateForm {
    pub fn validate(&self) -> Result<OrderUpdate, CommerceError> {
        let delivery_address = non_empty(Some(self.delivery_address.as_str()))
            .ok_or_else(|| CommerceError::validation("Delivery address is required."))?
            .to_string();
        let delivery_fee = Money::parse(&self.delivery_fee)
            .filter(|fee| !fee.is_negative())
            .ok_or_else(|| {
                CommerceError::validation("Delivery fee must be a non-negative amount.")
            })?;
        let status = OrderStatus::parse(&self.status)
            .ok_or_else(|| CommerceError::validation("Unknown order status."))?;
        Ok(OrderUpdate {
            delivery_address,
            delivery_fee,
            status,
        })
    }
}

/// Validated admin edit.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderUpdate {
    pub delivery_address: String,
    /// Supplied by the editor, not derived from the delivery method.
    pub delivery_fee: Money,
    pub status: OrderStatus,
}
