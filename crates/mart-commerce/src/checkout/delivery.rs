//! Delivery methods and their fees.

use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Address recorded for orders collected in store.
pub const PICKUP_ADDRESS: &str = "Pickup in store";

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// Collected in store. Free.
    Pickup,
    /// Standard delivery.
    #[default]
    Normal,
    /// Express delivery.
    Express,
}

impl DeliveryMethod {
    /// Parse a submitted method. Unknown or missing values mean [`DeliveryMethod::Normal`].
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("pickup") => DeliveryMethod::Pickup,
            Some("express") => DeliveryMethod::Express,
            _ => DeliveryMethod::Normal,
        }
    }

    /// Flat delivery fee.
    pub fn fee(&self) -> Money {
        match self {
            DeliveryMethod::Pickup => Money::zero(),
            DeliveryMethod::Normal => Money::new(1000),
            DeliveryMethod::Express => Money::new(1500),
        }
    }

    pub fn requires_address(&self) -> bool {
        !matches!(self, DeliveryMethod::Pickup)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "pickup",
            DeliveryMethod::Normal => "normal",
            DeliveryMethod::Express => "express",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DeliveryMethod::Pickup => "Pickup in store",
            DeliveryMethod::Normal => "Normal delivery",
            DeliveryMethod::Express => "Express delivery",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fees() {
        assert_eq!(DeliveryMethod::Pickup.fee(), Money::zero());
        assert_eq!(DeliveryMethod::Normal.fee(), Money::new(1000));
        assert_eq!(DeliveryMethod::Express.fee(), Money::new(1500));
    }

    #[test]
    fn test_unknown_method_is_normal() {
        assert_eq!(DeliveryMethod::parse(Some("drone")), DeliveryMethod::Normal);
        assert_eq!(DeliveryMethod::parse(None), DeliveryMethod::Normal);
        assert_eq!(DeliveryMethod::parse(Some(" Express ")), DeliveryMethod::Express);
        assert_eq!(DeliveryMethod::parse(Some("drone")).fee(), Money::new(1000));
    }
}
