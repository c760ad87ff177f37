//! Checkout form handling.

use crate::checkout::{DeliveryMethod, PICKUP_ADDRESS};
use crate::error::CommerceError;
use crate::form::non_empty;
use serde::{Deserialize, Serialize};

/// The place-order form as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub delivery_method: Option<String>,
    pub delivery_address: Option<String>,
}

impl CheckoutForm {
    pub fn new(method: DeliveryMethod, address: impl Into<String>) -> Self {
        Self {
            delivery_method: Some(method.as_str().to_string()),
            delivery_address: Some(address.into()),
        }
    }

    /// Resolve the delivery method and address.
    ///
    /// Pickup orders always get [`PICKUP_ADDRESS`]; every other method needs
    /// a non-blank address.
    pub fn validate(&self) -> Result<DeliveryDetails, CommerceError> {
        let method = DeliveryMethod::parse(self.delivery_method.as_deref());
        let address = if method.requires_address() {
            non_empty(self.delivery_address.as_deref())
                .ok_or_else(|| CommerceError::validation("Delivery address is required."))?
                .to_string()
        } else {
            PICKUP_ADDRESS.to_string()
        };
        Ok(DeliveryDetails { method, address })
    }
}

/// Validated delivery choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryDetails {
    pub method: DeliveryMethod,
    pub address: String,
}
