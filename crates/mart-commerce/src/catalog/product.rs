//! Product types.

use crate::catalog::StockBucket;
use crate::error::CommerceError;
use crate::form::{non_empty, parse_leading_int};
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Units on hand. Never negative.
    pub stock: i64,
    /// Image reference (file name or URL).
    pub image: Option<String>,
}

impl Product {
    /// Check if any units are on hand.
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Check if `quantity` units can be sold right now.
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }

    /// The stock bucket this product falls into.
    pub fn stock_bucket(&self) -> StockBucket {
        StockBucket::of(self.stock)
    }

    /// Check if stock is below `threshold`.
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock < threshold
    }
}

/// Validated values for creating or replacing a product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub image: Option<String>,
}

impl ProductDraft {
    pub fn new(name: impl Into<String>, price: Money, stock: i64) -> Self {
        Self {
            name: name.into(),
            price,
            stock: stock.max(0),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Admin add/update product form as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductForm {
    pub name: String,
    pub stock: String,
    pub price: String,
    /// Newly supplied image reference.
    pub image: Option<String>,
    /// Image already on the product, kept when no new one is supplied.
    pub current_image: Option<String>,
}

impl ProductForm {
    /// Validate the form.
    ///
    /// Only the name is required. Unparseable stock or price read as zero
    /// and negative values are clamped to zero.
    pub fn into_draft(self) -> Result<ProductDraft, CommerceError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CommerceError::validation("Product name is required."));
        }

        let stock = parse_leading_int(&self.stock).unwrap_or(0).max(0);
        let price = Money::parse(&self.price)
            .filter(|p| !p.is_negative())
            .unwrap_or_default();
        let image = non_empty(self.image.as_deref())
            .or_else(|| non_empty(self.current_image.as_deref()))
            .map(str::to_string);

        Ok(ProductDraft {
            name: name.to_string(),
            price,
            stock,
            image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, stock: &str, price: &str) -> ProductForm {
        ProductForm {
            name: name.into(),
            stock: stock.into(),
            price: price.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_form_requires_name() {
        let err = form("  ", "5", "1.00").into_draft().unwrap_err();
        assert_eq!(err.to_string(), "Product name is required.");
    }

    #[test]
    fn test_form_lenient_numbers() {
        let draft = form("Rice", "abc", "n/a").into_draft().unwrap();
        assert_eq!(draft.stock, 0);
        assert_eq!(draft.price, Money::zero());

        let draft = form("Rice", "-4", "2.50").into_draft().unwrap();
        assert_eq!(draft.stock, 0);
        assert_eq!(draft.price, Money::new(250));
    }

    #[test]
    fn test_form_keeps_current_image() {
        let mut f = form("Tea", "3", "4");
        f.current_image = Some("tea.png".into());
        assert_eq!(f.clone().into_draft().unwrap().image.as_deref(), Some("tea.png"));

        f.image = Some("tea-new.png".into());
        assert_eq!(f.into_draft().unwrap().image.as_deref(), Some("tea-new.png"));
    }

    #[test]
    fn test_product_stock_helpers() {
        let product = Product {
            id: ProductId::new(1),
            name: "Salt".into(),
            price: Money::new(99),
            stock: 4,
            image: None,
        };
        assert!(product.is_in_stock());
        assert!(product.can_fulfill(4));
        assert!(!product.can_fulfill(5));
        assert_eq!(product.stock_bucket(), StockBucket::Low);
        assert!(product.is_low_stock(10));
    }
}
