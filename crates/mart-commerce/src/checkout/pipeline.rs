//! Order placement: cart to order.

use crate::cart::{Cart, CartStore};
use crate::catalog::ProductStore;
use crate::checkout::{CheckoutForm, DeliveryMethod};
use crate::error::CommerceError;
use crate::ids::{OrderId, UserId};
use crate::money::Money;
use crate::order::{NewOrder, NewOrderLine, OrderStore};
use mart_db::Db;
use serde::{Deserialize, Serialize};

/// Warning shown when an order was recorded but stock could not be reduced.
pub const STOCK_UPDATE_WARNING: &str =
    "Order placed but stock update failed. Please contact support.";

/// Priced summary of a cart for a delivery method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuote {
    pub subtotal: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

impl OrderQuote {
    /// Price `cart` for `method`.
    pub fn for_cart(cart: &Cart, method: DeliveryMethod) -> Result<Self, CommerceError> {
        let subtotal = cart.subtotal()?;
        let delivery_fee = method.fee();
        let total = subtotal
            .try_add(&delivery_fee)
            .ok_or(CommerceError::Overflow)?;
        Ok(Self {
            subtotal,
            delivery_fee,
            total,
        })
    }
}

/// Outcome of a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub quote: OrderQuote,
    /// Set when at least one stock decrement was rejected or failed.
    pub stock_update_failed: bool,
}

impl PlacedOrder {
    /// Path of the order detail page.
    pub fn detail_path(&self) -> String {
        format!("/orders/{}", self.order_id)
    }
}

/// Turns a user's cart into an order.
#[derive(Clone)]
pub struct OrderPipeline {
    carts: CartStore,
    products: ProductStore,
    orders: OrderStore,
}

impl OrderPipeline {
    pub fn new(db: Db) -> Self {
        Self {
            carts: CartStore::new(db.clone()),
            products: ProductStore::new(db.clone()),
            orders: OrderStore::new(db),
        }
    }

    /// Place an order for everything in `user`'s cart.
    ///
    /// Prices come from the cart as read now, never from the form. The
    /// order header and lines are written atomically. Stock is then
    /// decremented line by line with a guarded update; a rejected decrement
    /// is logged and flagged on the result but does not undo the order.
    /// The cart is cleared afterwards regardless.
    pub async fn place_order(
        &self,
        user: UserId,
        form: &CheckoutForm,
    ) -> Result<PlacedOrder, CommerceError> {
        let delivery = form.validate()?;

        let cart = self.carts.cart(user).await?;
        if cart.is_empty() {
            return Err(CommerceError::EmptyCart);
        }

        let quote = OrderQuote::for_cart(&cart, delivery.method)?;
        let new_order = NewOrder {
            user_id: user,
            delivery_address: delivery.address,
            delivery_method: delivery.method,
            delivery_fee: quote.delivery_fee,
            total: quote.total,
            created_at: chrono::Utc::now().timestamp(),
            lines: cart
                .lines
                .iter()
                .map(|line| NewOrderLine {
                    product_id: line.product_id,
                    product_name: line.name.clone(),
                    quantity: line.quantity,
                    price: line.price,
                })
                .collect(),
        };

        let order_id = self.orders.create(&new_order).await?;
        tracing::info!(
            order_id = %order_id,
            user_id = %user,
            method = delivery.method.as_str(),
            total = %quote.total,
            "order placed"
        );

        let mut stock_update_failed = false;
        for line in &cart.lines {
            match self
                .products
                .decrement_stock(line.product_id, line.quantity)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    stock_update_failed = true;
                    tracing::warn!(
                        order_id = %order_id,
                        product_id = %line.product_id,
                        quantity = line.quantity,
                        "insufficient stock at decrement"
                    );
                }
                Err(e) => {
                    stock_update_failed = true;
                    tracing::warn!(
                        order_id = %order_id,
                        product_id = %line.product_id,
                        error = %e,
                        "stock decrement failed"
                    );
                }
            }
        }

        if let Err(e) = self.carts.clear(user).await {
            tracing::warn!(user_id = %user, error = %e, "failed to clear cart after order");
        }

        Ok(PlacedOrder {
            order_id,
            quote,
            stock_update_failed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductDraft;
    use crate::ids::ProductId;
    use mart_db::params;

    struct Fixture {
        db: Db,
        pipeline: OrderPipeline,
        carts: CartStore,
        products: ProductStore,
        orders: OrderStore,
        user: UserId,
    }

    async fn fixture() -> Fixture {
        let db = Db::open_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let user = db
            .insert(
                "INSERT INTO users (username, email, password_hash, created_at) VALUES ('ann', 'ann@example.com', 'x', 0)",
                params![],
            )
            .await
            .unwrap();
        Fixture {
            pipeline: OrderPipeline::new(db.clone()),
            carts: CartStore::new(db.clone()),
            products: ProductStore::new(db.clone()),
            orders: OrderStore::new(db.clone()),
            db,
            user: UserId::new(user),
        }
    }

    async fn product(f: &Fixture, name: &str, cents: i64, stock: i64) -> ProductId {
        f.products
            .create(&ProductDraft::new(name, Money::new(cents), stock))
            .await
            .unwrap()
    }

    async fn count(f: &Fixture, table: &str) -> i64 {
        f.db
            .query_i64(&format!("SELECT COUNT(*) FROM {table}"), params![])
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_express_checkout_totals() {
        let f = fixture().await;
        let a = product(&f, "Cheese", 1000, 5).await;
        let b = product(&f, "Bread", 500, 5).await;
        f.carts.add(f.user, a, 2).await.unwrap();
        f.carts.add(f.user, b, 1).await.unwrap();

        let placed = f
            .pipeline
            .place_order(f.user, &CheckoutForm::new(DeliveryMethod::Express, "1 Main St"))
            .await
            .unwrap();

        assert_eq!(placed.quote.subtotal, Money::new(2500));
        assert_eq!(placed.quote.delivery_fee, Money::new(1500));
        assert_eq!(placed.quote.total, Money::new(4000));
        assert!(!placed.stock_update_failed);
        assert_eq!(placed.detail_path(), format!("/orders/{}", placed.order_id));

        let order = f.orders.get(placed.order_id).await.unwrap();
        assert_eq!(order.total, Money::new(4000));
        assert_eq!(order.delivery_address, "1 Main St");
        assert_eq!(f.orders.lines(placed.order_id).await.unwrap().len(), 2);

        assert_eq!(f.products.get(a).await.unwrap().stock, 3);
        assert_eq!(f.products.get(b).await.unwrap().stock, 4);
        assert!(f.carts.cart(f.user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_pickup_is_free_and_needs_no_address() {
        let f = fixture().await;
        let a = product(&f, "Cheese", 1000, 5).await;
        f.carts.add(f.user, a, 1).await.unwrap();

        let form = CheckoutForm {
            delivery_method: Some("pickup".into()),
            delivery_address: None,
        };
        let placed = f.pipeline.place_order(f.user, &form).await.unwrap();
        assert_eq!(placed.quote.total, Money::new(1000));

        let order = f.orders.get(placed.order_id).await.unwrap();
        assert_eq!(order.delivery_address, "Pickup in store");
        assert_eq!(order.delivery_method, DeliveryMethod::Pickup);
    }

    #[tokio::test]
    async fn test_empty_cart_writes_nothing() {
        let f = fixture().await;
        let err = f
            .pipeline
            .place_order(f.user, &CheckoutForm::new(DeliveryMethod::Normal, "1 Main St"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::EmptyCart));
        assert_eq!(count(&f, "orders").await, 0);
        assert_eq!(count(&f, "order_items").await, 0);
    }

    #[tokio::test]
    async fn test_missing_address_is_rejected_before_writes() {
        let f = fixture().await;
        let a = product(&f, "Cheese", 1000, 5).await;
        f.carts.add(f.user, a, 1).await.unwrap();

        let form = CheckoutForm {
            delivery_method: Some("normal".into()),
            delivery_address: Some(String::new()),
        };
        assert!(matches!(
            f.pipeline.place_order(f.user, &form).await,
            Err(CommerceError::Validation(_))
        ));
        assert_eq!(count(&f, "orders").await, 0);
        assert_eq!(f.carts.count(f.user).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stock_shortfall_still_places_order() {
        let f = fixture().await;
        let a = product(&f, "Cheese", 1000, 5).await;
        f.carts.add(f.user, a, 4).await.unwrap();
        // stock drops after the item was carted
        f.db
            .execute("UPDATE products SET stock = 1 WHERE id = ?", params![a])
            .await
            .unwrap();

        let placed = f
            .pipeline
            .place_order(f.user, &CheckoutForm::new(DeliveryMethod::Normal, "1 Main St"))
            .await
            .unwrap();

        assert!(placed.stock_update_failed);
        assert_eq!(placed.quote.total, Money::new(5000));
        assert_eq!(f.products.get(a).await.unwrap().stock, 1);
        assert_eq!(count(&f, "orders").await, 1);
        assert!(f.carts.cart(f.user).await.unwrap().is_empty());
    }

    #[test]
    fn test_quote_unknown_method_uses_normal_fee() {
        let cart = Cart::empty();
        let quote = OrderQuote::for_cart(&cart, DeliveryMethod::parse(Some("teleport"))).unwrap();
        assert_eq!(quote.delivery_fee, Money::new(1000));
        assert_eq!(quote.total, Money::new(1000));
    }
}
