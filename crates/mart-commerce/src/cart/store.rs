//! Database-backed carts, one per user.

use crate::cart::{Cart, CartLine};
use crate::catalog::{Product, ProductStore};
use crate::error::CommerceError;
use crate::ids::{ProductId, UserId};
use mart_db::{params, Db};

const CART_LINES_SQL: &str = "SELECT ci.product_id, p.name, p.price_cents AS price, ci.quantity, \
     p.stock, p.image \
     FROM cart_items ci JOIN products p ON p.id = ci.product_id \
     WHERE ci.user_id = ? ORDER BY p.name COLLATE NOCASE ASC, ci.product_id ASC";

/// Result of a successful add-to-cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartAddition {
    pub product: Product,
    /// Units added by this request.
    pub added: i64,
    /// Units on the line afterwards.
    pub quantity: i64,
}

/// Cart operations scoped to a user.
#[derive(Clone)]
pub struct CartStore {
    db: Db,
    products: ProductStore,
}

impl CartStore {
    pub fn new(db: Db) -> Self {
        let products = ProductStore::new(db.clone());
        Self { db, products }
    }

    /// Current cart contents with live product data.
    pub async fn cart(&self, user: UserId) -> Result<Cart, CommerceError> {
        let lines: Vec<CartLine> = self.db.query_as(CART_LINES_SQL, params![user]).await?;
        Ok(Cart::new(lines))
    }

    /// Total units in the cart.
    pub async fn count(&self, user: UserId) -> Result<i64, CommerceError> {
        Ok(self
            .db
            .query_i64(
                "SELECT COALESCE(SUM(quantity), 0) FROM cart_items WHERE user_id = ?",
                params![user],
            )
            .await?)
    }

    /// Add `quantity` units of a product, merging with any existing line.
    ///
    /// The resulting line may not exceed the product's stock at this moment.
    pub async fn add(
        &self,
        user: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartAddition, CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let product = self
            .products
            .find(product_id)
            .await?
            .ok_or(CommerceError::ItemNotFound(product_id))?;

        let existing = self.line_quantity(user, product_id).await?;
        let requested = existing
            .checked_add(quantity)
            .ok_or(CommerceError::Overflow)?;
        if !product.can_fulfill(requested) {
            return Err(CommerceError::OutOfStock {
                product_id,
                requested,
                available: product.stock,
            });
        }

        self.upsert(user, product_id, requested).await?;
        tracing::debug!(user_id = %user, product_id = %product_id, quantity = requested, "cart line saved");
        Ok(CartAddition {
            product,
            added: quantity,
            quantity: requested,
        })
    }

    /// Replace a line's quantity. Callers coerce form input first.
    pub async fn set_quantity(
        &self,
        user: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        if quantity <= 0 {
            return Err(CommerceError::InvalidQuantity(quantity));
        }
        let product = self
            .products
            .find(product_id)
            .await?
            .ok_or(CommerceError::ItemNotFound(product_id))?;
        if !product.can_fulfill(quantity) {
            return Err(CommerceError::OutOfStock {
                product_id,
                requested: quantity,
                available: product.stock,
            });
        }
        self.upsert(user, product_id, quantity).await
    }

    /// Drop a line. Returns whether it existed.
    pub async fn remove(&self, user: UserId, product_id: ProductId) -> Result<bool, CommerceError> {
        let removed = self
            .db
            .execute(
                "DELETE FROM cart_items WHERE user_id = ? AND product_id = ?",
                params![user, product_id],
            )
            .await?;
        Ok(removed > 0)
    }

    /// Empty the cart. Returns the number of lines removed.
    pub async fn clear(&self, user: UserId) -> Result<u64, CommerceError> {
        Ok(self
            .db
            .execute("DELETE FROM cart_items WHERE user_id = ?", params![user])
            .await?)
    }

    async fn line_quantity(&self, user: UserId, product_id: ProductId) -> Result<i64, CommerceError> {
        Ok(self
            .db
            .query_i64(
                "SELECT quantity FROM cart_items WHERE user_id = ? AND product_id = ?",
                params![user, product_id],
            )
            .await?)
    }

    async fn upsert(
        &self,
        user: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<(), CommerceError> {
        self.db
            .execute(
                "INSERT INTO cart_items (user_id, product_id, quantity) VALUES (?, ?, ?) \
                 ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = excluded.quantity",
                params![user, product_id, quantity],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ProductDraft;
    use crate::money::Money;

    struct Fixture {
        carts: CartStore,
        products: ProductStore,
        user: UserId,
        other: UserId,
    }

    async fn insert_user(db: &Db, email: &str) -> UserId {
        let id = db
            .insert(
                "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, 'x', 0)",
                params![email, email],
            )
            .await
            .unwrap();
        UserId::new(id)
    }

    async fn fixture() -> Fixture {
        let db = Db::open_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let user = insert_user(&db, "ann@example.com").await;
        let other = insert_user(&db, "bob@example.com").await;
        Fixture {
            carts: CartStore::new(db.clone()),
            products: ProductStore::new(db),
            user,
            other,
        }
    }

    async fn product(f: &Fixture, name: &str, cents: i64, stock: i64) -> ProductId {
        f.products
            .create(&ProductDraft::new(name, Money::new(cents), stock))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_add_merges_lines() {
        let f = fixture().await;
        let milk = product(&f, "Milk", 199, 10).await;

        f.carts.add(f.user, milk, 2).await.unwrap();
        let added = f.carts.add(f.user, milk, 3).await.unwrap();
        assert_eq!(added.added, 3);
        assert_eq!(added.quantity, 5);

        let cart = f.carts.cart(f.user).await.unwrap();
        assert_eq!(cart.unique_item_count(), 1);
        assert_eq!(cart.lines[0].quantity, 5);
        assert_eq!(cart.lines[0].name, "Milk");
        assert_eq!(cart.lines[0].stock, 10);
        assert_eq!(f.carts.count(f.user).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_add_never_exceeds_stock() {
        let f = fixture().await;
        let eggs = product(&f, "Eggs", 400, 3).await;

        f.carts.add(f.user, eggs, 2).await.unwrap();
        let err = f.carts.add(f.user, eggs, 2).await.unwrap_err();
        assert_eq!(err.to_string(), "Only 3 left in stock.");
        assert!(matches!(
            err,
            CommerceError::OutOfStock {
                requested: 4,
                available: 3,
                ..
            }
        ));
        assert_eq!(f.carts.count(f.user).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_add_unknown_product() {
        let f = fixture().await;
        let err = f.carts.add(f.user, ProductId::new(77), 1).await.unwrap_err();
        assert_eq!(err.to_string(), "Item not found.");
    }

    #[tokio::test]
    async fn test_set_quantity_checks_stock_directly() {
        let f = fixture().await;
        let tea = product(&f, "Tea", 350, 4).await;
        f.carts.add(f.user, tea, 3).await.unwrap();

        f.carts.set_quantity(f.user, tea, 4).await.unwrap();
        assert!(matches!(
            f.carts.set_quantity(f.user, tea, 5).await,
            Err(CommerceError::OutOfStock { available: 4, .. })
        ));
        assert_eq!(f.carts.cart(f.user).await.unwrap().lines[0].quantity, 4);
    }

    #[tokio::test]
    async fn test_carts_are_per_user() {
        let f = fixture().await;
        let rice = product(&f, "Rice", 250, 20).await;
        f.carts.add(f.user, rice, 1).await.unwrap();

        assert!(f.carts.cart(f.other).await.unwrap().is_empty());
        assert_eq!(f.carts.count(f.other).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let f = fixture().await;
        let a = product(&f, "A", 100, 5).await;
        let b = product(&f, "B", 100, 5).await;
        f.carts.add(f.user, a, 1).await.unwrap();
        f.carts.add(f.user, b, 1).await.unwrap();

        assert!(f.carts.remove(f.user, a).await.unwrap());
        assert!(!f.carts.remove(f.user, a).await.unwrap());
        assert_eq!(f.carts.clear(f.user).await.unwrap(), 1);
        assert!(f.carts.cart(f.user).await.unwrap().is_empty());
    }
}
