//! Order persistence.

use crate::cart::items_total;
use crate::error::CommerceError;
use crate::ids::{OrderId, UserId};
use crate::order::{NewOrder, Order, OrderLine, OrderQuery, OrderUpdate, OrderWithCustomer};
use mart_db::{params, Db, DbError};

const ORDER_COLUMNS: &str = "o.id, o.user_id, o.delivery_address, o.delivery_method, \
     o.delivery_fee_cents AS delivery_fee, o.total_cents AS total, o.status, o.created_at";

const LINE_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, price_cents AS price";

/// Orders and their lines.
#[derive(Clone)]
pub struct OrderStore {
    db: Db,
}

impl OrderStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Write the header and every line in one transaction.
    ///
    /// Any failure rolls the whole order back and is reported as
    /// [`CommerceError::OrderCreationFailed`].
    pub async fn create(&self, order: &NewOrder) -> Result<OrderId, CommerceError> {
        self.write(order)
            .await
            .map(OrderId::new)
            .map_err(|e| {
                tracing::error!(user_id = %order.user_id, error = %e, "order transaction rolled back");
                CommerceError::OrderCreationFailed(e.to_string())
            })
    }

    async fn write(&self, order: &NewOrder) -> Result<i64, DbError> {
        let mut tx = self.db.begin().await?;
        let order_id = tx
            .insert(
                "INSERT INTO orders (user_id, delivery_address, delivery_method, delivery_fee_cents, \
                 total_cents, status, created_at) VALUES (?, ?, ?, ?, ?, 'pending', ?)",
                params![
                    order.user_id,
                    order.delivery_address.as_str(),
                    order.delivery_method.as_str(),
                    order.delivery_fee.amount_cents,
                    order.total.amount_cents,
                    order.created_at
                ],
            )
            .await?;

        for line in &order.lines {
            tx.execute(
                "INSERT INTO order_items (order_id, product_id, product_name, quantity, price_cents) \
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    order_id,
                    line.product_id,
                    line.product_name.as_str(),
                    line.quantity,
                    line.price.amount_cents
                ],
            )
            .await?;
        }

        tx.commit().await?;
        Ok(order_id)
    }

    pub async fn find(&self, id: OrderId) -> Result<Option<Order>, CommerceError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = ?");
        Ok(self.db.query_optional(&sql, params![id]).await?)
    }

    /// Fetch an order, failing with [`CommerceError::OrderNotFound`].
    pub async fn get(&self, id: OrderId) -> Result<Order, CommerceError> {
        self.find(id).await?.ok_or(CommerceError::OrderNotFound(id))
    }

    /// Fetch an order only if `user` placed it.
    pub async fn get_for_user(&self, id: OrderId, user: UserId) -> Result<Order, CommerceError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders o WHERE o.id = ? AND o.user_id = ?");
        self.db
            .query_optional(&sql, params![id, user])
            .await?
            .ok_or(CommerceError::OrderNotFound(id))
    }

    /// Fetch an order with the placing account's name and email.
    pub async fn get_with_customer(&self, id: OrderId) -> Result<OrderWithCustomer, CommerceError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS}, u.username, u.email \
             FROM orders o LEFT JOIN users u ON u.id = o.user_id WHERE o.id = ?"
        );
        self.db
            .query_optional(&sql, params![id])
            .await?
            .ok_or(CommerceError::OrderNotFound(id))
    }

    pub async fn lines(&self, id: OrderId) -> Result<Vec<OrderLine>, CommerceError> {
        let sql = format!("SELECT {LINE_COLUMNS} FROM order_items WHERE order_id = ? ORDER BY id ASC");
        Ok(self.db.query_as(&sql, params![id]).await?)
    }

    /// A customer's orders, newest first.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>, CommerceError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE o.user_id = ? \
             ORDER BY o.created_at DESC, o.id DESC"
        );
        Ok(self.db.query_as(&sql, params![user]).await?)
    }

    /// All orders matching `query`, with customer details.
    pub async fn list(&self, query: &OrderQuery) -> Result<Vec<OrderWithCustomer>, CommerceError> {
        let (tail, params) = query.to_sql();
        let sql = format!(
            "SELECT {ORDER_COLUMNS}, u.username, u.email \
             FROM orders o LEFT JOIN users u ON u.id = o.user_id{tail}"
        );
        Ok(self.db.query_as(&sql, &params).await?)
    }

    /// Apply an admin edit and recompute the total from the stored lines.
    ///
    /// The new total is the items total at captured prices plus the
    /// supplied fee.
    pub async fn update(&self, id: OrderId, update: &OrderUpdate) -> Result<Order, CommerceError> {
        self.get(id).await?;
        let lines = self.lines(id).await?;
        let subtotal = items_total(&lines)?;
        let total = subtotal
            .try_add(&update.delivery_fee)
            .ok_or(CommerceError::Overflow)?;

        self.db
            .execute(
                "UPDATE orders SET delivery_address = ?, delivery_fee_cents = ?, total_cents = ?, \
                 status = ? WHERE id = ?",
                params![
                    update.delivery_address.as_str(),
                    update.delivery_fee.amount_cents,
                    total.amount_cents,
                    update.status.as_str(),
                    id
                ],
            )
            .await?;

        tracing::info!(
            order_id = %id,
            status = update.status.as_str(),
            total = %total,
            "order updated"
        );
        self.get(id).await
    }

    pub async fn count(&self) -> Result<i64, CommerceError> {
        Ok(self
            .db
            .query_i64("SELECT COUNT(*) FROM orders", params![])
            .await?)
    }
}
