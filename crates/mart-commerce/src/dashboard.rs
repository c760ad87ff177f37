//! Dashboard figures for staff and customers.

use crate::catalog::{Product, ProductStore};
use crate::error::CommerceError;
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::Money;
use crate::order::{OrderQuery, OrderStore, OrderWithCustomer};
use mart_db::{params, Db};
use serde::{Deserialize, Serialize};

/// Stock level below which the staff dashboard lists a product.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;
const RECENT_ORDERS: usize = 5;
const RECENT_ITEMS: i64 = 15;

/// Revenue for one calendar month (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySales {
    /// `YYYY-MM`.
    pub month: String,
    pub revenue: Money,
    pub orders: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

/// Figures shown on the admin/logistics dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_products: i64,
    pub total_orders: i64,
    /// Sum of all order totals, delivery fees included.
    pub total_revenue: Money,
    pub total_users: i64,
    pub monthly_sales: Vec<MonthlySales>,
    pub role_breakdown: Vec<RoleCount>,
    pub recent_orders: Vec<OrderWithCustomer>,
    pub low_stock: Vec<Product>,
}

/// A line from one of the customer's orders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchasedItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub price: Money,
    pub created_at: i64,
}

/// Figures shown on a customer's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerStats {
    pub total_orders: i64,
    pub total_spent: Money,
    /// Most recently bought lines, newest first.
    pub recent_items: Vec<PurchasedItem>,
    /// Units bought across every order.
    pub total_items_bought: i64,
}

/// Read-only aggregate queries.
#[derive(Clone)]
pub struct Dashboard {
    db: Db,
    products: ProductStore,
    orders: OrderStore,
}

impl Dashboard {
    pub fn new(db: Db) -> Self {
        Self {
            products: ProductStore::new(db.clone()),
            orders: OrderStore::new(db.clone()),
            db,
        }
    }

    pub async fn store_stats(&self, low_stock_threshold: i64) -> Result<StoreStats, CommerceError> {
        let total_products = self.products.count().await?;
        let total_orders = self.orders.count().await?;
        let total_revenue = Money::new(
            self.db
                .query_i64("SELECT COALESCE(SUM(total_cents), 0) FROM orders", params![])
                .await?,
        );
        let total_users = self
            .db
            .query_i64("SELECT COUNT(*) FROM users", params![])
            .await?;

        let monthly_sales = self
            .db
            .query_as(
                "SELECT strftime('%Y-%m', created_at, 'unixepoch') AS month, \
                 SUM(total_cents) AS revenue, COUNT(*) AS orders \
                 FROM orders GROUP BY month ORDER BY month ASC",
                params![],
            )
            .await?;
        let role_breakdown = self
            .db
            .query_as(
                "SELECT role, COUNT(*) AS count FROM users GROUP BY role ORDER BY role ASC",
                params![],
            )
            .await?;

        let mut recent_orders = self.orders.list(&OrderQuery::new()).await?;
        recent_orders.truncate(RECENT_ORDERS);
        let low_stock = self.products.low_stock(low_stock_threshold).await?;

        Ok(StoreStats {
            total_products,
            total_orders,
            total_revenue,
            total_users,
            monthly_sales,
            role_breakdown,
            recent_orders,
            low_stock,
        })
    }

    pub async fn customer_stats(&self, user: UserId) -> Result<CustomerStats, CommerceError> {
        let total_orders = self
            .db
            .query_i64("SELECT COUNT(*) FROM orders WHERE user_id = ?", params![user])
            .await?;
        let total_spent = Money::new(
            self.db
                .query_i64(
                    "SELECT COALESCE(SUM(total_cents), 0) FROM orders WHERE user_id = ?",
                    params![user],
                )
                .await?,
        );
        let recent_items = self
            .db
            .query_as(
                "SELECT oi.order_id, oi.product_id, oi.product_name, oi.quantity, \
                 oi.price_cents AS price, o.created_at \
                 FROM order_items oi JOIN orders o ON o.id = oi.order_id \
                 WHERE o.user_id = ? ORDER BY o.created_at DESC, oi.id DESC LIMIT ?",
                params![user, RECENT_ITEMS],
            )
            .await?;
        let total_items_bought = self
            .db
            .query_i64(
                "SELECT COALESCE(SUM(oi.quantity), 0) FROM order_items oi \
                 JOIN orders o ON o.id = oi.order_id WHERE o.user_id = ?",
                params![user],
            )
            .await?;

        Ok(CustomerStats {
            total_orders,
            total_spent,
            recent_items,
            total_items_bought,
        })
    }
}
