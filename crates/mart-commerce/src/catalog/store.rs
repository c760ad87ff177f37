//! Product persistence.

use crate::catalog::{CatalogQuery, Product, ProductDraft};
use crate::error::CommerceError;
use crate::ids::ProductId;
use mart_db::{params, Db};

/// Columns selected for [`Product`] rows.
const PRODUCT_COLUMNS: &str = "id, name, price_cents AS price, stock, image";

/// Catalog access backed by the `products` table.
#[derive(Clone)]
pub struct ProductStore {
    db: Db,
}

impl ProductStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// List products matching `query`.
    pub async fn list(&self, query: &CatalogQuery) -> Result<Vec<Product>, CommerceError> {
        let (tail, params) = query.to_sql();
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products{tail}");
        Ok(self.db.query_as(&sql, &params).await?)
    }

    /// Look up a product.
    pub async fn find(&self, id: ProductId) -> Result<Option<Product>, CommerceError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
        Ok(self.db.query_optional(&sql, params![id]).await?)
    }

    /// Fetch a product, failing with [`CommerceError::ProductNotFound`].
    pub async fn get(&self, id: ProductId) -> Result<Product, CommerceError> {
        self.find(id)
            .await?
            .ok_or(CommerceError::ProductNotFound(id))
    }

    pub async fn create(&self, draft: &ProductDraft) -> Result<ProductId, CommerceError> {
        let id = self
            .db
            .insert(
                "INSERT INTO products (name, price_cents, stock, image) VALUES (?, ?, ?, ?)",
                params![
                    draft.name.as_str(),
                    draft.price.amount_cents,
                    draft.stock.max(0),
                    draft.image.as_deref()
                ],
            )
            .await?;
        tracing::info!(product_id = id, name = %draft.name, "product created");
        Ok(ProductId::new(id))
    }

    /// Replace every field of an existing product.
    pub async fn update(&self, id: ProductId, draft: &ProductDraft) -> Result<(), CommerceError> {
        let changed = self
            .db
            .execute(
                "UPDATE products SET name = ?, price_cents = ?, stock = ?, image = ? WHERE id = ?",
                params![
                    draft.name.as_str(),
                    draft.price.amount_cents,
                    draft.stock.max(0),
                    draft.image.as_deref(),
                    id
                ],
            )
            .await?;
        if changed == 0 {
            return Err(CommerceError::ProductNotFound(id));
        }
        tracing::info!(product_id = %id, "product updated");
        Ok(())
    }

    pub async fn delete(&self, id: ProductId) -> Result<(), CommerceError> {
        let changed = self
            .db
            .execute("DELETE FROM products WHERE id = ?", params![id])
            .await?;
        if changed == 0 {
            return Err(CommerceError::ProductNotFound(id));
        }
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Take `quantity` units out of stock if at least that many remain.
    ///
    /// Returns `false` when the guard rejected the update.
    pub async fn decrement_stock(
        &self,
        id: ProductId,
        quantity: i64,
    ) -> Result<bool, CommerceError> {
        let changed = self
            .db
            .execute(
                "UPDATE products SET stock = stock - ? WHERE id = ? AND stock >= ?",
                params![quantity, id, quantity],
            )
            .await?;
        Ok(changed > 0)
    }

    pub async fn count(&self) -> Result<i64, CommerceError> {
        Ok(self
            .db
            .query_i64("SELECT COUNT(*) FROM products", params![])
            .await?)
    }

    /// Products with stock below `threshold`, scarcest first.
    pub async fn low_stock(&self, threshold: i64) -> Result<Vec<Product>, CommerceError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE stock < ? ORDER BY stock ASC, id ASC"
        );
        Ok(self.db.query_as(&sql, params![threshold]).await?)
    }
}
