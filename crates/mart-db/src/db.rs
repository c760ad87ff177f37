//! Database connection and query execution.

use crate::{schema, DbError, QueryResult, Row, Value};
use serde::de::DeserializeOwned;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;

/// Connection settings for [`Db::connect_with`].
#[derive(Debug, Clone)]
pub struct DbOptions {
    /// sqlx connection URL, e.g. `sqlite:freshmart.db` or `sqlite::memory:`.
    pub url: String,
    /// Upper bound on pooled connections. In-memory databases always use one.
    pub max_connections: u32,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            url: "sqlite:freshmart.db".to_string(),
            max_connections: 5,
        }
    }
}

/// SQLite connection pool.
///
/// Provides type-safe query execution with automatic result deserialization.
/// Cloning is cheap; clones share the same pool.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open (creating if needed) the database at `url`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = Db::connect("sqlite:freshmart.db").await?;
    /// ```
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        Self::connect_with(&DbOptions {
            url: url.to_string(),
            ..DbOptions::default()
        })
        .await
    }

    /// Open a database with explicit pool settings.
    pub async fn connect_with(options: &DbOptions) -> Result<Self, DbError> {
        let connect = SqliteConnectOptions::from_str(&options.url)
            .map_err(|e| DbError::OpenError(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Each connection to `:memory:` is a separate database, so keep exactly one alive.
        let in_memory = options.url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(options.max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(connect)
            .await
            .map_err(|e| DbError::OpenError(e.to_string()))?;

        tracing::debug!(url = %options.url, "database opened");
        Ok(Self { pool })
    }

    /// Open a private in-memory database.
    ///
    /// Only one connection exists, so a [`Tx`] must be finished before the
    /// pool is used again.
    pub async fn open_in_memory() -> Result<Self, DbError> {
        Self::connect("sqlite::memory:").await
    }

    /// Create every table and index that does not exist yet.
    pub async fn migrate(&self) -> Result<(), DbError> {
        for statement in schema::statements() {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!("schema up to date");
        Ok(())
    }

    /// Close the pool, waiting for connections to be released.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Execute a SQL statement that doesn't return rows.
    ///
    /// Returns the number of rows affected.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let changed = db.execute(
    ///     "UPDATE products SET stock = stock - ? WHERE id = ? AND stock >= ?",
    ///     params![2, 7, 2],
    /// ).await?;
    /// ```
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        let done = bind_all(sql, params).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }

    /// Execute an INSERT and return the new row id.
    pub async fn insert(&self, sql: &str, params: &[Value]) -> Result<i64, DbError> {
        let done = bind_all(sql, params).execute(&self.pool).await?;
        Ok(done.last_insert_rowid())
    }

    /// Execute a SQL query and return raw results.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let result = db.query("SELECT * FROM products WHERE stock < ?", params![10]).await?;
    /// for row in result.iter() {
    ///     let name = row.get("name").and_then(|v| v.as_text());
    ///     println!("Product: {:?}", name);
    /// }
    /// ```
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let rows = bind_all(sql, params).fetch_all(&self.pool).await?;
        QueryResult::read(&rows)
    }

    /// Execute a SQL query and deserialize results into a vector.
    pub async fn query_as<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<T>, DbError> {
        self.query(sql, params).await?.deserialize_all()
    }

    /// Execute a SQL query and deserialize the first row, if any.
    pub async fn query_optional<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<Option<T>, DbError> {
        let row = bind_all(sql, params).fetch_optional(&self.pool).await?;
        row.map(|r| Row::read(&r)?.deserialize()).transpose()
    }

    /// Execute a SQL query and deserialize exactly one row.
    ///
    /// Returns [`DbError::NotFound`] when the query yields nothing.
    pub async fn query_one<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<T, DbError> {
        self.query_optional(sql, params)
            .await?
            .ok_or(DbError::NotFound)
    }

    /// Read the first column of the first row as an integer.
    ///
    /// Missing rows and NULL (e.g. `SUM` over no rows) read as zero.
    pub async fn query_i64(&self, sql: &str, params: &[Value]) -> Result<i64, DbError> {
        Ok(self.query(sql, params).await?.scalar_i64())
    }

    /// Start a transaction.
    pub async fn begin(&self) -> Result<Tx, DbError> {
        let inner = self.pool.begin().await?;
        Ok(Tx { inner })
    }
}

/// An open transaction. Dropping it without [`Tx::commit`] rolls back.
pub struct Tx {
    inner: Transaction<'static, Sqlite>,
}

impl Tx {
    /// Execute a statement inside the transaction, returning rows affected.
    pub async fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64, DbError> {
        let done = bind_all(sql, params).execute(&mut *self.inner).await?;
        Ok(done.rows_affected())
    }

    /// Execute an INSERT inside the transaction and return the new row id.
    pub async fn insert(&mut self, sql: &str, params: &[Value]) -> Result<i64, DbError> {
        let done = bind_all(sql, params).execute(&mut *self.inner).await?;
        Ok(done.last_insert_rowid())
    }

    /// Run a query inside the transaction.
    pub async fn query(&mut self, sql: &str, params: &[Value]) -> Result<QueryResult, DbError> {
        let rows = bind_all(sql, params).fetch_all(&mut *self.inner).await?;
        QueryResult::read(&rows)
    }

    /// Run a query inside the transaction and deserialize every row.
    pub async fn query_as<T: DeserializeOwned>(
        &mut self,
        sql: &str,
        params: &[Value],
    ) -> Result<Vec<T>, DbError> {
        self.query(sql, params).await?.deserialize_all()
    }

    /// Read the first column of the first row as an integer.
    pub async fn query_i64(&mut self, sql: &str, params: &[Value]) -> Result<i64, DbError> {
        Ok(self.query(sql, params).await?.scalar_i64())
    }

    /// Commit the transaction.
    pub async fn commit(self) -> Result<(), DbError> {
        self.inner.commit().await?;
        Ok(())
    }

    /// Roll the transaction back explicitly.
    pub async fn rollback(self) -> Result<(), DbError> {
        self.inner.rollback().await?;
        Ok(())
    }
}

fn bind_all<'q>(sql: &'q str, params: &'q [Value]) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    params.iter().fold(sqlx::query(sql), |query, param| match param {
        Value::Null => query.bind(None::<i64>),
        Value::Integer(i) => query.bind(*i),
        Value::Real(f) => query.bind(*f),
        Value::Text(s) => query.bind(s.as_str()),
        Value::Blob(b) => query.bind(b.as_slice()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Product {
        id: i64,
        name: String,
        price_cents: i64,
        stock: i64,
        image: Option<String>,
    }

    async fn test_db() -> Db {
        let db = Db::open_in_memory().await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    async fn add_product(db: &Db, name: &str, price_cents: i64, stock: i64) -> i64 {
        db.insert(
            "INSERT INTO products (name, price_cents, stock) VALUES (?, ?, ?)",
            params![name, price_cents, stock],
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_query_as() {
        let db = test_db().await;
        let id = add_product(&db, "Apples", 349, 40).await;

        let products: Vec<Product> = db
            .query_as("SELECT * FROM products WHERE id = ?", params![id])
            .await
            .unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, id);
        assert_eq!(products[0].name, "Apples");
        assert_eq!(products[0].price_cents, 349);
        assert_eq!(products[0].stock, 40);
        assert!(products[0].image.is_none());
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = test_db().await;
        db.migrate().await.unwrap();
        assert_eq!(db.query_i64("SELECT COUNT(*) FROM products", params![]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_query_one_not_found() {
        let db = test_db().await;
        let err = db
            .query_one::<Product>("SELECT * FROM products WHERE id = ?", params![99])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[tokio::test]
    async fn test_conditional_update_reports_rows_affected() {
        let db = test_db().await;
        let id = add_product(&db, "Bread", 250, 3).await;
        let sql = "UPDATE products SET stock = stock - ? WHERE id = ? AND stock >= ?";

        assert_eq!(db.execute(sql, params![2, id, 2]).await.unwrap(), 1);
        assert_eq!(db.execute(sql, params![2, id, 2]).await.unwrap(), 0);
        let stock = db
            .query_i64("SELECT stock FROM products WHERE id = ?", params![id])
            .await
            .unwrap();
        assert_eq!(stock, 1);
    }

    #[tokio::test]
    async fn test_unique_violation_is_classified() {
        let db = test_db().await;
        let sql = "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)";
        db.insert(sql, params!["ann", "ann@example.com", "x", 0]).await.unwrap();
        let err = db
            .insert(sql, params!["ann2", "ann@example.com", "y", 0])
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
    }

    #[tokio::test]
    async fn test_stock_check_constraint() {
        let db = test_db().await;
        let id = add_product(&db, "Eggs", 400, 1).await;
        let err = db
            .execute("UPDATE products SET stock = -1 WHERE id = ?", params![id])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::QueryError(_)));
    }

    #[tokio::test]
    async fn test_transaction_rollback_on_drop() {
        let db = test_db().await;
        {
            let mut tx = db.begin().await.unwrap();
            tx.insert(
                "INSERT INTO products (name, price_cents, stock) VALUES (?, ?, ?)",
                params!["Ghost", 100, 1],
            )
            .await
            .unwrap();
        }
        assert_eq!(db.query_i64("SELECT COUNT(*) FROM products", params![]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transaction_commit() {
        let db = test_db().await;
        let mut tx = db.begin().await.unwrap();
        tx.insert(
            "INSERT INTO products (name, price_cents, stock) VALUES (?, ?, ?)",
            params!["Milk", 199, 12],
        )
        .await
        .unwrap();
        assert_eq!(tx.query_i64("SELECT COUNT(*) FROM products", params![]).await.unwrap(), 1);
        tx.commit().await.unwrap();

        assert_eq!(db.query_i64("SELECT COUNT(*) FROM products", params![]).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sum_over_no_rows_reads_zero() {
        let db = test_db().await;
        let total = db
            .query_i64("SELECT SUM(total_cents) FROM orders", params![])
            .await
            .unwrap();
        assert_eq!(total, 0);
    }
}
