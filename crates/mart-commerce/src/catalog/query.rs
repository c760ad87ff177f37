//! Catalog listing query builder.

use crate::form::like_pattern;
use mart_db::Value;
use serde::{Deserialize, Serialize};

/// Stock level buckets used by the catalog filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockBucket {
    /// Fewer than 5 units.
    Low,
    /// 5 to 19 units.
    Medium,
    /// 20 units or more.
    High,
}

impl StockBucket {
    /// Bucket a stock level.
    pub fn of(stock: i64) -> Self {
        match stock {
            s if s < 5 => StockBucket::Low,
            s if s < 20 => StockBucket::Medium,
            _ => StockBucket::High,
        }
    }

    /// Parse a filter value. Unknown values mean "no filter".
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(StockBucket::Low),
            "medium" => Some(StockBucket::Medium),
            "high" => Some(StockBucket::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockBucket::Low => "low",
            StockBucket::Medium => "medium",
            StockBucket::High => "high",
        }
    }

    /// Get SQL condition.
    pub fn to_sql(&self) -> &'static str {
        match self {
            StockBucket::Low => "stock < 5",
            StockBucket::Medium => "stock BETWEEN 5 AND 19",
            StockBucket::High => "stock >= 20",
        }
    }
}

/// Sort options for catalog listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    NameAsc,
    NameDesc,
    StockAsc,
    StockDesc,
    PriceAsc,
    PriceDesc,
}

impl ProductSort {
    /// Parse a sort key such as `price_desc`. Unknown keys fall back to the default.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "name_desc" => ProductSort::NameDesc,
            "stock_asc" => ProductSort::StockAsc,
            "stock_desc" => ProductSort::StockDesc,
            "price_asc" => ProductSort::PriceAsc,
            "price_desc" => ProductSort::PriceDesc,
            _ => ProductSort::NameAsc,
        }
    }

    /// Get SQL ORDER BY clause.
    pub fn to_sql(&self) -> &'static str {
        match self {
            ProductSort::NameAsc => "name COLLATE NOCASE ASC, id ASC",
            ProductSort::NameDesc => "name COLLATE NOCASE DESC, id DESC",
            ProductSort::StockAsc => "stock ASC, id ASC",
            ProductSort::StockDesc => "stock DESC, id DESC",
            ProductSort::PriceAsc => "price_cents ASC, id ASC",
            ProductSort::PriceDesc => "price_cents DESC, id DESC",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProductSort::NameAsc => "Name: A-Z",
            ProductSort::NameDesc => "Name: Z-A",
            ProductSort::StockAsc => "Stock: Low to High",
            ProductSort::StockDesc => "Stock: High to Low",
            ProductSort::PriceAsc => "Price: Low to High",
            ProductSort::PriceDesc => "Price: High to Low",
        }
    }
}

/// Raw listing parameters as they arrive from a query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogParams {
    pub search: Option<String>,
    pub stock: Option<String>,
    pub sort: Option<String>,
}

/// A catalog listing query. Every part is optional and parts combine with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    /// Substring matched against the product name.
    pub search: Option<String>,
    pub stock: Option<StockBucket>,
    pub sort: ProductSort,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the search text. Blank text clears it.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_string());
        self
    }

    pub fn with_stock(mut self, bucket: StockBucket) -> Self {
        self.stock = Some(bucket);
        self
    }

    pub fn with_sort(mut self, sort: ProductSort) -> Self {
        self.sort = sort;
        self
    }

    /// Build the WHERE and ORDER BY tail plus its parameters.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(search) = &self.search {
            conditions.push("name LIKE ? ESCAPE '\\'".to_string());
            params.push(Value::Text(like_pattern(search)));
        }
        if let Some(bucket) = self.stock {
            conditions.push(bucket.to_sql().to_string());
        }

        let mut sql = String::new();
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(self.sort.to_sql());
        (sql, params)
    }
}

impl From<CatalogParams> for CatalogQuery {
    fn from(params: CatalogParams) -> Self {
        let mut query = CatalogQuery::new();
        if let Some(search) = params.search {
            query = query.with_search(search);
        }
        query.stock = params.stock.as_deref().and_then(StockBucket::parse);
        query.sort = params
            .sort
            .as_deref()
            .map(ProductSort::parse)
            .unwrap_or_default();
        query
    }
}
