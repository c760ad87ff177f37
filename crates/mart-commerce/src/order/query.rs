//! Admin order listing query builder.

use crate::form::like_pattern;
use crate::order::OrderStatus;
use chrono::{Days, NaiveDate};
use mart_db::Value;
use serde::{Deserialize, Serialize};

/// Sort options for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderSort {
    IdAsc,
    #[default]
    IdDesc,
    TotalAsc,
    TotalDesc,
    DateAsc,
    DateDesc,
}

impl OrderSort {
    /// Parse a sort key such as `total_desc`. Unknown keys fall back to the default.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "id_asc" => OrderSort::IdAsc,
            "total_asc" => OrderSort::TotalAsc,
            "total_desc" => OrderSort::TotalDesc,
            "date_asc" => OrderSort::DateAsc,
            "date_desc" => OrderSort::DateDesc,
            _ => OrderSort::IdDesc,
        }
    }

    /// Get SQL ORDER BY clause.
    pub fn to_sql(&self) -> &'static str {
        match self {
            OrderSort::IdAsc => "o.id ASC",
            OrderSort::IdDesc => "o.id DESC",
            OrderSort::TotalAsc => "o.total_cents ASC, o.id ASC",
            OrderSort::TotalDesc => "o.total_cents DESC, o.id DESC",
            OrderSort::DateAsc => "o.created_at ASC, o.id ASC",
            OrderSort::DateDesc => "o.created_at DESC, o.id DESC",
        }
    }
}

/// Raw listing parameters as they arrive from a query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub sort: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// An admin order listing query. Parts combine with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    /// Username substring, or an exact order id when numeric.
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    /// First day included (UTC).
    pub date_from: Option<NaiveDate>,
    /// Last day included (UTC).
    pub date_to: Option<NaiveDate>,
    pub sort: OrderSort,
}

impl OrderQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_string());
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn with_sort(mut self, sort: OrderSort) -> Self {
        self.sort = sort;
        self
    }

    /// Build the WHERE and ORDER BY tail for a query over `orders o LEFT JOIN users u`.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::new();
        let mut params = Vec::new();

        if let Some(search) = &self.search {
            match search.parse::<i64>() {
                Ok(id) => {
                    conditions.push("(u.username LIKE ? ESCAPE '\\' OR o.id = ?)".to_string());
                    params.push(Value::Text(like_pattern(search)));
                    params.push(Value::Integer(id));
                }
                Err(_) => {
                    conditions.push("u.username LIKE ? ESCAPE '\\'".to_string());
                    params.push(Value::Text(like_pattern(search)));
                }
            }
        }
        if let Some(status) = self.status {
            conditions.push("o.status = ?".to_string());
            params.push(Value::from(status.as_str()));
        }
        if let Some(from) = self.date_from {
            conditions.push("o.created_at >= ?".to_string());
            params.push(Value::Integer(day_start(from)));
        }
        if let Some(to) = self.date_to.and_then(|d| d.checked_add_days(Days::new(1))) {
            conditions.push("o.created_at < ?".to_string());
            params.push(Value::Integer(day_start(to)));
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

impl From<OrderParams> for OrderQuery {
    fn from(params: OrderParams) -> Self {
        let mut query = OrderQuery::new();
        if let Some(search) = params.search {
            query = query.with_search(search);
        }
        query.status = params.status.as_deref().and_then(OrderStatus::parse);
        query.date_from = params.date_from.as_deref().and_then(parse_day);
        query.date_to = params.date_to.as_deref().and_then(parse_day);
        query.sort = params
            .sort
            .as_deref()
            .map(OrderSort::parse)
            .unwrap_or_default();
        query
    }
}

/// Parse `YYYY-MM-DD`. Anything else is treated as no bound.
pub fn parse_day(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Unix timestamp of midnight UTC at the start of `day`.
fn day_start(day: NaiveDate) -> i64 {
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_day(s).unwrap()
    }

    #[test]
    fn test_default_query() {
        let (sql, params) = OrderQuery::new().to_sql();
        assert_eq!(sql, " ORDER BY o.id DESC");
        assert!(params.is_empty());
    }

    #[test]
    fn test_numeric_search_matches_id() {
        let (sql, params) = OrderQuery::new().with_search("42").to_sql();
        assert!(sql.contains("OR o.id = ?"));
        assert_eq!(
            params,
            vec![Value::Text("%42%".into()), Value::Integer(42)]
        );
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let query = OrderQuery::new().with_dates(Some(day("2024-01-01")), Some(day("2024-01-31")));
        let (sql, params) = query.to_sql();
        assert!(sql.contains("o.created_at >= ?"));
        assert!(sql.contains("o.created_at < ?"));
        // 2024-01-01T00:00:00Z and 2024-02-01T00:00:00Z
        assert_eq!(
            params,
            vec![Value::Integer(1_704_067_200), Value::Integer(1_706_745_600)]
        );
    }

    #[test]
    fn test_from_params_ignores_garbage() {
        let query = OrderQuery::from(OrderParams {
            search: Some("".into()),
            status: Some("lost".into()),
            sort: Some("total_desc".into()),
            date_from: Some("01/02/2024".into()),
            date_to: Some("2024-03-05".into()),
        });
        assert_eq!(query.search, None);
        assert_eq!(query.status, None);
        assert_eq!(query.date_from, None);
        assert_eq!(query.date_to, Some(day("2024-03-05")));
        assert_eq!(query.sort, OrderSort::TotalDesc);
    }
}
