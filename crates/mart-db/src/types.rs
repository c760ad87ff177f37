//! Bind parameters and decoded rows.

use crate::DbError;
use base64::Engine;
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use std::sync::Arc;

/// An SQLite value, by storage class.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Read cell `index`, dispatching on the storage class SQLite reports
    /// for that cell rather than the declared column type.
    fn read(row: &SqliteRow, index: usize) -> Result<Self, DbError> {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        let class = raw.type_info().name().to_ascii_uppercase();
        Ok(match class.as_str() {
            "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get(index)?),
            "REAL" | "NUMERIC" => Value::Real(row.try_get(index)?),
            "BLOB" => Value::Blob(row.try_get(index)?),
            _ => Value::Text(row.try_get(index)?),
        })
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Real(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// JSON form used for row deserialization. Non-UTF-8 blobs become
    /// base64 text; non-finite reals become null.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Integer(i) => Json::from(*i),
            Value::Real(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::Text(s) => Json::String(s.clone()),
            Value::Blob(b) => Json::String(match std::str::from_utf8(b) {
                Ok(text) => text.to_string(),
                Err(_) => base64::engine::general_purpose::STANDARD.encode(b),
            }),
        }
    }
}

macro_rules! integer_value {
    ($($ty:ty),+) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::Integer(i64::from(v))
            }
        })+
    };
}

integer_value!(i32, i64, u32, bool);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One decoded row. Rows of the same result share their column names.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: impl Into<Arc<[String]>>, values: Vec<Value>) -> Self {
        Self {
            columns: columns.into(),
            values,
        }
    }

    pub(crate) fn read(row: &SqliteRow) -> Result<Self, DbError> {
        Self::read_with(row, column_names(row))
    }

    fn read_with(row: &SqliteRow, columns: Arc<[String]>) -> Result<Self, DbError> {
        let values = (0..columns.len())
            .map(|index| Value::read(row, index))
            .collect::<Result<_, _>>()?;
        Ok(Self { columns, values })
    }

    /// Value of the named column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.values.get(index)
    }

    /// Value of the first column.
    pub fn first(&self) -> Option<&Value> {
        self.values.first()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Deserialize the row as a JSON object keyed by column name.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        let object = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(column, value)| (column.clone(), value.to_json()))
            .collect::<serde_json::Map<_, _>>();
        serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| DbError::DeserializeError(e.to_string()))
    }
}

fn column_names(row: &SqliteRow) -> Arc<[String]> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

/// Every row a query returned.
#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub rows: Vec<Row>,
}

impl QueryResult {
    pub(crate) fn read(rows: &[SqliteRow]) -> Result<Self, DbError> {
        let Some(first) = rows.first() else {
            return Ok(Self::default());
        };
        let columns = column_names(first);
        let rows = rows
            .iter()
            .map(|row| Row::read_with(row, Arc::clone(&columns)))
            .collect::<Result<_, _>>()?;
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// First column of the first row as an integer. No rows, NULL (such
    /// as `SUM` over nothing) and non-numeric text all read as zero.
    pub fn scalar_i64(&self) -> i64 {
        self.first()
            .and_then(Row::first)
            .and_then(Value::as_integer)
            .unwrap_or(0)
    }

    pub fn deserialize_all<T: DeserializeOwned>(&self) -> Result<Vec<T>, DbError> {
        self.rows.iter().map(Row::deserialize).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct ProductRow {
        id: i64,
        name: String,
        image: Option<String>,
    }

    fn product_row(image: Value) -> Row {
        Row::new(
            vec!["id".to_string(), "name".to_string(), "image".to_string()],
            vec![Value::Integer(7), Value::Text("Milk".into()), image],
        )
    }

    #[test]
    fn test_row_deserialize() {
        let product: ProductRow = product_row(Value::Text("milk.png".into()))
            .deserialize()
            .unwrap();
        assert_eq!(
            product,
            ProductRow {
                id: 7,
                name: "Milk".into(),
                image: Some("milk.png".into()),
            }
        );

        let product: ProductRow = product_row(Value::Null).deserialize().unwrap();
        assert!(product.image.is_none());
    }

    #[test]
    fn test_row_lookup() {
        let row = product_row(Value::Null);
        assert_eq!(row.get("id").and_then(Value::as_integer), Some(7));
        assert_eq!(row.get("name").and_then(Value::as_text), Some("Milk"));
        assert!(row.get("image").is_some_and(Value::is_null));
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_scalar_defaults_to_zero() {
        assert_eq!(QueryResult::default().scalar_i64(), 0);

        let sum = QueryResult {
            rows: vec![Row::new(vec!["total".to_string()], vec![Value::Null])],
        };
        assert_eq!(sum.scalar_i64(), 0);

        let count = QueryResult {
            rows: vec![Row::new(vec!["n".to_string()], vec![Value::Integer(3)])],
        };
        assert_eq!(count.scalar_i64(), 3);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
        assert_eq!(Value::from(true), Value::Integer(1));
        assert_eq!(Value::from(5u32), Value::Integer(5));
    }

    #[test]
    fn test_blob_json() {
        assert_eq!(Value::Blob(b"abc".to_vec()).to_json(), "abc");
        assert_eq!(Value::Blob(vec![0xff, 0xfe]).to_json(), "//4=");
        assert_eq!(Value::Real(f64::NAN).to_json(), serde_json::Value::Null);
    }
}
