use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;
use uuid::Uuid;

/// A dynamically typed statement parameter.
///
/// Statements arrive at the facade as text, so parameter types are not known
/// at compile time. This covers the value types the pool's driver features
/// can bind.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl SqlValue {
    /// Append this value to a query's argument list.
    pub(crate) fn bind_to<'q>(
        &self,
        query: Query<'q, Postgres, PgArguments>,
    ) -> Query<'q, Postgres, PgArguments> {
        match self {
            SqlValue::Null => query.bind(Option::<String>::None),
            SqlValue::Bool(value) => query.bind(*value),
            SqlValue::Int(value) => query.bind(*value),
            SqlValue::Float(value) => query.bind(*value),
            SqlValue::Text(value) => query.bind(value.clone()),
            SqlValue::Uuid(value) => query.bind(*value),
            SqlValue::Timestamp(value) => query.bind(*value),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value.into())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<Uuid> for SqlValue {
    fn from(value: Uuid) -> Self {
        SqlValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

impl<T> From<Option<T>> for SqlValue
where
    T: Into<SqlValue>,
{
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_primitives() {
        assert_eq!(SqlValue::from(true), SqlValue::Bool(true));
        assert_eq!(SqlValue::from(42i32), SqlValue::Int(42));
        assert_eq!(SqlValue::from(42i64), SqlValue::Int(42));
        assert_eq!(SqlValue::from(1.5f64), SqlValue::Float(1.5));
        assert_eq!(
            SqlValue::from("hello"),
            SqlValue::Text("hello".to_string())
        );
    }

    #[test]
    fn absent_optionals_become_null() {
        assert_eq!(SqlValue::from(Option::<i64>::None), SqlValue::Null);
        assert_eq!(SqlValue::from(Some(7i64)), SqlValue::Int(7));
    }

    #[test]
    fn converts_uuid_and_timestamp() {
        let id = Uuid::new_v4();
        assert_eq!(SqlValue::from(id), SqlValue::Uuid(id));

        let now = Utc::now();
        assert_eq!(SqlValue::from(now), SqlValue::Timestamp(now));
    }
}
