use crate::error::CoreError;
use crate::types::{ScalarType, TypeRef};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

/// A runtime value flowing into a query as a binding or out of it as a result.
///
/// The engine never inspects host-language types; whatever the interception
/// layer captured is carried as a `Value`, and whatever the data source returns
/// comes back as one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(f64),
    Decimal(Decimal),
    Text(String),
    Timestamp(DateTime<Utc>),
    Uuid(Uuid),
    Json(JsonValue),
    Row(Row),
    List(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The scalar kind of this value, if it is a scalar.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Value::Bool(_) => Some(ScalarType::Bool),
            Value::Int(_) => Some(ScalarType::Int),
            Value::Long(_) => Some(ScalarType::Long),
            Value::Double(_) => Some(ScalarType::Double),
            Value::Decimal(_) => Some(ScalarType::Decimal),
            Value::Text(_) => Some(ScalarType::Text),
            Value::Timestamp(_) => Some(ScalarType::Timestamp),
            Value::Uuid(_) => Some(ScalarType::Uuid),
            Value::Json(_) => Some(ScalarType::Json),
            Value::Null | Value::Row(_) | Value::List(_) => None,
        }
    }

    /// A short name of the runtime type, used in diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Row(row) => match row.entity() {
                Some(entity) => entity.to_string(),
                None => "row".to_string(),
            },
            Value::List(_) => "list".to_string(),
            other => other
                .scalar_type()
                .map(|s| s.key().to_string())
                .unwrap_or_default(),
        }
    }

    /// Whether this value can be handed back as-is for the declared type.
    ///
    /// Null is assignable to every nullable type. Untagged rows conform to any
    /// entity type; rows tagged with an entity name only conform to that entity.
    pub fn is_assignable_to(&self, declared: &TypeRef) -> bool {
        match (self, declared) {
            (_, TypeRef::Any) => true,
            (_, TypeRef::Void) => false,
            (Value::Null, ty) => ty.is_nullable(),
            (Value::Row(row), TypeRef::Entity(name)) => {
                row.entity().is_none_or(|entity| entity == name)
            }
            (Value::List(items), TypeRef::List(element)) => {
                items.iter().all(|item| item.is_assignable_to(element))
            }
            (value, TypeRef::Scalar(kind) | TypeRef::Nullable(kind)) => {
                value.scalar_type() == Some(*kind)
            }
            _ => false,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            Value::Decimal(d) if d.fract().is_zero() => i64::try_from(*d).ok(),
            Value::Double(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(f64::from(*v)),
            Value::Long(v) => Some(*v as f64),
            Value::Double(v) => Some(*v),
            Value::Decimal(d) => f64::try_from(*d).ok(),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Reads a textual argument as a value of the given scalar kind.
    ///
    /// The literal `null` (any case) reads as [`Value::Null`] for every kind.
    pub fn parse(text: &str, kind: ScalarType) -> Result<Value, CoreError> {
        let trimmed = text.trim();
        if trimmed.eq_ignore_ascii_case("null") {
            return Ok(Value::Null);
        }
        let invalid = || CoreError::InvalidValue {
            input: text.to_string(),
            expected: kind.key().to_string(),
        };
        let value = match kind {
            ScalarType::Bool => Value::Bool(trimmed.parse().map_err(|_| invalid())?),
            ScalarType::Int => Value::Int(trimmed.parse().map_err(|_| invalid())?),
            ScalarType::Long => Value::Long(trimmed.parse().map_err(|_| invalid())?),
            ScalarType::Double => Value::Double(trimmed.parse().map_err(|_| invalid())?),
            ScalarType::Decimal => Value::Decimal(trimmed.parse().map_err(|_| invalid())?),
            ScalarType::Text => Value::Text(text.to_string()),
            ScalarType::Timestamp => Value::Timestamp(parse_timestamp(trimmed).ok_or_else(invalid)?),
            ScalarType::Uuid => Value::Uuid(trimmed.parse().map_err(|_| invalid())?),
            ScalarType::Json => Value::Json(serde_json::from_str(trimmed).map_err(|_| invalid())?),
        };
        Ok(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "{v}"),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Json(v) => write!(f, "{v}"),
            Value::Row(row) => {
                write!(f, "{{")?;
                for (i, (column, value)) in row.columns().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{column}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<Row> for Value {
    fn from(v: Row) -> Self {
        Value::Row(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Accepts RFC 3339, a naive `YYYY-MM-DD HH:MM:SS` (read as UTC) or a bare date.
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// A single result row: ordered named columns, optionally tagged with the
/// entity it was materialized as.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    entity: Option<String>,
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_entity(entity: impl Into<String>) -> Self {
        Self {
            entity: Some(entity.into()),
            columns: Vec::new(),
        }
    }

    /// Appends a column, builder style.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(column, value);
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    pub fn columns(&self) -> &[(String, Value)] {
        &self.columns
    }

    /// Looks a column up by name, case-insensitively since SQL identifiers fold.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    pub fn first(&self) -> Option<&Value> {
        self.columns.first().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_columns(self) -> Vec<(String, Value)> {
        self.columns
    }
}
