use crate::types::ScalarType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a stored-procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    In,
    InOut,
    Out,
}

impl ParamKind {
    /// Whether the caller supplies a value for this parameter.
    pub fn is_input(&self) -> bool {
        matches!(self, ParamKind::In | ParamKind::InOut)
    }

    /// Whether the data source hands a value back for this parameter.
    pub fn is_output(&self) -> bool {
        matches!(self, ParamKind::Out | ParamKind::InOut)
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ParamKind::In => "IN",
            ParamKind::InOut => "INOUT",
            ParamKind::Out => "OUT",
        };
        f.write_str(label)
    }
}

/// SQL type tag of a declared procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlType {
    Boolean,
    Integer,
    BigInt,
    Double,
    Numeric,
    Varchar,
    Timestamp,
    Date,
    Time,
    Uuid,
    Json,
}

impl SqlType {
    /// The PostgreSQL type name used when declaring the parameter.
    pub fn pg_name(&self) -> &'static str {
        match self {
            SqlType::Boolean => "boolean",
            SqlType::Integer => "integer",
            SqlType::BigInt => "bigint",
            SqlType::Double => "double precision",
            SqlType::Numeric => "numeric",
            SqlType::Varchar => "varchar",
            SqlType::Timestamp => "timestamptz",
            SqlType::Date => "date",
            SqlType::Time => "time",
            SqlType::Uuid => "uuid",
            SqlType::Json => "jsonb",
        }
    }

    /// The scalar kind values of this SQL type are carried as.
    pub fn scalar(&self) -> ScalarType {
        match self {
            SqlType::Boolean => ScalarType::Bool,
            SqlType::Integer => ScalarType::Int,
            SqlType::BigInt => ScalarType::Long,
            SqlType::Double => ScalarType::Double,
            SqlType::Numeric => ScalarType::Decimal,
            SqlType::Varchar => ScalarType::Text,
            SqlType::Timestamp | SqlType::Date | SqlType::Time => ScalarType::Timestamp,
            SqlType::Uuid => ScalarType::Uuid,
            SqlType::Json => ScalarType::Json,
        }
    }
}

/// How a timestamp argument is bound: as a date, a time of day, or a full timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalKind {
    Date,
    Time,
    Timestamp,
}

/// Which transactional demarcation a unit of work asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demarcation {
    ReadOnly,
    ReadWrite,
}
