use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scalar kinds a declared type or a runtime value can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Bool,
    Int,
    Long,
    Double,
    Decimal,
    Text,
    Timestamp,
    Uuid,
    Json,
}

impl ScalarType {
    /// The notation used for registry keys and manifests.
    pub fn key(&self) -> &'static str {
        match self {
            ScalarType::Bool => "bool",
            ScalarType::Int => "i32",
            ScalarType::Long => "i64",
            ScalarType::Double => "f64",
            ScalarType::Decimal => "Decimal",
            ScalarType::Text => "String",
            ScalarType::Timestamp => "DateTime",
            ScalarType::Uuid => "Uuid",
            ScalarType::Json => "Json",
        }
    }

    pub const ALL: [ScalarType; 9] = [
        ScalarType::Bool,
        ScalarType::Int,
        ScalarType::Long,
        ScalarType::Double,
        ScalarType::Decimal,
        ScalarType::Text,
        ScalarType::Timestamp,
        ScalarType::Uuid,
        ScalarType::Json,
    ];

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

/// The declared return type of a data-access method.
///
/// `Scalar` is the non-nullable form: a null result can never be handed back
/// for it. Every other form except `Void` accepts null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Void,
    Scalar(ScalarType),
    Nullable(ScalarType),
    Entity(String),
    List(Box<TypeRef>),
    Any,
}

impl TypeRef {
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    pub fn is_nullable(&self) -> bool {
        !matches!(self, TypeRef::Void | TypeRef::Scalar(_))
    }

    /// The scalar kind behind a scalar or nullable scalar type.
    pub fn scalar(&self) -> Option<ScalarType> {
        match self {
            TypeRef::Scalar(kind) | TypeRef::Nullable(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Canonical registry key, e.g. `i64`, `Option<bool>`, `Vec<User>`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => write!(f, "()"),
            TypeRef::Scalar(kind) => write!(f, "{}", kind.key()),
            TypeRef::Nullable(kind) => write!(f, "Option<{}>", kind.key()),
            TypeRef::Entity(name) => write!(f, "{name}"),
            TypeRef::List(element) => write!(f, "Vec<{element}>"),
            TypeRef::Any => write!(f, "Value"),
        }
    }
}

impl FromStr for TypeRef {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == "()" || s.eq_ignore_ascii_case("void") {
            return Ok(TypeRef::Void);
        }
        if s == "Value" {
            return Ok(TypeRef::Any);
        }
        if let Some(inner) = strip_generic(s, "Option") {
            let kind = ScalarType::from_key(inner)
                .ok_or_else(|| CoreError::InvalidType(s.to_string()))?;
            return Ok(TypeRef::Nullable(kind));
        }
        if let Some(inner) = strip_generic(s, "Vec") {
            return Ok(TypeRef::List(Box::new(inner.parse()?)));
        }
        if let Some(kind) = ScalarType::from_key(s) {
            return Ok(TypeRef::Scalar(kind));
        }
        if s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == ':') {
            return Ok(TypeRef::Entity(s.to_string()));
        }
        Err(CoreError::InvalidType(s.to_string()))
    }
}

fn strip_generic<'a>(s: &'a str, wrapper: &str) -> Option<&'a str> {
    s.strip_prefix(wrapper)?
        .trim_start()
        .strip_prefix('<')?
        .strip_suffix('>')
        .map(str::trim)
}
