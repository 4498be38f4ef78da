use crate::enums::{ParamKind, SqlType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Extra typing information some drivers need for a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeHint {
    /// A user-defined or driver-specific type name.
    TypeName(String),
    /// Decimal scale for numeric parameters.
    Scale(u32),
}

/// A named, typed, optionally indexed stored-procedure parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamDescriptor {
    pub name: String,
    pub kind: ParamKind,
    pub sql_type: SqlType,
    /// Position in the call, when declared. Absent means "let the compiler decide".
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub type_hint: Option<TypeHint>,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, kind: ParamKind, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            kind,
            sql_type,
            index: None,
            type_hint: None,
        }
    }

    pub fn input(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self::new(name, ParamKind::In, sql_type)
    }

    pub fn in_out(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self::new(name, ParamKind::InOut, sql_type)
    }

    pub fn output(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self::new(name, ParamKind::Out, sql_type)
    }

    pub fn at(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn hinted(mut self, hint: TypeHint) -> Self {
        self.type_hint = Some(hint);
        self
    }
}

impl fmt::Display for ParamDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.kind, self.name, self.sql_type.pg_name())?;
        if let Some(index) = self.index {
            write!(f, " @{index}")?;
        }
        Ok(())
    }
}
