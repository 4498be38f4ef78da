//! Method declarations read from a TOML manifest.
//!
//! A manifest stands in for the interception layer: it declares the methods
//! a caller may dispatch, with the same attributes an annotated method would
//! carry, plus the named queries those methods refer to.
//!
//! ```toml
//! [[queries]]
//! name = "UserDao.getByUsername"
//! sql = "SELECT * FROM users WHERE username = :username"
//!
//! [[methods]]
//! declaring_type = "UserDao"
//! name = "getByUsername"
//! returns = "User"
//! read_only = true
//! arguments = [{ name = "username", type = "String" }]
//! ```

use crate::error::EngineError;
use crate::registries::Registries;
use config::{Config as ConfigBuilder, File, FileFormat};
use core_types::{
    DispatchError, ParamDescriptor, ParamKind, SqlType, TemporalKind, TypeHint, TypeRef, Value,
};
use descriptor::{
    Attribute, MethodDescriptor, PLACEHOLDER, ParamAttribute, Strategy, StrategyRef,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use strategies::StrategyRegistry;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub queries: Vec<NamedQuery>,
    #[serde(default)]
    pub methods: Vec<MethodSpec>,
}

/// A query the data source knows by name.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedQuery {
    pub name: String,
    pub sql: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodSpec {
    pub declaring_type: String,
    pub name: String,
    /// Return type notation, e.g. `i64`, `Option<String>`, `Vec<User>`.
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub query_name: Option<String>,
    #[serde(default)]
    pub native: bool,
    #[serde(default)]
    pub executor: Option<String>,
    #[serde(default)]
    pub generator: Option<String>,
    #[serde(default)]
    pub converter: Option<String>,
    #[serde(default)]
    pub validator: Option<String>,
    #[serde(default)]
    pub first_result: Option<u32>,
    #[serde(default)]
    pub max_results: Option<u32>,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub caching: bool,
    #[serde(default)]
    pub procedure: Option<String>,
    #[serde(default)]
    pub function: bool,
    #[serde(default)]
    pub return_param: Option<String>,
    /// Parameters declared on the method rather than on an argument.
    #[serde(default)]
    pub parameters: Vec<ParamDescriptor>,
    #[serde(default)]
    pub arguments: Vec<ArgumentSpec>,
}

/// What an argument is for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentRole {
    /// Bound to the query or procedure parameter of the same name.
    #[default]
    Named,
    /// Bound by position.
    Positional,
    /// Declares an IN procedure parameter.
    In,
    /// Declares an INOUT procedure parameter.
    InOut,
    /// Declares an OUT procedure parameter.
    Out,
    FirstResult,
    MaxResults,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArgumentSpec {
    pub name: String,
    /// Scalar notation the command-line value is parsed as.
    #[serde(rename = "type", default = "text_type")]
    pub value_type: String,
    #[serde(default)]
    pub role: ArgumentRole,
    #[serde(default)]
    pub sql_type: Option<SqlType>,
    #[serde(default)]
    pub index: Option<u32>,
    #[serde(default)]
    pub type_hint: Option<TypeHint>,
    #[serde(default)]
    pub temporal: Option<TemporalKind>,
    /// Used when the caller supplies no value.
    #[serde(default)]
    pub default: Option<String>,
}

fn text_type() -> String {
    "String".to_string()
}

impl Manifest {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let manifest: Manifest = ConfigBuilder::builder()
            .add_source(File::from(path.as_ref()).format(FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        tracing::info!(
            path = %path.as_ref().display(),
            methods = manifest.methods.len(),
            queries = manifest.queries.len(),
            "Method manifest loaded"
        );
        Ok(manifest)
    }

    pub fn parse(toml: &str) -> Result<Self, EngineError> {
        Ok(ConfigBuilder::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize()?)
    }

    /// The named queries as a name-to-SQL map. A later duplicate replaces an
    /// earlier one.
    pub fn named_queries(&self) -> BTreeMap<String, String> {
        self.queries
            .iter()
            .map(|q| (q.name.clone(), q.sql.clone()))
            .collect()
    }

    /// Finds a method by `name`, `Type.name` or `Type::name`.
    pub fn method(&self, reference: &str) -> Result<&MethodSpec, EngineError> {
        let qualified = reference
            .split_once("::")
            .or_else(|| reference.rsplit_once('.'));
        self.methods
            .iter()
            .find(|m| match qualified {
                Some((declaring, name)) => m.declaring_type == declaring && m.name == name,
                None => m.name == reference,
            })
            .ok_or_else(|| EngineError::UnknownMethod(reference.to_string()))
    }
}

impl MethodSpec {
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.declaring_type, self.name)
    }

    pub fn is_procedure(&self) -> bool {
        self.procedure.is_some()
    }

    /// Builds the descriptor of one call, reading argument values from
    /// `values` (by argument name) and resolving strategy names in
    /// `registries`.
    pub fn describe(
        &self,
        registries: &Registries,
        values: &HashMap<String, String>,
    ) -> Result<MethodDescriptor, EngineError> {
        let returns = match &self.returns {
            Some(notation) => notation.parse::<TypeRef>().map_err(|e| {
                EngineError::Manifest(format!("{}: {e}", self.qualified_name()))
            })?,
            None => TypeRef::Void,
        };
        let mut builder = MethodDescriptor::builder(&self.declaring_type, &self.name).returns(returns);

        let text_attributes = [
            self.query.clone().map(Attribute::Query),
            self.query_name.clone().map(Attribute::QueryName),
            self.procedure.clone().map(Attribute::StoredProcedure),
            self.return_param.clone().map(Attribute::ReturnParamName),
            self.first_result.map(Attribute::FirstResult),
            self.max_results.map(Attribute::MaxResults),
        ];
        for attribute in text_attributes.into_iter().flatten() {
            builder = builder.attribute(attribute);
        }
        builder = builder
            .attribute(Attribute::NativeQuery(self.native))
            .attribute(Attribute::ReadOnly(self.read_only))
            .attribute(Attribute::CachingEnabled(self.caching))
            .attribute(Attribute::Function(self.function))
            .attribute(Attribute::QueryExecutor(self.strategy(&registries.executors, &self.executor)?))
            .attribute(Attribute::QueryGenerator(self.strategy(&registries.generators, &self.generator)?))
            .attribute(Attribute::ResultConverter(self.strategy(&registries.converters, &self.converter)?))
            .attribute(Attribute::ResultValidator(self.strategy(&registries.validators, &self.validator)?));
        if !self.parameters.is_empty() {
            builder = builder.attribute(Attribute::Parameters(self.parameters.clone()));
        }

        for argument in &self.arguments {
            let value = argument.value(values.get(&argument.name).map(String::as_str))?;
            builder = builder.argument(value, argument.attributes(&self.qualified_name())?);
        }
        Ok(builder.build())
    }

    /// The placeholder for an absent name, otherwise the named registry entry.
    fn strategy<S: ?Sized>(
        &self,
        registry: &StrategyRegistry<S>,
        name: &Option<String>,
    ) -> Result<StrategyRef<S>, EngineError> {
        match name.as_deref() {
            None | Some(PLACEHOLDER) => Ok(StrategyRef::Placeholder),
            Some(name) => registry
                .named(name)
                .map(|s: &Strategy<S>| StrategyRef::Explicit(s.clone()))
                .ok_or_else(|| {
                    DispatchError::not_found(self.qualified_name(), registry.kind(), name).into()
                }),
        }
    }
}

impl ArgumentSpec {
    fn value(&self, supplied: Option<&str>) -> Result<Value, EngineError> {
        if self.role == ArgumentRole::Out {
            return Ok(Value::Null);
        }
        let Some(text) = supplied.or(self.default.as_deref()) else {
            return Ok(Value::Null);
        };
        let declared: TypeRef = self.value_type.parse().map_err(|source| EngineError::Argument {
            name: self.name.clone(),
            source,
        })?;
        let Some(kind) = declared.scalar() else {
            return Err(EngineError::Manifest(format!(
                "argument '{}' must have a scalar type, not {declared}",
                self.name
            )));
        };
        Value::parse(text, kind).map_err(|source| EngineError::Argument {
            name: self.name.clone(),
            source,
        })
    }

    fn attributes(&self, method: &str) -> Result<Vec<ParamAttribute>, EngineError> {
        let parameter = |kind: ParamKind| -> Result<ParamAttribute, EngineError> {
            let sql_type = self.sql_type.ok_or_else(|| {
                EngineError::Manifest(format!(
                    "{method}: procedure argument '{}' needs a sql_type",
                    self.name
                ))
            })?;
            let mut descriptor = ParamDescriptor::new(&self.name, kind, sql_type);
            descriptor.index = self.index;
            descriptor.type_hint = self.type_hint.clone();
            Ok(ParamAttribute::Parameter(descriptor))
        };
        let mut attributes = match self.role {
            ArgumentRole::Named => vec![ParamAttribute::Named(self.name.clone())],
            ArgumentRole::Positional => Vec::new(),
            ArgumentRole::In => vec![parameter(ParamKind::In)?],
            ArgumentRole::InOut => vec![parameter(ParamKind::InOut)?],
            ArgumentRole::Out => vec![parameter(ParamKind::Out)?],
            ArgumentRole::FirstResult => vec![ParamAttribute::FirstResult],
            ArgumentRole::MaxResults => vec![ParamAttribute::MaxResults],
        };
        if let Some(kind) = self.temporal {
            attributes.push(ParamAttribute::Temporal(kind));
        }
        Ok(attributes)
    }
}
