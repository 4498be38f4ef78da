//! Contracts of the external collaborators the engine calls into.

use crate::enums::{Demarcation, ParamKind, TemporalKind};
use crate::error::{DataAccessError, DispatchError};
use crate::param::ParamDescriptor;
use crate::value::{Row, Value};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;

/// Where the text of a query comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryText {
    /// Literal query text written at the declaration site.
    Literal(String),
    /// Identifier of a query the data source knows by name.
    Named(String),
}

impl fmt::Display for QueryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryText::Literal(text) => write!(f, "{text}"),
            QueryText::Named(name) => write!(f, "named:{name}"),
        }
    }
}

/// Where a bound value goes in the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placeholder {
    Named(String),
    /// 1-based position.
    Positional(usize),
}

/// A value bound to a query placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub placeholder: Placeholder,
    pub value: Value,
    pub temporal: Option<TemporalKind>,
}

/// A fully resolved query, ready for the data source.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    /// The dispatched method, kept for diagnostics.
    pub method: String,
    pub text: QueryText,
    pub native: bool,
    pub bindings: Vec<Binding>,
    pub first_result: Option<u32>,
    pub max_results: Option<u32>,
    pub cacheable: bool,
}

impl PreparedQuery {
    pub fn new(method: impl Into<String>, text: QueryText) -> Self {
        Self {
            method: method.into(),
            text,
            native: false,
            bindings: Vec::new(),
            first_result: None,
            max_results: None,
            cacheable: false,
        }
    }
}

/// A stored procedure or function with its parameters in call order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcedureDeclaration {
    pub name: String,
    pub function: bool,
    pub parameters: Vec<ParamDescriptor>,
}

impl ProcedureDeclaration {
    pub fn inputs(&self) -> impl Iterator<Item = &ParamDescriptor> {
        self.parameters.iter().filter(|p| p.kind.is_input())
    }

    pub fn outputs(&self) -> impl Iterator<Item = &ParamDescriptor> {
        self.parameters.iter().filter(|p| p.kind.is_output())
    }

    pub fn count(&self, kind: ParamKind) -> usize {
        self.parameters.iter().filter(|p| p.kind == kind).count()
    }
}

/// A prepared, reusable procedure invocation bound to one data source.
#[derive(Debug, PartialEq, Eq)]
pub struct CompiledProcedure {
    declaration: ProcedureDeclaration,
    statement: String,
}

impl CompiledProcedure {
    pub fn new(declaration: ProcedureDeclaration, statement: impl Into<String>) -> Self {
        Self {
            declaration,
            statement: statement.into(),
        }
    }

    pub fn declaration(&self) -> &ProcedureDeclaration {
        &self.declaration
    }

    /// The driver-level statement the data source prepared.
    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.declaration
            .parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// The data-access session the engine executes against.
#[async_trait]
pub trait DataAccessSession: Send + Sync {
    /// Runs a query and returns its rows.
    async fn fetch(&self, query: &PreparedQuery) -> Result<Vec<Row>, DataAccessError>;

    /// Runs a data-modifying statement and returns the number of affected rows.
    async fn execute_update(&self, query: &PreparedQuery) -> Result<u64, DataAccessError>;

    /// Declares the parameters of a procedure call and prepares it.
    async fn prepare(
        &self,
        declaration: ProcedureDeclaration,
    ) -> Result<CompiledProcedure, DataAccessError>;

    /// Calls a compiled procedure. `inputs` hold the IN/INOUT values in
    /// declaration order; the returned row holds the OUT/INOUT values by name.
    async fn call(
        &self,
        procedure: &CompiledProcedure,
        inputs: &[(String, Value)],
    ) -> Result<Row, DataAccessError>;
}

/// A unit of work handed to a transactional boundary.
pub type UnitOfWork<'a> = BoxFuture<'a, Result<Value, DispatchError>>;

/// Runs units of work inside a transactional demarcation.
#[async_trait]
pub trait TransactionalBoundary: Send + Sync {
    /// The demarcation this boundary applies.
    fn demarcation(&self) -> Demarcation;

    async fn run<'a>(&'a self, work: UnitOfWork<'a>) -> Result<Value, DispatchError>;
}
