use crate::strategy::{QueryExecutor, QueryGenerator, ResultConverter, ResultValidator, StrategyRef};
use core_types::{ParamDescriptor, TemporalKind};

/// A declarative attribute attached to a data-access method.
#[derive(Debug, Clone)]
pub enum Attribute {
    /// Literal query text. Empty text means "derive it".
    Query(String),
    QueryName(String),
    NativeQuery(bool),
    QueryExecutor(StrategyRef<dyn QueryExecutor>),
    QueryGenerator(StrategyRef<dyn QueryGenerator>),
    ResultConverter(StrategyRef<dyn ResultConverter>),
    ResultValidator(StrategyRef<dyn ResultValidator>),
    FirstResult(u32),
    MaxResults(u32),
    CachingEnabled(bool),
    Function(bool),
    ReturnParamName(String),
    ReadOnly(bool),
    /// Identifier of the stored procedure or function to call.
    StoredProcedure(String),
    /// A single IN/INOUT/OUT parameter declared on the method.
    Parameter(ParamDescriptor),
    /// A grouped list of parameters declared on the method.
    Parameters(Vec<ParamDescriptor>),
}

/// The kind of an [`Attribute`], used for lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Query,
    QueryName,
    NativeQuery,
    QueryExecutor,
    QueryGenerator,
    ResultConverter,
    ResultValidator,
    FirstResult,
    MaxResults,
    CachingEnabled,
    Function,
    ReturnParamName,
    ReadOnly,
    StoredProcedure,
    Parameter,
    Parameters,
}

impl Attribute {
    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::Query(_) => AttributeKind::Query,
            Attribute::QueryName(_) => AttributeKind::QueryName,
            Attribute::NativeQuery(_) => AttributeKind::NativeQuery,
            Attribute::QueryExecutor(_) => AttributeKind::QueryExecutor,
            Attribute::QueryGenerator(_) => AttributeKind::QueryGenerator,
            Attribute::ResultConverter(_) => AttributeKind::ResultConverter,
            Attribute::ResultValidator(_) => AttributeKind::ResultValidator,
            Attribute::FirstResult(_) => AttributeKind::FirstResult,
            Attribute::MaxResults(_) => AttributeKind::MaxResults,
            Attribute::CachingEnabled(_) => AttributeKind::CachingEnabled,
            Attribute::Function(_) => AttributeKind::Function,
            Attribute::ReturnParamName(_) => AttributeKind::ReturnParamName,
            Attribute::ReadOnly(_) => AttributeKind::ReadOnly,
            Attribute::StoredProcedure(_) => AttributeKind::StoredProcedure,
            Attribute::Parameter(_) => AttributeKind::Parameter,
            Attribute::Parameters(_) => AttributeKind::Parameters,
        }
    }
}

/// A declarative attribute attached to one method argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamAttribute {
    /// Binds the argument to a named query/procedure parameter.
    Named(String),
    /// Declares the argument as an IN/INOUT/OUT procedure parameter.
    Parameter(ParamDescriptor),
    Temporal(TemporalKind),
    /// The argument carries the first-result offset.
    FirstResult,
    /// The argument carries the page size.
    MaxResults,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamMarker {
    Named,
    Parameter,
    Temporal,
    FirstResult,
    MaxResults,
}

impl ParamAttribute {
    pub fn marker(&self) -> ParamMarker {
        match self {
            ParamAttribute::Named(_) => ParamMarker::Named,
            ParamAttribute::Parameter(_) => ParamMarker::Parameter,
            ParamAttribute::Temporal(_) => ParamMarker::Temporal,
            ParamAttribute::FirstResult => ParamMarker::FirstResult,
            ParamAttribute::MaxResults => ParamMarker::MaxResults,
        }
    }
}
