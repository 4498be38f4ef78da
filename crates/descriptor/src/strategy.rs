use crate::method::MethodDescriptor;
use async_trait::async_trait;
use core_types::{DataAccessSession, DispatchError, PreparedQuery, QueryText, Value};
use std::fmt;
use std::sync::Arc;

/// The textual form of "no explicit override supplied".
pub const PLACEHOLDER: &str = "placeholder";

/// Runs a prepared query against the session and shapes the raw result.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(
        &self,
        query: &PreparedQuery,
        session: &dyn DataAccessSession,
    ) -> Result<Value, DispatchError>;
}

/// Produces the query text for a method that declares none.
pub trait QueryGenerator: Send + Sync {
    fn generate(&self, method: &MethodDescriptor) -> Result<QueryText, DispatchError>;
}

/// Turns a raw result into the method's declared return type.
pub trait ResultConverter: Send + Sync {
    fn convert(&self, raw: Value, method: &MethodDescriptor) -> Result<Value, DispatchError>;
}

/// Checks the shape of a converted result.
pub trait ResultValidator: Send + Sync {
    fn validate(&self, result: &Value, method: &MethodDescriptor) -> Result<(), DispatchError>;
}

type Factory<S> = dyn Fn() -> Result<Box<S>, String> + Send + Sync;

/// A named factory for one strategy implementation.
///
/// Cloning shares the factory; two handles are the same strategy when they
/// share it (see [`Strategy::same_as`]).
pub struct Strategy<S: ?Sized> {
    name: Arc<str>,
    factory: Arc<Factory<S>>,
}

impl<S: ?Sized> Strategy<S> {
    pub fn new<F>(name: impl Into<Arc<str>>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<S>, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Builds a fresh instance of the strategy.
    pub fn instantiate(&self) -> Result<Box<S>, String> {
        (self.factory)()
    }

    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.factory, &other.factory)
    }
}

impl Strategy<dyn QueryExecutor> {
    pub fn executor<T: QueryExecutor + Default + 'static>(name: &str) -> Self {
        Self::new(name, || Ok(Box::new(T::default()) as Box<dyn QueryExecutor>))
    }
}

impl Strategy<dyn QueryGenerator> {
    pub fn generator<T: QueryGenerator + Default + 'static>(name: &str) -> Self {
        Self::new(name, || Ok(Box::new(T::default()) as Box<dyn QueryGenerator>))
    }
}

impl Strategy<dyn ResultConverter> {
    pub fn converter<T: ResultConverter + Default + 'static>(name: &str) -> Self {
        Self::new(name, || Ok(Box::new(T::default()) as Box<dyn ResultConverter>))
    }
}

impl Strategy<dyn ResultValidator> {
    pub fn validator<T: ResultValidator + Default + 'static>(name: &str) -> Self {
        Self::new(name, || Ok(Box::new(T::default()) as Box<dyn ResultValidator>))
    }
}

impl<S: ?Sized> Clone for Strategy<S> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            factory: Arc::clone(&self.factory),
        }
    }
}

impl<S: ?Sized> fmt::Debug for Strategy<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Strategy").field(&self.name).finish()
    }
}

/// A strategy reference as declared on a method: either the placeholder or an
/// explicit override.
pub enum StrategyRef<S: ?Sized> {
    Placeholder,
    Explicit(Strategy<S>),
}

impl<S: ?Sized> StrategyRef<S> {
    pub fn explicit(&self) -> Option<&Strategy<S>> {
        match self {
            StrategyRef::Placeholder => None,
            StrategyRef::Explicit(strategy) => Some(strategy),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, StrategyRef::Placeholder)
    }
}

impl<S: ?Sized> Default for StrategyRef<S> {
    fn default() -> Self {
        StrategyRef::Placeholder
    }
}

impl<S: ?Sized> Clone for StrategyRef<S> {
    fn clone(&self) -> Self {
        match self {
            StrategyRef::Placeholder => StrategyRef::Placeholder,
            StrategyRef::Explicit(strategy) => StrategyRef::Explicit(strategy.clone()),
        }
    }
}

impl<S: ?Sized> fmt::Debug for StrategyRef<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyRef::Placeholder => f.write_str(PLACEHOLDER),
            StrategyRef::Explicit(strategy) => write!(f, "{strategy:?}"),
        }
    }
}

impl<S: ?Sized> From<Strategy<S>> for StrategyRef<S> {
    fn from(strategy: Strategy<S>) -> Self {
        StrategyRef::Explicit(strategy)
    }
}
