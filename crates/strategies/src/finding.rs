//! Resolution of the executor, converter and generator a method should use.
//!
//! All three finders share one shape: an explicit, non-placeholder reference
//! wins unconditionally; otherwise a key is derived and looked up in the
//! registry, and a missing key is a `NotFound` naming the key and the method.

use crate::registry::{ConverterRegistry, ExecutorRegistry, GeneratorRegistry, StrategyRegistry};
use configuration::GeneratorInference;
use core_types::{DispatchError, Value};
use descriptor::{
    MethodDescriptor, QueryExecutor, QueryGenerator, ResultConverter, Strategy, StrategyRef,
};
use regex::Regex;
use std::sync::Arc;

/// Applies a naming convention: the first non-empty match in the method name.
fn convention_key<'n>(pattern: &Regex, method_name: &'n str) -> Option<&'n str> {
    pattern
        .find(method_name)
        .map(|m| m.as_str())
        .filter(|key| !key.is_empty())
}

fn lookup<S: ?Sized>(
    registry: &StrategyRegistry<S>,
    key: &str,
    method: &MethodDescriptor,
) -> Result<Strategy<S>, DispatchError> {
    match registry.get(key) {
        Some(strategy) => {
            tracing::trace!(
                method = %method.qualified_name(),
                kind = registry.kind(),
                key,
                strategy = strategy.name(),
                "Resolved by convention"
            );
            Ok(strategy.clone())
        }
        None => Err(DispatchError::not_found(
            method.qualified_name(),
            registry.kind(),
            key,
        )),
    }
}

fn by_convention<S: ?Sized>(
    pattern: &Regex,
    registry: &StrategyRegistry<S>,
    method: &MethodDescriptor,
) -> Result<Strategy<S>, DispatchError> {
    // A name the convention does not match at all is reported under the full name.
    let key = convention_key(pattern, method.name()).unwrap_or(method.name());
    lookup(registry, key, method)
}

/// Finds the executor for a query method.
pub struct ExecutorFinder {
    pattern: Regex,
    registry: Arc<ExecutorRegistry>,
}

impl ExecutorFinder {
    pub fn new(pattern: Regex, registry: Arc<ExecutorRegistry>) -> Self {
        Self { pattern, registry }
    }

    pub fn resolve(
        &self,
        explicit: &StrategyRef<dyn QueryExecutor>,
        method: &MethodDescriptor,
    ) -> Result<Strategy<dyn QueryExecutor>, DispatchError> {
        if let Some(strategy) = explicit.explicit() {
            return Ok(strategy.clone());
        }
        by_convention(&self.pattern, &self.registry, method)
    }

    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }
}

/// Finds the generator for a query method that declares no query text.
pub struct GeneratorFinder {
    inference: GeneratorInference,
    pattern: Regex,
    registry: Arc<GeneratorRegistry>,
    fallback: Strategy<dyn QueryGenerator>,
}

impl GeneratorFinder {
    /// `fallback` serves methods without an explicit generator when inference
    /// is disabled.
    pub fn new(
        inference: GeneratorInference,
        pattern: Regex,
        registry: Arc<GeneratorRegistry>,
        fallback: Strategy<dyn QueryGenerator>,
    ) -> Self {
        Self {
            inference,
            pattern,
            registry,
            fallback,
        }
    }

    pub fn resolve(
        &self,
        explicit: &StrategyRef<dyn QueryGenerator>,
        method: &MethodDescriptor,
    ) -> Result<Strategy<dyn QueryGenerator>, DispatchError> {
        if let Some(strategy) = explicit.explicit() {
            return Ok(strategy.clone());
        }
        match self.inference {
            GeneratorInference::Convention => by_convention(&self.pattern, &self.registry, method),
            GeneratorInference::ExplicitOnly => Ok(self.fallback.clone()),
        }
    }

    pub fn registry(&self) -> &GeneratorRegistry {
        &self.registry
    }
}

/// Finds the converter that turns a raw result into the declared return type.
pub struct ConverterFinder {
    registry: Arc<ConverterRegistry>,
}

impl ConverterFinder {
    pub fn new(registry: Arc<ConverterRegistry>) -> Self {
        Self { registry }
    }

    /// Returns `None` when no conversion is needed.
    ///
    /// Void methods never convert. A null result for a non-nullable scalar
    /// fails before any registry lookup; a result that already has the
    /// declared type passes through untouched.
    pub fn resolve(
        &self,
        explicit: &StrategyRef<dyn ResultConverter>,
        method: &MethodDescriptor,
        raw: &Value,
    ) -> Result<Option<Strategy<dyn ResultConverter>>, DispatchError> {
        let declared = method.return_type();
        if declared.is_void() {
            return Ok(None);
        }
        if let Some(strategy) = explicit.explicit() {
            return Ok(Some(strategy.clone()));
        }
        if raw.is_null() && !declared.is_nullable() {
            return Err(DispatchError::conversion(
                method.qualified_name(),
                format!("null cannot be returned as {declared}"),
            ));
        }
        if raw.is_assignable_to(declared) {
            tracing::trace!(method = %method.qualified_name(), "Result already has the declared type");
            return Ok(None);
        }
        lookup(&self.registry, &declared.key(), method).map(Some)
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }
}
