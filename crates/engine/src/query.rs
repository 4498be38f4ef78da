//! Turning a query method into a [`PreparedQuery`].

use core_types::{Binding, DispatchError, Placeholder, PreparedQuery, QueryText, Value};
use descriptor::{MethodDescriptor, ParamMarker};
use strategies::GeneratorFinder;

/// Resolves the query text, bindings and paging of a query method.
pub fn prepare_query(
    method: &MethodDescriptor,
    generators: &GeneratorFinder,
) -> Result<PreparedQuery, DispatchError> {
    let text = query_text(method, generators)?;
    let mut query = PreparedQuery::new(method.qualified_name(), text);
    query.native = method.is_native_query();
    query.cacheable = method.caching_enabled();
    query.bindings = bindings(method);
    query.first_result = paging(method, ParamMarker::FirstResult)?.or(method.first_result());
    query.max_results = paging(method, ParamMarker::MaxResults)?.or(method.max_results());
    Ok(query)
}

/// Literal text wins, then an explicit query name, then the generator.
fn query_text(
    method: &MethodDescriptor,
    generators: &GeneratorFinder,
) -> Result<QueryText, DispatchError> {
    if let Some(text) = method.query() {
        return Ok(QueryText::Literal(text.to_string()));
    }
    if let Some(name) = method.query_name() {
        return Ok(QueryText::Named(name.to_string()));
    }
    let strategy = generators.resolve(&method.generator(), method)?;
    let generator = strategy.instantiate().map_err(|reason| {
        DispatchError::configuration(
            method.qualified_name(),
            format!("generator '{}' could not be created: {reason}", strategy.name()),
        )
    })?;
    let text = generator.generate(method)?;
    tracing::debug!(method = %method.qualified_name(), generator = strategy.name(), query = %text, "Query generated");
    Ok(text)
}

/// Binds every argument that is not a paging marker: by name when it carries
/// a name binding, otherwise by its 1-based position among bindable arguments.
fn bindings(method: &MethodDescriptor) -> Vec<Binding> {
    method
        .arguments()
        .iter()
        .filter(|arg| !arg.has(ParamMarker::FirstResult) && !arg.has(ParamMarker::MaxResults))
        .enumerate()
        .map(|(position, arg)| Binding {
            placeholder: match arg.bound_name() {
                Some(name) => Placeholder::Named(name.to_string()),
                None => Placeholder::Positional(position + 1),
            },
            value: arg.value().clone(),
            temporal: arg.temporal(),
        })
        .collect()
}

/// A paging value supplied through a marked argument. A null argument means
/// "not supplied".
fn paging(method: &MethodDescriptor, marker: ParamMarker) -> Result<Option<u32>, DispatchError> {
    match method.argument_marked(marker) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_i64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| {
                DispatchError::configuration(
                    method.qualified_name(),
                    format!("paging argument must be a non-negative integer, got {value}"),
                )
            }),
    }
}
