use crate::converters::{
    BooleanConverter, DecimalConverter, DoubleConverter, IntConverter, LongConverter,
    SingleRowConverter, TextConverter,
};
use crate::executors::{
    CountExecutor, ExistsExecutor, ListExecutor, UniqueResultExecutor, UpdateExecutor,
};
use crate::generators::{EntityNamedQueryGenerator, NamedQueryGenerator};
use crate::registry::{
    ConverterRegistry, ExecutorRegistry, GeneratorRegistry, RegistryBuilder, ValidatorRegistry,
};
use crate::validators::{ExactlyOneValidator, NotEmptyValidator, NotNullValidator};
use core_types::{ScalarType, TypeRef};
use descriptor::{QueryExecutor, QueryGenerator, ResultConverter, ResultValidator, Strategy};

const UNIQUE_KEYS: &[&str] = &["get", "load", "read"];
const LIST_KEYS: &[&str] = &["find", "list", "search", "all"];
const EXISTS_KEYS: &[&str] = &["is", "exists", "has"];
const COUNT_KEYS: &[&str] = &["count"];
const UPDATE_KEYS: &[&str] = &["update", "delete", "remove", "insert", "save"];

/// The built-in executors, keyed by the verb a method name starts with.
///
/// Callers may keep registering on the returned builder before building it.
pub fn executor_defaults() -> RegistryBuilder<dyn QueryExecutor> {
    ExecutorRegistry::builder("executor")
        .register_all(UNIQUE_KEYS, Strategy::executor::<UniqueResultExecutor>("unique"))
        .register_all(LIST_KEYS, Strategy::executor::<ListExecutor>("list"))
        .register_all(EXISTS_KEYS, Strategy::executor::<ExistsExecutor>("exists"))
        .register_all(COUNT_KEYS, Strategy::executor::<CountExecutor>("count"))
        .register_all(UPDATE_KEYS, Strategy::executor::<UpdateExecutor>("update"))
}

/// The built-in converters, keyed by declared return type. Each scalar
/// converter serves both the plain and the nullable form of its type.
pub fn converter_defaults() -> RegistryBuilder<dyn ResultConverter> {
    let scalars = [
        (ScalarType::Bool, Strategy::converter::<BooleanConverter>("boolean")),
        (ScalarType::Int, Strategy::converter::<IntConverter>("int")),
        (ScalarType::Long, Strategy::converter::<LongConverter>("long")),
        (ScalarType::Double, Strategy::converter::<DoubleConverter>("double")),
        (ScalarType::Decimal, Strategy::converter::<DecimalConverter>("decimal")),
        (ScalarType::Text, Strategy::converter::<TextConverter>("text")),
    ];
    scalars.into_iter().fold(
        ConverterRegistry::builder("converter")
            .declare(Strategy::converter::<SingleRowConverter>("single-row")),
        |builder, (scalar, strategy)| {
            builder
                .register(TypeRef::Scalar(scalar).key(), strategy.clone())
                .register(TypeRef::Nullable(scalar).key(), strategy)
        },
    )
}

/// Generators under the same verb keys as the executors, so any method whose
/// executor resolves by convention also gets a generated query name.
pub fn generator_defaults() -> RegistryBuilder<dyn QueryGenerator> {
    let named = Strategy::generator::<NamedQueryGenerator>("named-query");
    [UNIQUE_KEYS, LIST_KEYS, EXISTS_KEYS, COUNT_KEYS, UPDATE_KEYS]
        .into_iter()
        .fold(GeneratorRegistry::builder("generator"), |builder, keys| {
            builder.register_all(keys, named.clone())
        })
        .declare(Strategy::generator::<EntityNamedQueryGenerator>("entity-named-query"))
}

/// Validators are never inferred; they are only declared for lookup by name.
pub fn validator_defaults() -> RegistryBuilder<dyn ResultValidator> {
    ValidatorRegistry::builder("validator")
        .declare(Strategy::validator::<NotNullValidator>("not-null"))
        .declare(Strategy::validator::<ExactlyOneValidator>("exactly-one"))
        .declare(Strategy::validator::<NotEmptyValidator>("not-empty"))
}

/// The fallback generator used when convention inference is disabled.
pub fn fallback_generator() -> Strategy<dyn QueryGenerator> {
    Strategy::generator::<NamedQueryGenerator>("named-query")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converters_cover_plain_and_nullable_keys() {
        let registry = converter_defaults().build();
        assert_eq!(registry.get("i64").map(|s| s.name()), Some("long"));
        assert_eq!(registry.get("Option<i64>").map(|s| s.name()), Some("long"));
        assert!(registry.get("TestEntity").is_none());
        assert!(registry.named("single-row").is_some());
    }

    #[test]
    fn verbs_share_one_executor_instance_factory() {
        let registry = executor_defaults().build();
        let get = registry.get("get").unwrap();
        let load = registry.get("load").unwrap();
        assert!(get.same_as(load));
        assert_eq!(registry.get("is").unwrap().name(), "exists");
        assert_eq!(registry.get("delete").unwrap().name(), "update");
    }

    #[test]
    fn validators_are_named_only() {
        let registry = validator_defaults().build();
        assert!(registry.is_empty());
        assert!(registry.named("exactly-one").is_some());
    }
}
