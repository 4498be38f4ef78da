//! # Quarry Strategies Crate
//!
//! The built-in strategies, the registries that hold them, and the finders
//! that pick one for a given method.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** Nothing here knows about PostgreSQL. Executors talk to the
//!   `DataAccessSession` trait; converters and validators work on `Value`s.
//! - **Registries are read-only:** They are assembled once through a builder
//!   and shared by `Arc` afterwards. Lookups take no locks.
//! - **Explicit beats convention:** Every finder trusts an explicit strategy
//!   unconditionally and only falls back to the registry for the placeholder.
//!
//! ## Public API
//!
//! - `ExecutorFinder`, `GeneratorFinder`, `ConverterFinder`: strategy resolution.
//! - `StrategyRegistry` and its aliases, built through `RegistryBuilder`.
//! - `factory`: the default registries, ready for further registration.
//! - The concrete strategies themselves (e.g., `ListExecutor`, `LongConverter`).

pub mod converters;
pub mod executors;
pub mod factory;
pub mod finding;
pub mod generators;
pub mod registry;
pub mod validators;

#[cfg(test)]
mod test_support;

pub use converters::{
    BooleanConverter, DecimalConverter, DoubleConverter, IntConverter, LongConverter,
    SingleRowConverter, TextConverter,
};
pub use executors::{
    CountExecutor, ExistsExecutor, ListExecutor, UniqueResultExecutor, UpdateExecutor,
};
pub use finding::{ConverterFinder, ExecutorFinder, GeneratorFinder};
pub use generators::{EntityNamedQueryGenerator, NamedQueryGenerator};
pub use registry::{
    ConverterRegistry, ExecutorRegistry, GeneratorRegistry, RegistryBuilder, StrategyRegistry,
    ValidatorRegistry,
};
pub use validators::{ExactlyOneValidator, NotEmptyValidator, NotNullValidator};
