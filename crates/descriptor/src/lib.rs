//! # Method Descriptor Crate
//!
//! The metadata model of one intercepted data-access call and the contracts of
//! the pluggable strategies that act on it.
//!
//! ## Public API
//!
//! - `MethodDescriptor`: the immutable snapshot of a call (identity, return type,
//!   arguments, method- and argument-level attributes), built by the interception
//!   layer through `MethodDescriptor::builder`.
//! - `Attribute` / `ParamAttribute`: the declarative attribute schema.
//! - `QueryExecutor`, `QueryGenerator`, `ResultConverter`, `ResultValidator`: the
//!   strategy traits.
//! - `Strategy` / `StrategyRef`: a named strategy factory and the
//!   placeholder-or-explicit reference a method declares.

pub mod attribute;
pub mod method;
pub mod strategy;

pub use attribute::{Attribute, AttributeKind, ParamAttribute, ParamMarker};
pub use method::{Argument, MethodDescriptor, MethodDescriptorBuilder};
pub use strategy::{
    PLACEHOLDER, QueryExecutor, QueryGenerator, ResultConverter, ResultValidator, Strategy,
    StrategyRef,
};
