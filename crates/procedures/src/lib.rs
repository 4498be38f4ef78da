//! # Quarry Procedures Crate
//!
//! Turns the parameter declarations of a stored-procedure method into a
//! prepared call, and caches the result per call site.
//!
//! ## Public API
//!
//! - `declare_procedure`: collect, validate and order a method's parameters.
//! - `compile_procedure`: declare, then prepare through the data-access session.
//! - `compile_declared`: prepare a declaration built earlier.
//! - `ProcedureCache` / `cache_key`: per-key get-or-compile storage.

pub mod cache;
pub mod collect;
pub mod compiler;
pub mod order;
pub mod validate;

pub use cache::{ProcedureCache, cache_key};
pub use collect::collect_parameters;
pub use compiler::{compile_declared, compile_procedure, declare_procedure};
pub use order::order_parameters;
pub use validate::validate_parameters;
