//! # Quarry Engine Crate
//!
//! This crate is the orchestrator of the dispatch system. It takes a
//! `MethodDescriptor`, decides how the call is carried out, runs it against
//! the data-access session inside the right transactional boundary, and hands
//! back the converted, validated result.
//!
//! ## Architectural Principles
//!
//! - **Collaborators are traits:** The engine only sees `DataAccessSession`
//!   and `TransactionalBoundary`. PostgreSQL lives in the `database` crate;
//!   tests plug in in-memory implementations.
//! - **No scheduler of its own:** Dispatch runs on the caller's task. Nothing
//!   is spawned, retried or timed out here.
//! - **Read-only shared state:** Registries and finders never change after
//!   `DispatcherBuilder::build`; the procedure cache is the only shared
//!   mutable structure.
//!
//! ## Public API
//!
//! - `Dispatcher` / `DispatcherBuilder`: the `dispatch(&MethodDescriptor)` entry point.
//! - `ConversionPipeline` / `ResultEnvelope`: result conversion and validation.
//! - `ExecutionWrapper`: the three-way boundary selection.
//! - `Manifest`: TOML method declarations for hosts without an interception layer.
//! - `Registries`: the strategy registries a dispatcher resolves against.

pub mod dispatcher;
pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod procedure;
pub mod query;
pub mod registries;
pub mod wrapper;

pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::EngineError;
pub use manifest::{ArgumentRole, ArgumentSpec, Manifest, MethodSpec, NamedQuery};
pub use pipeline::{ConversionPipeline, ResultEnvelope};
pub use registries::Registries;
pub use wrapper::ExecutionWrapper;
