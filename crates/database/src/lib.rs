//! # Quarry Database Crate
//!
//! The PostgreSQL implementation of the dispatch engine's collaborators.
//!
//! ## Architectural Principles
//!
//! - **Adapter only:** The engine knows nothing of SQL drivers. This crate
//!   implements `DataAccessSession` and `TransactionalBoundary` on top of
//!   `sqlx` and is wired in by the host.
//! - **Asynchronous & Pooled:** All operations are asynchronous and run on a
//!   shared `PgPool`.
//! - **One transaction per boundary:** A `PgBoundary` hands its transaction to
//!   the `PgSession` calls made inside it through a task-local slot, so the
//!   session itself stays stateless and shareable.
//!
//! ## Public API
//!
//! - `connect`: establishes the connection pool.
//! - `PgSession`: literal and named SQL, `:name` placeholders, paging,
//!   procedure and function calls.
//! - `PgBoundary`: read-only and read-write transactional boundaries.
//! - `DbError`: connection failures.

pub mod boundary;
pub mod connection;
pub mod error;
pub mod session;
pub mod sql;
mod transaction;

pub use boundary::PgBoundary;
pub use connection::connect;
pub use error::DbError;
pub use session::PgSession;
