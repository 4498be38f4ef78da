pub mod enums;
pub mod error;
pub mod param;
pub mod session;
pub mod types;
pub mod value;

// Re-export the core types to provide a clean public API.
pub use enums::{Demarcation, ParamKind, SqlType, TemporalKind};
pub use error::{CoreError, DataAccessError, DispatchError};
pub use param::{ParamDescriptor, TypeHint};
pub use session::{
    Binding, CompiledProcedure, DataAccessSession, Placeholder, PreparedQuery,
    ProcedureDeclaration, QueryText, TransactionalBoundary, UnitOfWork,
};
pub use types::{ScalarType, TypeRef};
pub use value::{Row, Value};
