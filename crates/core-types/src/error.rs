use thiserror::Error;

/// Failures inside the core data model itself.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid type notation: '{0}'")]
    InvalidType(String),

    #[error("Cannot read '{input}' as {expected}")]
    InvalidValue { input: String, expected: String },
}

/// An error raised by the data-access collaborator. The engine never
/// translates these; they reach the caller as they were produced.
#[derive(Error, Debug)]
pub enum DataAccessError {
    #[error(transparent)]
    Sql(#[from] sqlx::Error),

    #[error("Named query '{0}' is not defined")]
    UnknownNamedQuery(String),

    /// The statement and its bindings do not fit together.
    #[error("Statement configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Backend(String),
}

/// Everything a dispatched call can fail with.
///
/// Each variant names the method being dispatched so misconfiguration can be
/// diagnosed from the message alone.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Invalid declaration on '{method}': {detail}")]
    Configuration { method: String, detail: String },

    #[error("No {strategy} registered under '{key}' (required by '{method}')")]
    NotFound {
        method: String,
        strategy: &'static str,
        key: String,
    },

    #[error("Cannot convert the result of '{method}': {detail}")]
    Conversion { method: String, detail: String },

    #[error("No result found for '{method}'")]
    EntityNotFound { method: String },

    #[error("Expected a unique result for '{method}' but found {found}")]
    NonUniqueResult { method: String, found: usize },

    #[error(transparent)]
    DataAccess(#[from] DataAccessError),
}

impl DispatchError {
    pub fn configuration(method: impl Into<String>, detail: impl Into<String>) -> Self {
        DispatchError::Configuration {
            method: method.into(),
            detail: detail.into(),
        }
    }

    pub fn conversion(method: impl Into<String>, detail: impl Into<String>) -> Self {
        DispatchError::Conversion {
            method: method.into(),
            detail: detail.into(),
        }
    }

    pub fn not_found(
        method: impl Into<String>,
        strategy: &'static str,
        key: impl Into<String>,
    ) -> Self {
        DispatchError::NotFound {
            method: method.into(),
            strategy,
            key: key.into(),
        }
    }
}

impl From<sqlx::Error> for DispatchError {
    fn from(e: sqlx::Error) -> Self {
        DispatchError::DataAccess(DataAccessError::Sql(e))
    }
}
