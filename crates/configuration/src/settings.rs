use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dispatch: DispatchSettings,
    #[serde(default)]
    pub procedures: ProcedureSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// How the engine derives strategy keys from method names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Applied to the method name; the first match is the executor registry key.
    pub executor_pattern: String,
    /// Applied to the method name; the first match is the generator registry key.
    pub generator_pattern: String,
    pub generator_inference: GeneratorInference,
}

/// Whether query generators may be inferred from the method name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum GeneratorInference {
    /// Look the generator up by the naming convention.
    Convention,
    /// Only an explicitly declared generator is used; otherwise the default one.
    ExplicitOnly,
}

/// Contains parameters for the procedure compiler.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcedureSettings {
    /// Qualify cache keys with `DeclaringType::method` so identical procedure
    /// names declared on different methods never share a compiled call.
    pub qualify_cache_keys: bool,
}

/// Contains parameters for the PostgreSQL connection pool.
/// The connection URL itself is read from `DATABASE_URL`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Contains parameters for the tracing subscriber.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG` when set.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

// --- Default Implementations ---
// These allow a user to omit any section from their toml and still have it work.

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            executor_pattern: "^[a-z]+".to_string(),
            generator_pattern: "^[a-z]+".to_string(),
            generator_inference: GeneratorInference::Convention,
        }
    }
}

impl Default for ProcedureSettings {
    fn default() -> Self {
        Self {
            qualify_cache_keys: true,
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "quarry.log".to_string(),
        }
    }
}
