use regex::Regex;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;
pub mod telemetry;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{
    Config, DatabaseSettings, DispatchSettings, GeneratorInference, LoggingSettings,
    ProcedureSettings,
};
pub use telemetry::init_tracing;

/// Loads the application configuration from `config.toml` and the environment.
///
/// The file is optional; every section has defaults. Environment variables
/// prefixed with `QUARRY__` override file values, e.g.
/// `QUARRY__DISPATCH__EXECUTOR_PATTERN`.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from("config.toml")
}

/// Same as [`load_config`] with an explicit file path.
pub fn load_config_from(path: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("QUARRY").separator("__"));
    let config = finish(builder)?;
    tracing::debug!(
        path,
        found = std::path::Path::new(path).exists(),
        executor_pattern = %config.dispatch.executor_pattern,
        "Configuration loaded"
    );
    Ok(config)
}

/// Parses configuration from TOML text (no environment overrides).
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml));
    finish(builder)
}

fn finish(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<Config, ConfigError> {
    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Checks the values that would otherwise only fail on first use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        compile_pattern(&self.dispatch.executor_pattern)?;
        compile_pattern(&self.dispatch.generator_pattern)?;
        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Compiles a method-name pattern, reporting which pattern was rejected.
pub fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.dispatch.executor_pattern, "^[a-z]+");
        assert_eq!(config.dispatch.generator_inference, GeneratorInference::Convention);
        assert!(config.procedures.qualify_cache_keys);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn a_missing_file_falls_back_to_defaults() {
        let config = load_config_from("does/not/exist/quarry.toml").unwrap();
        assert_eq!(config.dispatch.generator_pattern, "^[a-z]+");
        assert_eq!(config.logging.file_prefix, "quarry.log");
    }

    #[test]
    fn sections_override_defaults() {
        let config = parse_config(
            r#"
            [dispatch]
            executor_pattern = "^(is|get|find)"
            generator_pattern = "^[a-z]+"
            generator_inference = "explicit_only"

            [procedures]
            qualify_cache_keys = false
            "#,
        )
        .unwrap();
        assert_eq!(config.dispatch.executor_pattern, "^(is|get|find)");
        assert_eq!(config.dispatch.generator_inference, GeneratorInference::ExplicitOnly);
        assert!(!config.procedures.qualify_cache_keys);
    }

    #[test]
    fn invalid_pattern_is_rejected_at_load() {
        let err = parse_config(
            r#"
            [dispatch]
            executor_pattern = "^(unclosed"
            generator_pattern = "^[a-z]+"
            generator_inference = "convention"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref pattern, .. } if pattern == "^(unclosed"));
    }
}
