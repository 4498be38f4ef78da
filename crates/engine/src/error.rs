use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] configuration::ConfigError),

    #[error(transparent)]
    Dispatch(#[from] core_types::DispatchError),

    #[error("Failed to load method manifest: {0}")]
    ManifestLoad(#[from] config::ConfigError),

    #[error("Invalid method manifest: {0}")]
    Manifest(String),

    #[error("Method '{0}' is not declared in the manifest")]
    UnknownMethod(String),

    #[error("Invalid argument '{name}': {source}")]
    Argument {
        name: String,
        #[source]
        source: core_types::CoreError,
    },
}
