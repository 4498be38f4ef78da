use std::sync::Arc;
use strategies::factory;
use strategies::{ConverterRegistry, ExecutorRegistry, GeneratorRegistry, ValidatorRegistry};

/// The four strategy registries a dispatcher resolves against.
#[derive(Clone)]
pub struct Registries {
    pub executors: Arc<ExecutorRegistry>,
    pub converters: Arc<ConverterRegistry>,
    pub generators: Arc<GeneratorRegistry>,
    pub validators: Arc<ValidatorRegistry>,
}

impl Registries {
    pub fn new(
        executors: ExecutorRegistry,
        converters: ConverterRegistry,
        generators: GeneratorRegistry,
        validators: ValidatorRegistry,
    ) -> Self {
        Self {
            executors: Arc::new(executors),
            converters: Arc::new(converters),
            generators: Arc::new(generators),
            validators: Arc::new(validators),
        }
    }
}

impl Default for Registries {
    /// The built-in strategies under their conventional keys.
    fn default() -> Self {
        Self::new(
            factory::executor_defaults().build(),
            factory::converter_defaults().build(),
            factory::generator_defaults().build(),
            factory::validator_defaults().build(),
        )
    }
}
