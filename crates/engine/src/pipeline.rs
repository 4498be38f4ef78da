use core_types::{DispatchError, Value};
use descriptor::{MethodDescriptor, ResultConverter, ResultValidator, StrategyRef};
use strategies::{ConverterFinder, ConverterRegistry};
use std::sync::Arc;

/// A raw result on its way to the caller, with the post-processing the method
/// declared.
pub struct ResultEnvelope<'m> {
    raw: Value,
    method: &'m MethodDescriptor,
    converter: StrategyRef<dyn ResultConverter>,
    validator: StrategyRef<dyn ResultValidator>,
}

impl<'m> ResultEnvelope<'m> {
    pub fn new(raw: Value, method: &'m MethodDescriptor) -> Self {
        Self {
            raw,
            converter: method.converter(),
            validator: method.validator(),
            method,
        }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// Converts a raw result to the declared return type, then validates it.
pub struct ConversionPipeline {
    converters: ConverterFinder,
}

impl ConversionPipeline {
    pub fn new(registry: Arc<ConverterRegistry>) -> Self {
        Self {
            converters: ConverterFinder::new(registry),
        }
    }

    pub fn process(&self, envelope: ResultEnvelope<'_>) -> Result<Value, DispatchError> {
        let ResultEnvelope {
            raw,
            method,
            converter,
            validator,
        } = envelope;

        let result = match self.converters.resolve(&converter, method, &raw)? {
            None => raw,
            Some(strategy) => {
                let instance = strategy.instantiate().map_err(|reason| {
                    DispatchError::conversion(
                        method.qualified_name(),
                        format!("converter '{}' could not be created: {reason}", strategy.name()),
                    )
                })?;
                tracing::trace!(method = %method.qualified_name(), converter = strategy.name(), "Converting result");
                instance.convert(raw, method)?
            }
        };

        if let Some(strategy) = validator.explicit() {
            let instance = strategy.instantiate().map_err(|reason| {
                DispatchError::configuration(
                    method.qualified_name(),
                    format!("validator '{}' could not be created: {reason}", strategy.name()),
                )
            })?;
            tracing::trace!(method = %method.qualified_name(), validator = strategy.name(), "Validating result");
            instance.validate(&result, method)?;
        }
        Ok(result)
    }
}
