//! Built-in result validators. None is registered by convention; methods opt
//! in explicitly.

use core_types::{DispatchError, Value};
use descriptor::{MethodDescriptor, ResultValidator};

/// Rejects a null result.
#[derive(Debug, Default)]
pub struct NotNullValidator;

impl ResultValidator for NotNullValidator {
    fn validate(&self, result: &Value, method: &MethodDescriptor) -> Result<(), DispatchError> {
        if result.is_null() {
            return Err(DispatchError::EntityNotFound {
                method: method.qualified_name(),
            });
        }
        Ok(())
    }
}

/// Requires a list result to hold exactly one element.
#[derive(Debug, Default)]
pub struct ExactlyOneValidator;

impl ResultValidator for ExactlyOneValidator {
    fn validate(&self, result: &Value, method: &MethodDescriptor) -> Result<(), DispatchError> {
        match result {
            Value::Null => Err(DispatchError::EntityNotFound {
                method: method.qualified_name(),
            }),
            Value::List(items) if items.is_empty() => Err(DispatchError::EntityNotFound {
                method: method.qualified_name(),
            }),
            Value::List(items) if items.len() > 1 => Err(DispatchError::NonUniqueResult {
                method: method.qualified_name(),
                found: items.len(),
            }),
            _ => Ok(()),
        }
    }
}

/// Rejects null, empty lists and blank text.
#[derive(Debug, Default)]
pub struct NotEmptyValidator;

impl ResultValidator for NotEmptyValidator {
    fn validate(&self, result: &Value, method: &MethodDescriptor) -> Result<(), DispatchError> {
        let empty = match result {
            Value::Null => true,
            Value::List(items) => items.is_empty(),
            Value::Text(text) => text.trim().is_empty(),
            Value::Row(row) => row.is_empty(),
            _ => false,
        };
        if empty {
            tracing::debug!(method = %method.qualified_name(), "Empty result rejected");
            return Err(DispatchError::EntityNotFound {
                method: method.qualified_name(),
            });
        }
        Ok(())
    }
}
