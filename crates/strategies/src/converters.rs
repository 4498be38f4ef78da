//! Built-in result converters.
//!
//! Scalar converters first unwrap the common single-value shapes (a one-element
//! list, a one-column row) before converting, so `SELECT count(*)` style
//! results convert directly.

use core_types::{DispatchError, Value};
use descriptor::{MethodDescriptor, ResultConverter};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

fn single_value(raw: Value) -> Value {
    match raw {
        Value::List(mut items) if items.len() == 1 => single_value(items.remove(0)),
        Value::Row(row) if row.len() == 1 => row
            .into_columns()
            .into_iter()
            .next()
            .map(|(_, value)| value)
            .unwrap_or(Value::Null),
        other => other,
    }
}

/// Null stays null for nullable return types and is an error otherwise.
fn null_result(method: &MethodDescriptor) -> Result<Value, DispatchError> {
    if method.return_type().is_nullable() {
        Ok(Value::Null)
    } else {
        Err(DispatchError::conversion(
            method.qualified_name(),
            format!("null cannot be returned as {}", method.return_type()),
        ))
    }
}

fn unsupported(method: &MethodDescriptor, raw: &Value) -> DispatchError {
    DispatchError::conversion(
        method.qualified_name(),
        format!("a {} cannot be read as {}", raw.type_name(), method.return_type()),
    )
}

/// Reads truthiness from booleans, numbers and boolean text. A row or list
/// answers by presence unless it wraps a single boolean or number, as
/// `SELECT count(*)` or `SELECT exists(..)` results do.
#[derive(Debug, Default)]
pub struct BooleanConverter;

impl ResultConverter for BooleanConverter {
    fn convert(&self, raw: Value, method: &MethodDescriptor) -> Result<Value, DispatchError> {
        // Presence checks look at the whole result, before unwrapping.
        let wrapped = match &raw {
            Value::List(items) if items.len() != 1 => return Ok(Value::Bool(!items.is_empty())),
            Value::Row(row) if row.len() != 1 => return Ok(Value::Bool(true)),
            Value::List(_) | Value::Row(_) => true,
            _ => false,
        };
        match single_value(raw) {
            Value::Null => null_result(method),
            Value::Bool(b) => Ok(Value::Bool(b)),
            Value::Int(n) => Ok(Value::Bool(n != 0)),
            Value::Long(n) => Ok(Value::Bool(n != 0)),
            Value::Double(d) => Ok(Value::Bool(d != 0.0)),
            Value::Decimal(d) => Ok(Value::Bool(!d.is_zero())),
            _ if wrapped => Ok(Value::Bool(true)),
            Value::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "yes" | "y" | "1" => Ok(Value::Bool(true)),
                "false" | "f" | "no" | "n" | "0" => Ok(Value::Bool(false)),
                _ => Err(unsupported(method, &Value::Text(text))),
            },
            other => Err(unsupported(method, &other)),
        }
    }
}

#[derive(Debug, Default)]
pub struct IntConverter;

impl ResultConverter for IntConverter {
    fn convert(&self, raw: Value, method: &MethodDescriptor) -> Result<Value, DispatchError> {
        match single_value(raw) {
            Value::Null => null_result(method),
            value => value
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Value::Int)
                .ok_or_else(|| unsupported(method, &value)),
        }
    }
}

#[derive(Debug, Default)]
pub struct LongConverter;

impl ResultConverter for LongConverter {
    fn convert(&self, raw: Value, method: &MethodDescriptor) -> Result<Value, DispatchError> {
        match single_value(raw) {
            Value::Null => null_result(method),
            value => value
                .as_i64()
                .map(Value::Long)
                .ok_or_else(|| unsupported(method, &value)),
        }
    }
}

#[derive(Debug, Default)]
pub struct DoubleConverter;

impl ResultConverter for DoubleConverter {
    fn convert(&self, raw: Value, method: &MethodDescriptor) -> Result<Value, DispatchError> {
        match single_value(raw) {
            Value::Null => null_result(method),
            value => value
                .as_f64()
                .map(Value::Double)
                .ok_or_else(|| unsupported(method, &value)),
        }
    }
}

#[derive(Debug, Default)]
pub struct DecimalConverter;

impl ResultConverter for DecimalConverter {
    fn convert(&self, raw: Value, method: &MethodDescriptor) -> Result<Value, DispatchError> {
        let value = single_value(raw);
        let decimal = match &value {
            Value::Null => return null_result(method),
            Value::Decimal(d) => Some(*d),
            Value::Int(n) => Some(Decimal::from(*n)),
            Value::Long(n) => Some(Decimal::from(*n)),
            Value::Double(f) => Decimal::from_f64(*f),
            Value::Text(s) => s.trim().parse::<Decimal>().ok(),
            _ => None,
        };
        decimal
            .map(Value::Decimal)
            .ok_or_else(|| unsupported(method, &value))
    }
}

/// Renders any scalar as text.
#[derive(Debug, Default)]
pub struct TextConverter;

impl ResultConverter for TextConverter {
    fn convert(&self, raw: Value, method: &MethodDescriptor) -> Result<Value, DispatchError> {
        match single_value(raw) {
            Value::Null => null_result(method),
            value @ (Value::Row(_) | Value::List(_)) => Err(unsupported(method, &value)),
            value => Ok(Value::Text(value.to_string())),
        }
    }
}

/// Unwraps a list of at most one row. Register it under an entity's key for
/// list-returning executors feeding single-entity methods.
#[derive(Debug, Default)]
pub struct SingleRowConverter;

impl ResultConverter for SingleRowConverter {
    fn convert(&self, raw: Value, method: &MethodDescriptor) -> Result<Value, DispatchError> {
        match raw {
            Value::List(mut items) => match items.len() {
                0 => null_result(method),
                1 => Ok(items.remove(0)),
                found => Err(DispatchError::NonUniqueResult {
                    method: method.qualified_name(),
                    found,
                }),
            },
            row @ Value::Row(_) => Ok(row),
            Value::Null => null_result(method),
            other => Err(unsupported(method, &other)),
        }
    }
}
