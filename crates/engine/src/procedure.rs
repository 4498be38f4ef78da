//! Binding procedure inputs and reading procedure results.

use core_types::{CompiledProcedure, DispatchError, ParamKind, Row, Value};
use descriptor::MethodDescriptor;

/// The IN and INOUT values of a call, in declaration order.
///
/// A parameter takes its value from the argument that declares it or, failing
/// that, from the argument bound to its name. An IN parameter with neither is
/// a configuration error; an INOUT one is sent as null.
pub fn bind_inputs(
    method: &MethodDescriptor,
    procedure: &CompiledProcedure,
) -> Result<Vec<(String, Value)>, DispatchError> {
    procedure
        .declaration()
        .inputs()
        .map(|param| {
            let declared = method
                .arguments()
                .iter()
                .find(|arg| {
                    arg.parameter()
                        .is_some_and(|p| p.name == param.name && p.kind == param.kind)
                })
                .map(|arg| arg.value());
            match declared.or_else(|| method.argument_named(&param.name)) {
                Some(value) => Ok((param.name.clone(), value.clone())),
                None if param.kind == ParamKind::InOut => Ok((param.name.clone(), Value::Null)),
                None => Err(DispatchError::configuration(
                    method.qualified_name(),
                    format!("no argument supplies IN parameter '{}'", param.name),
                )),
            }
        })
        .collect()
}

/// Picks the method's result out of the procedure's output row.
///
/// A declared return parameter is read by name, or from the only column when
/// the row has one (functions name their result column after themselves); a
/// void method yields null; a procedure with a single output yields that
/// value; otherwise the whole row.
pub fn extract_result(
    method: &MethodDescriptor,
    procedure: &CompiledProcedure,
    outputs: Row,
) -> Result<Value, DispatchError> {
    if let Some(name) = method.return_param_name() {
        let only = outputs.first().filter(|_| outputs.len() == 1);
        return outputs.get(name).or(only).cloned().ok_or_else(|| {
            DispatchError::conversion(
                method.qualified_name(),
                format!("the call returned no value for '{name}'"),
            )
        });
    }
    if method.return_type().is_void() {
        return Ok(Value::Null);
    }
    let mut declared = procedure.declaration().outputs();
    if let (Some(only), None) = (declared.next(), declared.next()) {
        let value = outputs
            .get(&only.name)
            .or_else(|| outputs.first().filter(|_| outputs.len() == 1))
            .cloned()
            .unwrap_or(Value::Null);
        return Ok(value);
    }
    Ok(Value::Row(outputs))
}
