use core_types::{DispatchError, ParamDescriptor};
use descriptor::MethodDescriptor;

/// Checks the collected parameters against the method's bindings.
///
/// Every name an argument binds to must be declared, and a declared return
/// parameter must be an OUT or INOUT one.
pub fn validate_parameters(
    method: &MethodDescriptor,
    parameters: &[ParamDescriptor],
) -> Result<(), DispatchError> {
    for argument in method.arguments() {
        let Some(name) = argument.bound_name() else {
            continue;
        };
        if !parameters.iter().any(|p| p.name == name) {
            return Err(DispatchError::configuration(
                method.qualified_name(),
                format!("argument {} is bound to undeclared parameter '{name}'", argument.index()),
            ));
        }
    }

    if let Some(name) = method.return_param_name() {
        let returned = parameters
            .iter()
            .find(|p| p.name == name && p.kind.is_output());
        if returned.is_none() {
            return Err(DispatchError::configuration(
                method.qualified_name(),
                format!("return parameter '{name}' is not a declared OUT or INOUT parameter"),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::SqlType;
    use descriptor::{Attribute, ParamAttribute};

    #[test]
    fn binding_to_an_undeclared_name_is_rejected() {
        let params = vec![ParamDescriptor::input("p_string", SqlType::Varchar)];
        let method = MethodDescriptor::builder("ProcDao", "run")
            .argument("x", vec![ParamAttribute::Named("p_other".into())])
            .build();
        let err = validate_parameters(&method, &params).unwrap_err();
        assert!(err.to_string().contains("p_other"));
    }

    #[test]
    fn return_parameter_must_be_an_output() {
        let params = vec![
            ParamDescriptor::input("p_in", SqlType::Varchar),
            ParamDescriptor::output("p_result", SqlType::Varchar),
        ];
        let returns_input = MethodDescriptor::builder("ProcDao", "run")
            .attribute(Attribute::ReturnParamName("p_in".into()))
            .build();
        assert!(matches!(
            validate_parameters(&returns_input, &params),
            Err(DispatchError::Configuration { .. })
        ));

        let returns_output = MethodDescriptor::builder("ProcDao", "run")
            .attribute(Attribute::ReturnParamName("p_result".into()))
            .build();
        assert!(validate_parameters(&returns_output, &params).is_ok());
    }
}
