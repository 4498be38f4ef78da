use crate::collect::collect_parameters;
use crate::order::order_parameters;
use crate::validate::validate_parameters;
use core_types::{CompiledProcedure, DataAccessSession, DispatchError, ProcedureDeclaration};
use descriptor::MethodDescriptor;

/// Builds the declaration of the procedure a method calls, parameters in
/// call order. Touches no data source.
pub fn declare_procedure(method: &MethodDescriptor) -> Result<ProcedureDeclaration, DispatchError> {
    let name = method.stored_procedure().ok_or_else(|| {
        DispatchError::configuration(method.qualified_name(), "no stored procedure is declared")
    })?;
    let collected = collect_parameters(method);
    validate_parameters(method, &collected)?;
    let parameters = order_parameters(&method.qualified_name(), collected, method.is_function())?;

    tracing::debug!(
        method = %method.qualified_name(),
        procedure = name,
        function = method.is_function(),
        parameters = ?parameters.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
        "Procedure declared"
    );
    Ok(ProcedureDeclaration {
        name: name.to_string(),
        function: method.is_function(),
        parameters,
    })
}

/// Declares the procedure and prepares it through the session. Data-source
/// errors come back untranslated.
pub async fn compile_procedure(
    method: &MethodDescriptor,
    session: &dyn DataAccessSession,
) -> Result<CompiledProcedure, DispatchError> {
    compile_declared(method, declare_procedure(method)?, session).await
}

/// Prepares an already declared procedure through the session.
pub async fn compile_declared(
    method: &MethodDescriptor,
    declaration: ProcedureDeclaration,
    session: &dyn DataAccessSession,
) -> Result<CompiledProcedure, DispatchError> {
    let compiled = session.prepare(declaration).await?;
    tracing::debug!(
        method = %method.qualified_name(),
        statement = compiled.statement(),
        "Procedure compiled"
    );
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_types::{DataAccessError, ParamDescriptor, PreparedQuery, Row, SqlType, Value};
    use descriptor::{Attribute, ParamAttribute};

    /// Prepares everything and renders the call from the declared order.
    struct PreparingSession;

    #[async_trait]
    impl DataAccessSession for PreparingSession {
        async fn fetch(&self, _query: &PreparedQuery) -> Result<Vec<Row>, DataAccessError> {
            Ok(Vec::new())
        }

        async fn execute_update(&self, _query: &PreparedQuery) -> Result<u64, DataAccessError> {
            Ok(0)
        }

        async fn prepare(
            &self,
            declaration: ProcedureDeclaration,
        ) -> Result<CompiledProcedure, DataAccessError> {
            if declaration.name == "missing" {
                return Err(DataAccessError::Backend("function missing does not exist".into()));
            }
            let statement = format!(
                "CALL {}({})",
                declaration.name,
                declaration
                    .parameters
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            Ok(CompiledProcedure::new(declaration, statement))
        }

        async fn call(
            &self,
            _procedure: &CompiledProcedure,
            _inputs: &[(String, Value)],
        ) -> Result<Row, DataAccessError> {
            Ok(Row::new())
        }
    }

    fn scenario(procedure: &str) -> MethodDescriptor {
        MethodDescriptor::builder("ProcDao", "callResult")
            .attribute(Attribute::StoredProcedure(procedure.into()))
            .attribute(Attribute::Parameter(ParamDescriptor::output("p_result", SqlType::Varchar)))
            .argument("text", vec![ParamAttribute::Parameter(ParamDescriptor::input("p_string", SqlType::Varchar))])
            .argument(7, vec![ParamAttribute::Parameter(ParamDescriptor::input("p_integer", SqlType::Integer))])
            .build()
    }

    #[tokio::test]
    async fn procedure_parameters_are_declared_inputs_first() {
        let compiled = compile_procedure(&scenario("p_concat"), &PreparingSession).await.unwrap();
        assert_eq!(compiled.parameter_names(), vec!["p_string", "p_integer", "p_result"]);
        assert_eq!(compiled.statement(), "CALL p_concat(p_string, p_integer, p_result)");
    }

    #[tokio::test]
    async fn data_source_errors_are_not_translated() {
        let err = compile_procedure(&scenario("missing"), &PreparingSession).await.unwrap_err();
        assert!(matches!(err, DispatchError::DataAccess(DataAccessError::Backend(_))));
    }

    #[test]
    fn a_method_without_a_procedure_cannot_be_declared() {
        let method = MethodDescriptor::builder("ProcDao", "nothing").build();
        assert!(matches!(declare_procedure(&method), Err(DispatchError::Configuration { .. })));
    }
}
