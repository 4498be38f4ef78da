//! Built-in query generators.

use core_types::{DispatchError, QueryText, TypeRef};
use descriptor::{MethodDescriptor, QueryGenerator};

/// The declaring type without any module path (`app::dao::UserDao` -> `UserDao`).
fn simple_name(declaring_type: &str) -> &str {
    declaring_type
        .rsplit(['.', ':'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(declaring_type)
}

/// Names the query `<DeclaringType>.<method>`.
#[derive(Debug, Default)]
pub struct NamedQueryGenerator;

impl QueryGenerator for NamedQueryGenerator {
    fn generate(&self, method: &MethodDescriptor) -> Result<QueryText, DispatchError> {
        Ok(QueryText::Named(format!(
            "{}.{}",
            simple_name(method.declaring_type()),
            method.name()
        )))
    }
}

/// Names the query after the returned entity: `<Entity>.<method>`.
///
/// Lists are unwrapped, so `Vec<User>` still names `User.<method>`.
#[derive(Debug, Default)]
pub struct EntityNamedQueryGenerator;

impl QueryGenerator for EntityNamedQueryGenerator {
    fn generate(&self, method: &MethodDescriptor) -> Result<QueryText, DispatchError> {
        let mut declared = method.return_type();
        while let TypeRef::List(inner) = declared {
            declared = inner;
        }
        match declared {
            TypeRef::Entity(entity) => Ok(QueryText::Named(format!("{entity}.{}", method.name()))),
            other => Err(DispatchError::configuration(
                method.qualified_name(),
                format!("no entity to name a query after in return type {other}"),
            )),
        }
    }
}
