//! Built-in query executors.

use async_trait::async_trait;
use core_types::{DataAccessSession, DispatchError, PreparedQuery, Value};
use descriptor::QueryExecutor;

/// Expects exactly one row and returns it.
#[derive(Debug, Default)]
pub struct UniqueResultExecutor;

#[async_trait]
impl QueryExecutor for UniqueResultExecutor {
    async fn execute(
        &self,
        query: &PreparedQuery,
        session: &dyn DataAccessSession,
    ) -> Result<Value, DispatchError> {
        let mut rows = session.fetch(query).await?;
        match rows.len() {
            0 => Err(DispatchError::EntityNotFound {
                method: query.method.clone(),
            }),
            1 => Ok(Value::Row(rows.remove(0))),
            found => Err(DispatchError::NonUniqueResult {
                method: query.method.clone(),
                found,
            }),
        }
    }
}

/// Returns every row as a list.
#[derive(Debug, Default)]
pub struct ListExecutor;

#[async_trait]
impl QueryExecutor for ListExecutor {
    async fn execute(
        &self,
        query: &PreparedQuery,
        session: &dyn DataAccessSession,
    ) -> Result<Value, DispatchError> {
        let rows = session.fetch(query).await?;
        tracing::trace!(method = %query.method, rows = rows.len(), "Fetched list");
        Ok(Value::List(rows.into_iter().map(Value::Row).collect()))
    }
}

/// Answers whether the query yields at least one row.
#[derive(Debug, Default)]
pub struct ExistsExecutor;

#[async_trait]
impl QueryExecutor for ExistsExecutor {
    async fn execute(
        &self,
        query: &PreparedQuery,
        session: &dyn DataAccessSession,
    ) -> Result<Value, DispatchError> {
        // One row is enough to answer.
        let mut limited = query.clone();
        limited.max_results = Some(1);
        let rows = session.fetch(&limited).await?;
        Ok(Value::Bool(!rows.is_empty()))
    }
}

/// Reads an integral count from the first column of the first row.
#[derive(Debug, Default)]
pub struct CountExecutor;

#[async_trait]
impl QueryExecutor for CountExecutor {
    async fn execute(
        &self,
        query: &PreparedQuery,
        session: &dyn DataAccessSession,
    ) -> Result<Value, DispatchError> {
        let rows = session.fetch(query).await?;
        let Some(first) = rows.first().and_then(|row| row.first()) else {
            return Ok(Value::Long(0));
        };
        first.as_i64().map(Value::Long).ok_or_else(|| {
            DispatchError::conversion(
                query.method.clone(),
                format!("count column holds a {}", first.type_name()),
            )
        })
    }
}

/// Runs a data-modifying statement and returns the affected row count.
#[derive(Debug, Default)]
pub struct UpdateExecutor;

#[async_trait]
impl QueryExecutor for UpdateExecutor {
    async fn execute(
        &self,
        query: &PreparedQuery,
        session: &dyn DataAccessSession,
    ) -> Result<Value, DispatchError> {
        let affected = session.execute_update(query).await?;
        tracing::debug!(method = %query.method, affected, "Update executed");
        Ok(Value::Long(i64::try_from(affected).unwrap_or(i64::MAX)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubSession;
    use core_types::{QueryText, Row};

    fn query() -> PreparedQuery {
        PreparedQuery::new("UserDao::getByUsername", QueryText::Named("User.byName".into()))
    }

    #[tokio::test]
    async fn unique_result_returns_the_single_row() {
        let row = Row::of_entity("TestEntity").with("username", "alice");
        let session = StubSession::with_rows(vec![row.clone()]);
        let value = UniqueResultExecutor.execute(&query(), &session).await.unwrap();
        assert_eq!(value, Value::Row(row));
    }

    #[tokio::test]
    async fn unique_result_reports_missing_and_duplicate_rows() {
        let empty = StubSession::with_rows(vec![]);
        let err = UniqueResultExecutor.execute(&query(), &empty).await.unwrap_err();
        assert!(matches!(err, DispatchError::EntityNotFound { .. }));

        let twice = StubSession::with_rows(vec![Row::new(), Row::new()]);
        let err = UniqueResultExecutor.execute(&query(), &twice).await.unwrap_err();
        assert!(matches!(err, DispatchError::NonUniqueResult { found: 2, .. }));
    }

    #[tokio::test]
    async fn exists_fetches_at_most_one_row() {
        let session = StubSession::with_rows(vec![Row::new()]);
        let value = ExistsExecutor.execute(&query(), &session).await.unwrap();
        assert_eq!(value, Value::Bool(true));
        assert_eq!(session.last_query().unwrap().max_results, Some(1));

        let empty = StubSession::with_rows(vec![]);
        assert_eq!(ExistsExecutor.execute(&query(), &empty).await.unwrap(), Value::Bool(false));
    }

    #[tokio::test]
    async fn count_reads_the_first_column() {
        let session = StubSession::with_rows(vec![Row::new().with("count", 42_i64)]);
        assert_eq!(CountExecutor.execute(&query(), &session).await.unwrap(), Value::Long(42));

        let text = StubSession::with_rows(vec![Row::new().with("count", "many")]);
        let err = CountExecutor.execute(&query(), &text).await.unwrap_err();
        assert!(matches!(err, DispatchError::Conversion { .. }));
    }

    #[tokio::test]
    async fn update_returns_affected_rows() {
        let session = StubSession::with_rows(vec![]).affecting(3);
        assert_eq!(UpdateExecutor.execute(&query(), &session).await.unwrap(), Value::Long(3));
    }
}
