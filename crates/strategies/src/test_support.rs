use async_trait::async_trait;
use core_types::{
    CompiledProcedure, DataAccessError, DataAccessSession, PreparedQuery, ProcedureDeclaration,
    Row, Value,
};
use std::sync::Mutex;

/// Returns canned rows and remembers the last query it saw.
pub(crate) struct StubSession {
    rows: Vec<Row>,
    affected: u64,
    last: Mutex<Option<PreparedQuery>>,
}

impl StubSession {
    pub(crate) fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            affected: 0,
            last: Mutex::new(None),
        }
    }

    pub(crate) fn affecting(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    pub(crate) fn last_query(&self) -> Option<PreparedQuery> {
        self.last.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataAccessSession for StubSession {
    async fn fetch(&self, query: &PreparedQuery) -> Result<Vec<Row>, DataAccessError> {
        *self.last.lock().unwrap() = Some(query.clone());
        let limit = query.max_results.map_or(usize::MAX, |n| n as usize);
        Ok(self.rows.iter().take(limit).cloned().collect())
    }

    async fn execute_update(&self, query: &PreparedQuery) -> Result<u64, DataAccessError> {
        *self.last.lock().unwrap() = Some(query.clone());
        Ok(self.affected)
    }

    async fn prepare(
        &self,
        declaration: ProcedureDeclaration,
    ) -> Result<CompiledProcedure, DataAccessError> {
        Ok(CompiledProcedure::new(declaration, "stub"))
    }

    async fn call(
        &self,
        _procedure: &CompiledProcedure,
        _inputs: &[(String, Value)],
    ) -> Result<Row, DataAccessError> {
        Err(DataAccessError::Backend("stub session has no procedures".to_string()))
    }
}
