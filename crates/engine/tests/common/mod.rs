#![allow(dead_code)]

use async_trait::async_trait;
use core_types::{
    CompiledProcedure, DataAccessError, DataAccessSession, Demarcation, DispatchError,
    PreparedQuery, ProcedureDeclaration, Row, TransactionalBoundary, UnitOfWork, Value,
};
use engine::Dispatcher;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub type Journal = Arc<Mutex<Vec<String>>>;

type ProcedureBody = Box<dyn Fn(&[(String, Value)]) -> Row + Send + Sync>;

/// A data-access session over canned rows, keyed by rendered query text
/// (`named:User.byName` or the literal SQL).
pub struct InMemorySession {
    rows: HashMap<String, Vec<Row>>,
    procedures: HashMap<String, ProcedureBody>,
    journal: Journal,
    prepares: AtomicUsize,
    prepare_delay: Duration,
    declarations: Mutex<Vec<ProcedureDeclaration>>,
    queries: Mutex<Vec<PreparedQuery>>,
}

impl InMemorySession {
    pub fn new(journal: Journal) -> Self {
        Self {
            rows: HashMap::new(),
            procedures: HashMap::new(),
            journal,
            prepares: AtomicUsize::new(0),
            prepare_delay: Duration::ZERO,
            declarations: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn rows(mut self, query: &str, rows: Vec<Row>) -> Self {
        self.rows.insert(query.to_string(), rows);
        self
    }

    pub fn procedure<F>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(&[(String, Value)]) -> Row + Send + Sync + 'static,
    {
        self.procedures.insert(name.to_string(), Box::new(body));
        self
    }

    /// Makes every prepare slow enough for concurrent callers to overlap.
    pub fn slow_prepare(mut self, delay: Duration) -> Self {
        self.prepare_delay = delay;
        self
    }

    pub fn prepare_count(&self) -> usize {
        self.prepares.load(Ordering::SeqCst)
    }

    pub fn declarations(&self) -> Vec<ProcedureDeclaration> {
        self.declarations.lock().unwrap().clone()
    }

    pub fn last_query(&self) -> Option<PreparedQuery> {
        self.queries.lock().unwrap().last().cloned()
    }

    fn note(&self, entry: String) {
        self.journal.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl DataAccessSession for InMemorySession {
    async fn fetch(&self, query: &PreparedQuery) -> Result<Vec<Row>, DataAccessError> {
        let key = query.text.to_string();
        self.note(format!("fetch {key}"));
        self.queries.lock().unwrap().push(query.clone());
        let rows = self
            .rows
            .get(&key)
            .ok_or_else(|| DataAccessError::UnknownNamedQuery(key.clone()))?;
        let skip = query.first_result.unwrap_or(0) as usize;
        let take = query.max_results.map_or(usize::MAX, |n| n as usize);
        Ok(rows.iter().skip(skip).take(take).cloned().collect())
    }

    async fn execute_update(&self, query: &PreparedQuery) -> Result<u64, DataAccessError> {
        self.note(format!("update {}", query.text));
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.rows.get(&query.text.to_string()).map_or(0, |rows| rows.len() as u64))
    }

    async fn prepare(
        &self,
        declaration: ProcedureDeclaration,
    ) -> Result<CompiledProcedure, DataAccessError> {
        self.prepares.fetch_add(1, Ordering::SeqCst);
        if !self.prepare_delay.is_zero() {
            tokio::time::sleep(self.prepare_delay).await;
        }
        if !self.procedures.contains_key(&declaration.name) {
            return Err(DataAccessError::Backend(format!(
                "procedure {} does not exist",
                declaration.name
            )));
        }
        self.declarations.lock().unwrap().push(declaration.clone());
        let statement = format!("CALL {}", declaration.name);
        Ok(CompiledProcedure::new(declaration, statement))
    }

    async fn call(
        &self,
        procedure: &CompiledProcedure,
        inputs: &[(String, Value)],
    ) -> Result<Row, DataAccessError> {
        let name = &procedure.declaration().name;
        self.note(format!("call {name}"));
        let body = self
            .procedures
            .get(name)
            .ok_or_else(|| DataAccessError::Backend(format!("procedure {name} does not exist")))?;
        Ok(body(inputs))
    }
}

/// A boundary that journals begin/commit/rollback around the work it runs.
pub struct RecordingBoundary {
    demarcation: Demarcation,
    journal: Journal,
}

impl RecordingBoundary {
    pub fn new(demarcation: Demarcation, journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            demarcation,
            journal,
        })
    }
}

#[async_trait]
impl TransactionalBoundary for RecordingBoundary {
    fn demarcation(&self) -> Demarcation {
        self.demarcation
    }

    async fn run<'a>(&'a self, work: UnitOfWork<'a>) -> Result<Value, DispatchError> {
        let label = match self.demarcation {
            Demarcation::ReadOnly => "read-only",
            Demarcation::ReadWrite => "read-write",
        };
        self.journal.lock().unwrap().push(format!("begin {label}"));
        let result = work.await;
        let outcome = if result.is_ok() { "commit" } else { "rollback" };
        self.journal.lock().unwrap().push(format!("{outcome} {label}"));
        result
    }
}

pub fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn entries(journal: &Journal) -> Vec<String> {
    journal.lock().unwrap().clone()
}

/// A dispatcher with both boundaries journaling into `journal`.
pub fn dispatcher(session: Arc<InMemorySession>, journal: &Journal) -> Dispatcher {
    Dispatcher::builder(session)
        .read_only_boundary(RecordingBoundary::new(Demarcation::ReadOnly, journal.clone()))
        .boundary(RecordingBoundary::new(Demarcation::ReadWrite, journal.clone()))
        .build()
        .unwrap()
}
