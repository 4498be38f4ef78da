use core_types::{DispatchError, TransactionalBoundary, UnitOfWork, Value};
use std::sync::Arc;

/// Chooses the transactional boundary a unit of work runs in.
///
/// The read-only boundary is used when the caller hints read-only and one is
/// configured; otherwise the general boundary when configured; otherwise the
/// work runs directly.
#[derive(Clone, Default)]
pub struct ExecutionWrapper {
    read_only: Option<Arc<dyn TransactionalBoundary>>,
    general: Option<Arc<dyn TransactionalBoundary>>,
}

impl ExecutionWrapper {
    pub fn new(
        read_only: Option<Arc<dyn TransactionalBoundary>>,
        general: Option<Arc<dyn TransactionalBoundary>>,
    ) -> Self {
        Self { read_only, general }
    }

    /// The boundary a call with the given hint would run in, if any.
    pub fn select(&self, read_only_hint: bool) -> Option<&dyn TransactionalBoundary> {
        match (&self.read_only, &self.general) {
            (Some(read_only), _) if read_only_hint => Some(read_only.as_ref()),
            (_, Some(general)) => Some(general.as_ref()),
            _ => None,
        }
    }

    pub async fn run<'a>(
        &'a self,
        read_only_hint: bool,
        work: UnitOfWork<'a>,
    ) -> Result<Value, DispatchError> {
        match self.select(read_only_hint) {
            Some(boundary) => {
                tracing::trace!(demarcation = ?boundary.demarcation(), "Running inside boundary");
                boundary.run(work).await
            }
            None => work.await,
        }
    }
}
