use crate::transaction::{self, CURRENT_TRANSACTION};
use async_trait::async_trait;
use core_types::{
    DataAccessError, Demarcation, DispatchError, TransactionalBoundary, UnitOfWork, Value,
};
use sqlx::PgPool;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Runs each unit of work in its own PostgreSQL transaction.
///
/// The transaction commits when the work succeeds and rolls back when it
/// fails. Work that already runs inside a boundary joins the open
/// transaction instead of starting another.
#[derive(Debug, Clone)]
pub struct PgBoundary {
    pool: PgPool,
    demarcation: Demarcation,
}

impl PgBoundary {
    pub fn read_only(pool: PgPool) -> Self {
        Self {
            pool,
            demarcation: Demarcation::ReadOnly,
        }
    }

    pub fn read_write(pool: PgPool) -> Self {
        Self {
            pool,
            demarcation: Demarcation::ReadWrite,
        }
    }
}

#[async_trait]
impl TransactionalBoundary for PgBoundary {
    fn demarcation(&self) -> Demarcation {
        self.demarcation
    }

    async fn run<'a>(&'a self, work: UnitOfWork<'a>) -> Result<Value, DispatchError> {
        if transaction::current().is_some() {
            return work.await;
        }

        let mut tx = self.pool.begin().await.map_err(DataAccessError::from)?;
        if self.demarcation == Demarcation::ReadOnly {
            sqlx::query("SET TRANSACTION READ ONLY")
                .execute(&mut *tx)
                .await
                .map_err(DataAccessError::from)?;
        }
        let slot = Arc::new(Mutex::new(Some(tx)));
        let result = CURRENT_TRANSACTION.scope(Arc::clone(&slot), work).await;

        let Some(tx) = slot.lock().await.take() else {
            return result;
        };
        match result {
            Ok(value) => {
                tx.commit().await.map_err(DataAccessError::from)?;
                tracing::trace!(demarcation = ?self.demarcation, "Transaction committed");
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = tx.rollback().await {
                    tracing::warn!(error = %rollback, "Rollback failed");
                }
                tracing::debug!(demarcation = ?self.demarcation, error = %e, "Transaction rolled back");
                Err(e)
            }
        }
    }
}
