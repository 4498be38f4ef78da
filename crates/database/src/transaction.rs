use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The transaction a boundary opened, shared with the session running inside it.
pub(crate) type TransactionSlot = Arc<Mutex<Option<Transaction<'static, Postgres>>>>;

tokio::task_local! {
    pub(crate) static CURRENT_TRANSACTION: TransactionSlot;
}

/// The slot of the boundary the current task runs in, if any.
pub(crate) fn current() -> Option<TransactionSlot> {
    CURRENT_TRANSACTION.try_with(Arc::clone).ok()
}
