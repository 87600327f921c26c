//! Ambient transaction context.
//!
//! The active [`TransactionHandle`] lives in a tokio task-local slot rather
//! than thread-local storage. A task can be polled on any worker of a
//! multi-threaded runtime, and the slot moves with it. Work handed to a new
//! task must go through [`spawn`] or [`propagate`] to keep the context.

use super::state::TransactionHandle;
use crate::core::TransactionError;
use futures::future::Either;
use std::future::Future;
use tokio::task::JoinHandle;

tokio::task_local! {
    static CURRENT_TRANSACTION: TransactionHandle;
}

/// The active transaction of the current task, if any.
///
/// A handle that has already committed or rolled back is treated as absent.
pub fn current() -> Option<TransactionHandle> {
    CURRENT_TRANSACTION
        .try_with(|handle| handle.clone())
        .ok()
        .filter(TransactionHandle::is_active)
}

pub fn is_in_transaction() -> bool {
    current().is_some()
}

/// Asynchronous form of [`current`]. Resolves on first poll.
pub async fn check_for_transaction() -> Option<TransactionHandle> {
    current()
}

/// Pass `value` through when transaction presence matches `expect_present`.
pub async fn with_transaction_check<T>(expect_present: bool, value: T) -> Result<T, TransactionError> {
    let present = check_for_transaction().await.is_some();
    if present == expect_present {
        Ok(value)
    } else {
        Err(TransactionError::ContextMismatch {
            expected: describe(expect_present).to_string(),
            actual: describe(present).to_string(),
        })
    }
}

fn describe(present: bool) -> &'static str {
    if present {
        "inside-transaction"
    } else {
        "outside-transaction"
    }
}

/// Fail when called inside a transaction. Used to guard operations the
/// transactional path cannot stage.
pub fn verify_not_in_transaction(operation: &str) -> Result<(), TransactionError> {
    if is_in_transaction() {
        Err(TransactionError::NotAllowedInTransaction(operation.to_string()))
    } else {
        Ok(())
    }
}

/// Run `future` with `handle` as its transaction context.
pub async fn scope<F: Future>(handle: TransactionHandle, future: F) -> F::Output {
    CURRENT_TRANSACTION.scope(handle, future).await
}

/// Run the synchronous call chain `f` with `handle` as its transaction context.
pub fn scope_sync<R>(handle: TransactionHandle, f: impl FnOnce() -> R) -> R {
    CURRENT_TRANSACTION.sync_scope(handle, f)
}

/// Bind the caller's transaction context, as of now, to a deferred future.
///
/// The returned future can be polled later, from any task, and still sees
/// the transaction that was active when `propagate` was called.
pub fn propagate<F: Future>(future: F) -> impl Future<Output = F::Output> {
    match CURRENT_TRANSACTION.try_with(|handle| handle.clone()) {
        Ok(handle) => Either::Left(CURRENT_TRANSACTION.scope(handle, future)),
        Err(_) => Either::Right(future),
    }
}

/// `tokio::spawn` that carries the caller's transaction context into the new task.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(propagate(future))
}
