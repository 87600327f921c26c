// ============================================================================
// Transaction Manager
// ============================================================================

use super::context;
use super::state::{StagedMutation, TransactionHandle, TransactionState};
use crate::core::{OdmError, Result, StoreError, TransactionError};
use crate::storage::DocumentStore;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct TransactionManager {
    store: Arc<dyn DocumentStore>,
}

impl TransactionManager {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn begin(&self) -> TransactionHandle {
        let handle = TransactionHandle::new();
        debug!(txn = %handle.id(), attempt = %handle.attempt_id(), "transaction started");
        handle
    }

    /// Run `block` as a transaction.
    ///
    /// The block's future is scoped with the new handle, so everything it
    /// awaits (and everything it hands to [`context::spawn`]) observes the
    /// transaction. `Ok` commits the staged mutations, `Err` discards them.
    /// Called inside an active transaction, the block joins the outer one and
    /// nothing is committed until the outer block finishes.
    pub async fn run<F, Fut, T>(&self, block: F) -> Result<T>
    where
        F: FnOnce(TransactionHandle) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(outer) = context::current() {
            debug!(txn = %outer.id(), "joining active transaction");
            return block(outer).await;
        }

        let handle = self.begin();
        let outcome = context::scope(handle.clone(), block(handle.clone())).await;
        match outcome {
            Ok(value) => {
                self.commit(&handle).await?;
                Ok(value)
            }
            Err(err) => {
                self.rollback(&handle);
                Err(err)
            }
        }
    }

    /// Apply every staged mutation to the store.
    ///
    /// Guards (existence and CAS) are checked for all mutations before any is
    /// applied; a failed guard aborts the transaction with nothing written.
    pub async fn commit(&self, handle: &TransactionHandle) -> Result<()> {
        if !handle.is_active() {
            return Err(TransactionError::NotActive(handle.id().to_string()).into());
        }

        let staged = handle.take_staged();
        if let Err(err) = self.validate(&staged).await {
            warn!(txn = %handle.id(), error = %err, "transaction guard failed, rolling back");
            handle.finish(TransactionState::Aborted);
            return Err(commit_failed(handle, err));
        }

        for mutation in staged.iter() {
            let applied = match mutation {
                StagedMutation::Insert { id, content, expiry } => self
                    .store
                    .insert(id, content.clone(), *expiry)
                    .await
                    .map(|_| ()),
                StagedMutation::Replace {
                    id,
                    content,
                    expiry,
                    cas,
                } => self
                    .store
                    .replace(id, content.clone(), *expiry, *cas)
                    .await
                    .map(|_| ()),
                StagedMutation::Remove { id, cas } => self.store.remove(id, *cas).await,
            };
            if let Err(err) = applied {
                warn!(txn = %handle.id(), id = mutation.id(), error = %err, "commit interrupted");
                handle.finish(TransactionState::Aborted);
                return Err(commit_failed(handle, err));
            }
        }

        handle.finish(TransactionState::Committed);
        debug!(txn = %handle.id(), mutations = staged.len(), "transaction committed");
        Ok(())
    }

    pub fn rollback(&self, handle: &TransactionHandle) {
        let discarded = handle.take_staged().len();
        if handle.finish(TransactionState::Aborted) {
            debug!(txn = %handle.id(), discarded, "transaction rolled back");
        }
    }

    async fn validate(&self, staged: &[StagedMutation]) -> std::result::Result<(), StoreError> {
        // each key is checked against the state left by earlier staged
        // mutations, not only against what the store holds now
        let mut keys: HashMap<&str, KeyState> = HashMap::new();
        for mutation in staged {
            let id = mutation.id();
            let state = match keys.get(id) {
                Some(state) => *state,
                None => match self.store.get(id).await? {
                    Some(doc) => KeyState::Present(Some(doc.cas)),
                    None => KeyState::Absent,
                },
            };

            let next = match (mutation, state) {
                (StagedMutation::Insert { .. }, KeyState::Present(_)) => {
                    return Err(StoreError::DocumentExists(id.to_string()));
                }
                (StagedMutation::Insert { .. }, KeyState::Absent) => KeyState::Present(None),
                (_, KeyState::Absent) => {
                    return Err(StoreError::DocumentNotFound(id.to_string()));
                }
                (
                    StagedMutation::Replace { cas: Some(expected), .. }
                    | StagedMutation::Remove { cas: Some(expected), .. },
                    KeyState::Present(current),
                ) if current != Some(*expected) => {
                    return Err(StoreError::CasMismatch(id.to_string()));
                }
                (StagedMutation::Replace { .. }, KeyState::Present(_)) => KeyState::Present(None),
                (StagedMutation::Remove { .. }, KeyState::Present(_)) => KeyState::Absent,
            };
            keys.insert(id, next);
        }
        Ok(())
    }
}

/// What a key looks like after the staged mutations seen so far.
/// A present key's cas is unknown once this transaction has written it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyState {
    Absent,
    Present(Option<u64>),
}

fn commit_failed(handle: &TransactionHandle, err: StoreError) -> OdmError {
    TransactionError::CommitFailed {
        id: handle.id().to_string(),
        reason: err.to_string(),
    }
    .into()
}
