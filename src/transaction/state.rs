// ============================================================================
// Transaction State
// ============================================================================
//
// A transaction moves Active -> Committed or Active -> Aborted and never
// back. While active it collects staged mutations that are applied to the
// store only on commit.
//
// ============================================================================

use crate::core::TransactionError;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

/// Global transaction ID counter
static NEXT_TXN_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(pub u64);

impl TransactionId {
    pub fn new() -> Self {
        TransactionId(NEXT_TXN_ID.fetch_add(1, Ordering::SeqCst))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "txn_{}", self.0)
    }
}

/// Transaction lifecycle
///
/// ```text
/// Active ──commit──> Committed
///   │
///   └──rollback──> Aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Active,
    Committed,
    Aborted,
}

impl TransactionState {
    pub fn is_active(&self) -> bool {
        matches!(self, TransactionState::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Committed | TransactionState::Aborted
        )
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionState::Active => write!(f, "ACTIVE"),
            TransactionState::Committed => write!(f, "COMMITTED"),
            TransactionState::Aborted => write!(f, "ABORTED"),
        }
    }
}

/// A write waiting for commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedMutation {
    Insert {
        id: String,
        content: String,
        expiry: u32,
    },
    Replace {
        id: String,
        content: String,
        expiry: u32,
        cas: Option<u64>,
    },
    Remove {
        id: String,
        cas: Option<u64>,
    },
}

impl StagedMutation {
    pub fn id(&self) -> &str {
        match self {
            StagedMutation::Insert { id, .. }
            | StagedMutation::Replace { id, .. }
            | StagedMutation::Remove { id, .. } => id,
        }
    }
}

/// What a read inside the transaction should see for a key it has written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedRead {
    Written(String),
    Removed,
}

#[derive(Debug)]
struct Inner {
    id: TransactionId,
    attempt_id: Uuid,
    started_at: DateTime<Utc>,
    state: Mutex<TransactionState>,
    staged: Mutex<Vec<StagedMutation>>,
}

/// Shared handle to one transaction attempt. Clones refer to the same attempt.
#[derive(Debug, Clone)]
pub struct TransactionHandle {
    inner: Arc<Inner>,
}

impl TransactionHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                id: TransactionId::new(),
                attempt_id: Uuid::new_v4(),
                started_at: Utc::now(),
                state: Mutex::new(TransactionState::Active),
                staged: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.inner.id
    }

    pub fn attempt_id(&self) -> Uuid {
        self.inner.attempt_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    pub fn state(&self) -> TransactionState {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Queue a mutation for commit.
    pub fn stage(&self, mutation: StagedMutation) -> Result<(), TransactionError> {
        let state = self.inner.state.lock()?;
        if !state.is_active() {
            return Err(TransactionError::NotActive(self.inner.id.to_string()));
        }
        self.inner.staged.lock()?.push(mutation);
        Ok(())
    }

    /// Latest staged write for `id`, if this transaction has touched it.
    pub fn staged_read(&self, id: &str) -> Option<StagedRead> {
        let staged = self
            .inner
            .staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        staged.iter().rev().find(|m| m.id() == id).map(|m| match m {
            StagedMutation::Insert { content, .. } | StagedMutation::Replace { content, .. } => {
                StagedRead::Written(content.clone())
            }
            StagedMutation::Remove { .. } => StagedRead::Removed,
        })
    }

    pub fn staged_count(&self) -> usize {
        self.inner
            .staged
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub(crate) fn take_staged(&self) -> Vec<StagedMutation> {
        std::mem::take(
            &mut *self
                .inner
                .staged
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    /// Move to a terminal state. Returns `false` if the transaction had already finished.
    pub(crate) fn finish(&self, outcome: TransactionState) -> bool {
        let mut state = self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if state.is_terminal() {
            return false;
        }
        *state = outcome;
        true
    }
}

impl Default for TransactionHandle {
    fn default() -> Self {
        Self::new()
    }
}
