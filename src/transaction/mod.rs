// ============================================================================
// Transaction Module
// ============================================================================
//
// Transactions stage their mutations in a handle that travels with the
// logical task (not the OS thread), so any code running inside the
// transactional block can find it without the handle being passed around.
//
// - state.rs   : ids, lifecycle states, staged mutations, the shared handle
// - context.rs : task-local propagation and presence checks
// - manager.rs : begin / commit / rollback around a transactional block
//
// ============================================================================

pub mod context;
pub mod manager;
pub mod state;

pub use context::{
    check_for_transaction, current, is_in_transaction, propagate, scope, scope_sync, spawn,
    verify_not_in_transaction, with_transaction_check,
};
pub use manager::TransactionManager;
pub use state::{StagedMutation, StagedRead, TransactionHandle, TransactionId, TransactionState};
