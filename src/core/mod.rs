pub mod error;

pub use error::{OdmError, Result, StoreError, StoreResult, TransactionError};
