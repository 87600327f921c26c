//! Everything an application touching entities and transactions usually needs.

pub use crate::connection::ClientConfig;
pub use crate::core::{OdmError, Result};
pub use crate::document::Document;
pub use crate::facade::DocumentClient;
pub use crate::mapping::{DocumentMetadata, Entity, EntityMetadata, ExpiryUnit, PropertySource};
pub use crate::query::{Query, ScanConsistency};
pub use crate::transaction::{is_in_transaction, TransactionHandle};
