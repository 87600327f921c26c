//! Consistency-aware query execution.

mod consistency;
mod executor;
mod query;
mod result;

pub use consistency::ScanConsistency;
pub use executor::QueryExecutor;
pub use query::{Query, QueryParameters};
pub use result::{META_CAS, META_ID, META_SCORE, QueryResult};
