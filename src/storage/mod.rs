pub mod engine;
pub mod memory;
pub mod request;

pub use engine::{DocumentStore, StoredDocument};
pub use memory::InMemoryStore;
pub use request::{Predicate, PredicateValue, QueryRequest};
