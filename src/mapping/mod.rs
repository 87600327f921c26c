//! Entity mapping: per-type document metadata and the entity <-> document converter.

mod converter;
mod error;
mod expiry;
mod metadata;
mod properties;

pub use converter::{DEFAULT_TYPE_KEY, Entity, MappingConverter};
pub use error::{MappingError, MappingResult};
pub use expiry::{Expiry, ExpiryUnit, TTL_IN_SECONDS_INCLUSIVE_END};
pub use metadata::{DocumentMetadata, EntityMetadata};
pub use properties::PropertySource;
