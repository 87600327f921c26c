//! JSON Translation Module
//!
//! Turns [`Document`](crate::document::Document)s into JSON text and back.
//!
//! # Architecture
//!
//! - `codec.rs` - `TranslationService` contract and its serde_json implementation
//! - `error.rs` - Domain-specific errors

mod codec;
mod error;

pub use codec::{JsonTranslationService, TranslationService};
pub use error::{JsonError, JsonResult};
