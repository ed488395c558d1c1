//! Knowledge Base module - facts and the store they live in.
//!
//! - **Variants**: per-type attribute schemas and uid rules
//! - **Facts**: immutable records built against a variant
//! - **Registry**: variant lookup by name, for decoding
//! - **Store**: the knowledge base contract and an in-memory implementation
//!
//! Facts refer to each other only by uid.

pub mod catalog;
mod error;
mod fact;
mod registry;
mod store;
mod value;
mod variant;

pub use catalog::names;
pub use error::*;
pub use fact::*;
pub use registry::*;
pub use store::*;
pub use value::*;
pub use variant::*;
