//! compliance-core: Shared infrastructure for the GST compliance engine.
pub mod error;
pub mod observability;
pub mod retry;
pub mod store;
pub mod validate;

pub use async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;
pub use validator;

pub use error::{AuthorityError, ComplianceError};
pub use store::{Filter, MemoryStore, Record, RecordStore, Sort};
