//! Remote store adapters for modelgate.
//!
//! Two seams hide the managed services behind traits: [`DocumentStore`]
//! (source table) and [`ObjectStore`] (model registry). The official MongoDB
//! and S3 clients implement them for production; [`MemoryDocumentStore`] and
//! [`MemoryObjectStore`] back tests and local runs.
//!
//! Remote calls run under a bounded [`RetryPolicy`]: transient failures are
//! retried with exponential backoff, semantic failures are not, and the
//! pass/fail contract the pipeline driver sees is unchanged by retrying.

mod document;
mod error;
mod memory;
mod object;
mod retry;

pub use document::{DocumentStore, MongoDocumentStore, Record};
pub use error::StoreError;
pub use memory::{MemoryDocumentStore, MemoryObjectStore};
pub use object::{ObjectStore, S3ObjectStore};
pub use retry::RetryPolicy;
