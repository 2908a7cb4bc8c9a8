//! Content management module.
//!
//! This module provides:
//! - BlockStore: persistence trait, with in-memory and PostgreSQL backends
//! - ContentTypeRegistry: content type descriptors by key and route
//! - VersioningPolicy: draft, publish, and revert for versioned types

mod memory_store;
mod pg_store;
pub mod store;
mod type_registry;
mod versioning;

pub use memory_store::MemoryBlockStore;
pub use pg_store::PgBlockStore;
pub use store::{BlockStore, ListOptions, Paginated};
pub use type_registry::ContentTypeRegistry;
pub use versioning::VersioningPolicy;
