//! Persistent content store seam.
//!
//! The store itself is an external collaborator; this module only defines
//! the seam the health aggregator depends on, a Postgres implementation,
//! and an in-memory mock for tests.

use async_trait::async_trait;

use crate::error::StoreError;

pub mod mock;
pub mod postgres;

pub use mock::{MockStore, MockStoreConfig};
pub use postgres::PgStore;

/// Aggregate counts backing the health check. Computed per request, never
/// cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    /// Number of authors.
    pub authors: i64,
    /// Number of posts.
    pub posts: i64,
}

/// Read access to the hosted content aggregates.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Count authors and posts. The author query runs first; its failure
    /// aborts the whole operation.
    async fn counts(&self) -> Result<StoreCounts, StoreError>;
}
