//! Mock content store for unit testing.
//!
//! This module provides a mock store that can be used in tests
//! without a running database.

use async_trait::async_trait;

use crate::error::StoreError;

use super::{ContentStore, StoreCounts};

/// Configuration for mock store behavior.
#[derive(Debug, Clone, Default)]
pub struct MockStoreConfig {
    /// Author count to return.
    pub authors: i64,
    /// Post count to return.
    pub posts: i64,
    /// Whether to fail the author count query.
    pub fail_authors: bool,
    /// Whether to fail the post count query.
    pub fail_posts: bool,
    /// Simulated query latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock content store for testing.
#[derive(Debug, Clone, Default)]
pub struct MockStore {
    config: MockStoreConfig,
}

impl MockStore {
    /// Create a new mock store with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock store with custom configuration.
    pub fn with_config(config: MockStoreConfig) -> Self {
        Self { config }
    }

    /// Create a mock store returning fixed counts.
    pub fn with_counts(authors: i64, posts: i64) -> Self {
        Self::with_config(MockStoreConfig {
            authors,
            posts,
            ..Default::default()
        })
    }
}

#[async_trait]
impl ContentStore for MockStore {
    async fn counts(&self) -> Result<StoreCounts, StoreError> {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }

        if self.config.fail_authors {
            return Err(StoreError::Unavailable(
                "mock author count failure".to_string(),
            ));
        }

        if self.config.fail_posts {
            return Err(StoreError::Unavailable(
                "mock post count failure".to_string(),
            ));
        }

        Ok(StoreCounts {
            authors: self.config.authors,
            posts: self.config.posts,
        })
    }
}
