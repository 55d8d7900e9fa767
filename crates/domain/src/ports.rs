//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Draft, FeedItem, GenerateRequest, NewPost, StoredPost};

/// Error type for feed source operations
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP error: status {0}")]
    Http(u16),
    #[error("Feed parse error: {0}")]
    Parse(String),
}

/// Port for fetching candidate items from a syndication feed
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the items of one feed, in the order the feed yields them.
    /// A failure here is fatal for that source only.
    async fn fetch_items(&self, feed_url: &str) -> Result<Vec<FeedItem>, FeedError>;
}

/// Error type for generation provider operations.
///
/// The transient/fatal distinction is decided once, at the client boundary,
/// so callers never re-parse error messages.
#[derive(Debug, Clone, Error)]
pub enum GenerateError {
    #[error("Provider overloaded: {0}")]
    Overloaded(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Provider API error: {0}")]
    Api(String),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
    #[error("Timeout")]
    Timeout,
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GenerateError {
    /// Whether the transient-failure retry tier should retry this error
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerateError::Overloaded(_) | GenerateError::RateLimited)
    }
}

/// Port for the generative-model provider.
///
/// Implementations issue exactly one provider request per invocation;
/// retries are the caller's responsibility.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<Draft, GenerateError>;
}

/// Error type for post store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("A post with this original_url already exists")]
    Duplicate,
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Port for the persistent post store
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Look up an existing post by its canonical article URL
    async fn find_by_url(&self, original_url: &str) -> Result<Option<StoredPost>, StoreError>;

    /// Insert an accepted post. Returns `StoreError::Duplicate` when the
    /// unique constraint on `original_url` is violated.
    async fn insert(&self, post: &NewPost) -> Result<Uuid, StoreError>;
}
