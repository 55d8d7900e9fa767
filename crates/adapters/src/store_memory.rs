//! In-memory post store for testing and offline mode

use async_trait::async_trait;
use feedpress_domain::{NewPost, PostStore, StoreError, StoredPost};
use std::collections::HashMap;
use std::sync::RwLock;
use time::OffsetDateTime;
use uuid::Uuid;

/// In-memory post store implementation, keyed by `original_url`
pub struct InMemoryPostStore {
    posts: RwLock<HashMap<String, StoredPost>>,
}

impl InMemoryPostStore {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored posts
    pub fn len(&self) -> usize {
        self.posts.read().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryPostStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostStore for InMemoryPostStore {
    async fn find_by_url(&self, original_url: &str) -> Result<Option<StoredPost>, StoreError> {
        let posts = self
            .posts
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(posts.get(original_url).cloned())
    }

    async fn insert(&self, post: &NewPost) -> Result<Uuid, StoreError> {
        let mut posts = self
            .posts
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let url = post.original_url().to_string();
        if posts.contains_key(&url) {
            return Err(StoreError::Duplicate);
        }

        let record = StoredPost {
            id: Uuid::new_v4(),
            original_url: url.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        let id = record.id;
        posts.insert(url, record);

        Ok(id)
    }
}
