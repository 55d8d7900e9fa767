//! feedpress adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `feed`: RSS/Atom feed source over HTTP
//! - `llm`: generative-model provider adapters (Gemini, stub)
//! - `store`: SQLite and in-memory post stores

mod feed_rss;
mod store_memory;
mod store_sqlite;

pub mod llm;

/// Re-exports for feed adapters
pub mod feed {
    pub use crate::feed_rss::RssFeedSource;
}

/// Re-exports for store adapters
pub mod store {
    pub use crate::store_memory::InMemoryPostStore;
    pub use crate::store_sqlite::SqlitePostStore;
}
