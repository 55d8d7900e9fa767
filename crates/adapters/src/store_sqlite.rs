//! SQLite post store implementation

use async_trait::async_trait;
use feedpress_domain::{NewPost, PostStore, StoreError, StoredPost};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use time::OffsetDateTime;
use uuid::Uuid;

/// SQLite-backed post store.
///
/// `original_url` carries a UNIQUE constraint, which closes the
/// check-then-act window between the dedup lookup and the insert: a
/// violated constraint surfaces as `StoreError::Duplicate`.
pub struct SqlitePostStore {
    pool: SqlitePool,
}

impl SqlitePostStore {
    /// Create a new SQLite post store, initializing the database if needed
    pub async fn new(db_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db_path = db_path.as_ref();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Database(format!("Failed to create directory: {}", e)))?;
        }

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing)
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS posts (
                id TEXT PRIMARY KEY,
                category TEXT NOT NULL,
                slug TEXT,
                title TEXT,
                content TEXT,
                title_ko TEXT,
                content_ko TEXT,
                title_en TEXT,
                content_en TEXT,
                original_url TEXT NOT NULL UNIQUE,
                views INTEGER NOT NULL DEFAULT 0,
                likes INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn map_insert_error(e: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate;
            }
        }
        StoreError::Database(e.to_string())
    }
}

#[async_trait]
impl PostStore for SqlitePostStore {
    async fn find_by_url(&self, original_url: &str) -> Result<Option<StoredPost>, StoreError> {
        let row: Option<(String, String, String)> = sqlx::query_as(
            "SELECT id, original_url, created_at FROM posts WHERE original_url = ?",
        )
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        match row {
            Some((id, original_url, created_at_str)) => {
                let id =
                    Uuid::parse_str(&id).map_err(|e| StoreError::Serialization(e.to_string()))?;

                let created_at = OffsetDateTime::parse(
                    &created_at_str,
                    &time::format_description::well_known::Rfc3339,
                )
                .map_err(|e| StoreError::Serialization(e.to_string()))?;

                Ok(Some(StoredPost {
                    id,
                    original_url,
                    created_at,
                }))
            }
            None => Ok(None),
        }
    }

    async fn insert(&self, post: &NewPost) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let created_at = OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        match post {
            NewPost::Single(p) => {
                sqlx::query(
                    r#"
                    INSERT INTO posts (id, category, title, content, original_url, created_at)
                    VALUES (?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(id.to_string())
                .bind(&p.category)
                .bind(&p.title)
                .bind(&p.content)
                .bind(&p.original_url)
                .bind(&created_at)
                .execute(&self.pool)
                .await
                .map_err(Self::map_insert_error)?;
            }
            NewPost::Bilingual(p) => {
                sqlx::query(
                    r#"
                    INSERT INTO posts
                    (id, category, slug, title_ko, content_ko, title_en, content_en,
                     original_url, views, likes, created_at)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(id.to_string())
                .bind(&p.category)
                .bind(&p.slug)
                .bind(&p.title_ko)
                .bind(&p.content_ko)
                .bind(&p.title_en)
                .bind(&p.content_en)
                .bind(&p.original_url)
                .bind(p.views)
                .bind(p.likes)
                .bind(&created_at)
                .execute(&self.pool)
                .await
                .map_err(Self::map_insert_error)?;
            }
        }

        Ok(id)
    }
}
