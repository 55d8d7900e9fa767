//! Domain models and value objects

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A candidate article from a syndication feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    /// Article headline as published by the feed
    pub title: String,
    /// Canonical article URL, used as the dedup key
    pub link: String,
    /// Feed-provided summary or snippet, often truncated
    pub summary: Option<String>,
    /// Publication time, when the feed provides one
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

/// Output shape requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Single markdown string with an embedded title line
    #[default]
    FreeText,
    /// Fixed-schema JSON with Korean and English field pairs
    Bilingual,
}

/// One generation request, derived from a feed item plus the style template
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub item: FeedItem,
    /// Category label of the feed the item came from
    pub category: String,
    pub mode: OutputMode,
    /// Extra instruction appended after a rejected attempt
    pub corrective_note: Option<String>,
}

/// Raw generation result, before validation or normalization
#[derive(Debug, Clone)]
pub enum Draft {
    /// Markdown text: title line followed by body
    FreeText(String),
    /// Parsed structured output
    Bilingual(BilingualDraft),
}

/// The six-field bilingual contract the structured mode must produce.
///
/// Fields default to empty strings on deserialization so a missing field
/// becomes a validation rejection rather than a parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BilingualDraft {
    pub category: String,
    pub slug: String,
    pub title_ko: String,
    pub content_ko: String,
    pub title_en: String,
    pub content_en: String,
}

/// A single-language post ready for persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinglePost {
    pub title: String,
    pub content: String,
    pub category: String,
    pub original_url: String,
}

/// A bilingual post ready for persistence. View and like counters are
/// initialized here and never touched again by this pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BilingualPost {
    pub category: String,
    pub slug: String,
    pub original_url: String,
    pub title_ko: String,
    pub content_ko: String,
    pub title_en: String,
    pub content_en: String,
    pub views: i64,
    pub likes: i64,
}

impl BilingualPost {
    /// Build a persistable post from an accepted draft
    pub fn from_draft(draft: BilingualDraft, original_url: String) -> Self {
        Self {
            category: draft.category,
            slug: draft.slug,
            original_url,
            title_ko: draft.title_ko,
            content_ko: draft.content_ko,
            title_en: draft.title_en,
            content_en: draft.content_en,
            views: 0,
            likes: 0,
        }
    }
}

/// An accepted post handed to the persistence gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NewPost {
    Single(SinglePost),
    Bilingual(BilingualPost),
}

impl NewPost {
    /// The dedup key of the stored record
    pub fn original_url(&self) -> &str {
        match self {
            NewPost::Single(p) => &p.original_url,
            NewPost::Bilingual(p) => &p.original_url,
        }
    }

    /// Display title, used only for logging
    pub fn title(&self) -> &str {
        match self {
            NewPost::Single(p) => &p.title,
            NewPost::Bilingual(p) => &p.title_ko,
        }
    }

    pub fn category(&self) -> &str {
        match self {
            NewPost::Single(p) => &p.category,
            NewPost::Bilingual(p) => &p.category,
        }
    }
}

/// Reference to an already-stored post, as returned by the dedup lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredPost {
    pub id: Uuid,
    pub original_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Terminal state of one pipeline item
#[derive(Debug)]
pub enum ProcessResult {
    /// Post was accepted and persisted (or would have been, in dry-run)
    Stored { title: String },
    /// Item was skipped before or instead of persistence
    Skipped { reason: String },
    /// Every quality-tier attempt was rejected; nothing was stored
    Abandoned { reason: String },
    /// Generation or persistence failed terminally for this item
    Failed { error: String },
}
