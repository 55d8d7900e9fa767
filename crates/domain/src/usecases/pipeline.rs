//! Pipeline driver - sequences dedup, generation, validation, and persistence

use std::sync::Arc;
use std::time::Duration;

use crate::{
    model::{
        BilingualPost, Draft, FeedItem, GenerateRequest, NewPost, OutputMode, ProcessResult,
        SinglePost,
    },
    ports::{FeedSource, Generator, PostStore, StoreError},
    usecases::{
        generate::{GenerateWithRetry, GenerationError, RetryPolicy},
        normalize::normalize,
        validate::{LanguageValidator, ValidatorConfig, Verdict},
    },
};

/// Instruction appended to the request after a rejected bilingual attempt
const CORRECTIVE_DIRECTIVE: &str = "The previous draft mixed languages across fields. \
    Keep every *_ko field strictly in Korean and every *_en field strictly in English.";

/// One configured feed: a category label plus its URL
#[derive(Debug, Clone)]
pub struct FeedSpec {
    pub category: String,
    pub url: String,
}

/// How many items to take from each feed
#[derive(Debug, Clone, Copy)]
pub enum FetchMode {
    /// The first N items the feed yields
    TopN(usize),
    /// Only the most recent item
    Latest,
}

impl FetchMode {
    fn limit(&self) -> usize {
        match self {
            FetchMode::TopN(n) => (*n).max(1),
            FetchMode::Latest => 1,
        }
    }
}

/// Configuration for the pipeline driver
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Feeds in processing order
    pub feeds: Vec<FeedSpec>,
    pub mode: OutputMode,
    pub fetch_mode: FetchMode,
    /// Validation-driven regeneration budget, independent of the
    /// transient-failure tier
    pub quality_attempts: u32,
    /// Transient-failure tier policy
    pub retry: RetryPolicy,
    /// Pause after each successful persistence, for upstream rate limits
    pub inter_item_delay: Duration,
    /// Log what would be stored without touching the store
    pub dry_run: bool,
    pub validator: ValidatorConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            feeds: vec![],
            mode: OutputMode::FreeText,
            fetch_mode: FetchMode::TopN(4),
            quality_attempts: 3,
            retry: RetryPolicy::default(),
            inter_item_delay: Duration::from_secs(7),
            dry_run: false,
            validator: ValidatorConfig::default(),
        }
    }
}

/// Pipeline orchestrator.
///
/// Processing is strictly sequential: feeds in configured order, items in
/// feed order, one outstanding external call at a time. A single item's
/// failure never halts the run.
pub struct Pipeline<F, G, S>
where
    F: FeedSource + ?Sized,
    G: Generator + ?Sized,
    S: PostStore + ?Sized,
{
    feed_source: Arc<F>,
    generator: Arc<G>,
    store: Arc<S>,
    validator: LanguageValidator,
    config: PipelineConfig,
}

impl<F, G, S> Pipeline<F, G, S>
where
    F: FeedSource + ?Sized,
    G: Generator + ?Sized,
    S: PostStore + ?Sized,
{
    pub fn new(
        feed_source: Arc<F>,
        generator: Arc<G>,
        store: Arc<S>,
        config: PipelineConfig,
    ) -> Self {
        let validator = LanguageValidator::new(config.validator.clone());
        Self {
            feed_source,
            generator,
            store,
            validator,
            config,
        }
    }

    /// Run one full batch over all configured feeds.
    ///
    /// Returns one `(link, result)` pair per processed item. A feed that
    /// fails to fetch contributes nothing and does not abort the run.
    pub async fn run(&self) -> Vec<(String, ProcessResult)> {
        let mut results = Vec::new();

        for feed in &self.config.feeds {
            tracing::info!(category = %feed.category, url = %feed.url, "Fetching feed");

            let items = match self.feed_source.fetch_items(&feed.url).await {
                Ok(items) => items,
                Err(e) => {
                    tracing::error!(category = %feed.category, error = %e, "Failed to fetch feed, skipping source");
                    continue;
                }
            };

            let limit = self.config.fetch_mode.limit();
            for item in items.into_iter().take(limit) {
                let link = item.link.clone();
                let result = self.process_item(item, &feed.category).await;

                if matches!(result, ProcessResult::Stored { .. }) && !self.config.dry_run {
                    tokio::time::sleep(self.config.inter_item_delay).await;
                }

                results.push((link, result));
            }
        }

        results
    }

    /// Process a single candidate item end to end
    async fn process_item(&self, item: FeedItem, category: &str) -> ProcessResult {
        if item.link.trim().is_empty() {
            return ProcessResult::Skipped {
                reason: "Item has no link".to_string(),
            };
        }

        // Dedup gate. A lookup failure is logged and treated as "not a
        // duplicate"; the store's unique constraint catches the worst case.
        match self.store.find_by_url(&item.link).await {
            Ok(Some(_)) => {
                tracing::info!(link = %item.link, "Duplicate article, skipping");
                return ProcessResult::Skipped {
                    reason: "Already stored".to_string(),
                };
            }
            Err(e) => {
                tracing::warn!(link = %item.link, error = %e, "Dedup lookup failed, treating as new");
            }
            Ok(None) => {}
        }

        tracing::info!(title = %item.title, category = %category, "Analyzing new article");

        let post = match self.generate_accepted(&item, category).await {
            Ok(post) => post,
            Err(outcome) => return outcome,
        };

        if self.config.dry_run {
            tracing::info!(title = %post.title(), "[DRY RUN] Would store post");
            return ProcessResult::Stored {
                title: post.title().to_string(),
            };
        }

        match self.store.insert(&post).await {
            Ok(id) => {
                tracing::info!(post_id = %id, title = %post.title(), "Stored post");
                ProcessResult::Stored {
                    title: post.title().to_string(),
                }
            }
            Err(StoreError::Duplicate) => {
                tracing::info!(link = %item.link, "Post appeared concurrently, skipping");
                ProcessResult::Skipped {
                    reason: "Duplicate detected at insert".to_string(),
                }
            }
            Err(e) => {
                tracing::error!(link = %item.link, error = %e, "Failed to store post");
                ProcessResult::Failed {
                    error: format!("Store insert failed: {e}"),
                }
            }
        }
    }

    /// Quality-tier loop: regenerate until a draft passes validation or
    /// the attempt budget runs out.
    async fn generate_accepted(
        &self,
        item: &FeedItem,
        category: &str,
    ) -> Result<NewPost, ProcessResult> {
        let retry = GenerateWithRetry::new(self.generator.as_ref(), self.config.retry.clone());
        let attempts = self.config.quality_attempts.max(1);
        let mut corrective_note = None;
        let mut last_reason = String::new();

        for attempt in 1..=attempts {
            let request = GenerateRequest {
                item: item.clone(),
                category: category.to_string(),
                mode: self.config.mode,
                corrective_note: corrective_note.clone(),
            };

            let draft = match retry.generate(&request).await {
                Ok(draft) => draft,
                Err(e @ GenerationError::RetriesExhausted { .. }) => {
                    // The provider stayed unavailable through the whole
                    // transient budget; give up on this item.
                    tracing::error!(link = %item.link, error = %e, "Provider unavailable");
                    return Err(ProcessResult::Failed {
                        error: e.to_string(),
                    });
                }
                Err(GenerationError::Provider(e)) => {
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = attempts,
                        error = %e,
                        "Generation attempt failed"
                    );
                    last_reason = e.to_string();
                    continue;
                }
            };

            match self.accept(draft, item, category) {
                Ok(post) => return Ok(post),
                Err(reason) => {
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = attempts,
                        reason = %reason,
                        "Draft rejected, regenerating"
                    );
                    if self.config.mode == OutputMode::Bilingual {
                        corrective_note = Some(CORRECTIVE_DIRECTIVE.to_string());
                    }
                    last_reason = reason;
                }
            }
        }

        tracing::error!(link = %item.link, reason = %last_reason, "Abandoning item after rejected attempts");
        Err(ProcessResult::Abandoned {
            reason: last_reason,
        })
    }

    /// Decide accept/reject for one draft and shape it for persistence
    fn accept(&self, draft: Draft, item: &FeedItem, category: &str) -> Result<NewPost, String> {
        match draft {
            Draft::FreeText(text) => {
                let normalized = normalize(&text).map_err(|e| e.to_string())?;
                Ok(NewPost::Single(SinglePost {
                    title: normalized.title,
                    content: normalized.content,
                    category: category.to_string(),
                    original_url: item.link.clone(),
                }))
            }
            Draft::Bilingual(draft) => match self.validator.validate(&draft) {
                Verdict::Accepted => Ok(NewPost::Bilingual(BilingualPost::from_draft(
                    draft,
                    item.link.clone(),
                ))),
                Verdict::Rejected { reason } => Err(reason),
            },
        }
    }
}
