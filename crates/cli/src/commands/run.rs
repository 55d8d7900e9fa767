//! Run command - one batch over all configured feeds

use anyhow::{Context, Result, bail};
use feedpress_adapters::{feed::RssFeedSource, store::SqlitePostStore};
use feedpress_domain::{
    Generator, ProcessResult,
    usecases::{FeedSpec, FetchMode, Pipeline, PipelineConfig},
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::args::RunArgs;
use crate::commands::generate::{
    build_generator, parse_output_mode, retry_policy_from_config, validator_config_from_config,
};
use crate::config::AppConfig;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    let dry_run = args.dry_run || config.general.dry_run;

    tracing::info!(
        dry_run = dry_run,
        feeds = config.feeds.len(),
        provider = %config.llm.provider,
        "Starting feedpress run"
    );

    // Build dependencies
    let store = Arc::new(
        SqlitePostStore::new(&config.general.db_path)
            .await
            .context("Failed to initialize SQLite post store")?,
    );

    let feed_source = Arc::new(RssFeedSource::default());
    let generator: Arc<dyn Generator> = Arc::from(build_generator(&config)?);

    let pipeline_config = pipeline_config_from_config(&config, dry_run, args.limit)?;

    let pipeline = Pipeline::new(feed_source, generator, store, pipeline_config);

    let results = pipeline.run().await;
    tracing::info!(processed = results.len(), "Batch complete");

    let mut stored = 0usize;
    let mut failed = 0usize;
    for (link, result) in results {
        match result {
            ProcessResult::Stored { title } => {
                stored += 1;
                tracing::info!(link = %link, title = %title, "Stored");
            }
            ProcessResult::Skipped { reason } => {
                tracing::debug!(link = %link, reason = %reason, "Skipped");
            }
            ProcessResult::Abandoned { reason } => {
                tracing::warn!(link = %link, reason = %reason, "Abandoned");
            }
            ProcessResult::Failed { error } => {
                failed += 1;
                tracing::error!(link = %link, error = %error, "Failed");
            }
        }
    }

    tracing::info!(stored = stored, failed = failed, "feedpress run completed");
    Ok(())
}

fn pipeline_config_from_config(
    config: &AppConfig,
    dry_run: bool,
    limit: Option<usize>,
) -> Result<PipelineConfig> {
    let feeds = config
        .feeds
        .iter()
        .map(|f| FeedSpec {
            category: f.category.clone(),
            url: f.url.clone(),
        })
        .collect();

    Ok(PipelineConfig {
        feeds,
        mode: parse_output_mode(&config.pipeline.mode)?,
        fetch_mode: parse_fetch_mode(config, limit)?,
        quality_attempts: config.pipeline.quality_attempts.max(1),
        retry: retry_policy_from_config(config),
        inter_item_delay: Duration::from_secs(config.general.inter_item_delay_secs),
        dry_run,
        validator: validator_config_from_config(config),
    })
}

fn parse_fetch_mode(config: &AppConfig, limit: Option<usize>) -> Result<FetchMode> {
    match config.pipeline.fetch_mode.trim() {
        "top_n" => {
            let n = limit.unwrap_or(config.pipeline.items_per_feed);
            Ok(FetchMode::TopN(n.max(1)))
        }
        "latest" => Ok(FetchMode::Latest),
        other => bail!("Invalid fetch mode: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_config_maps_fetch_modes() {
        let mut config = AppConfig::default();
        config.pipeline.fetch_mode = "latest".to_string();

        let pipeline_config = pipeline_config_from_config(&config, false, None).unwrap();
        assert!(matches!(pipeline_config.fetch_mode, FetchMode::Latest));

        config.pipeline.fetch_mode = "top_n".to_string();
        config.pipeline.items_per_feed = 2;
        let pipeline_config = pipeline_config_from_config(&config, false, None).unwrap();
        assert!(matches!(pipeline_config.fetch_mode, FetchMode::TopN(2)));
    }

    #[test]
    fn limit_flag_overrides_items_per_feed() {
        let mut config = AppConfig::default();
        config.pipeline.items_per_feed = 4;

        let pipeline_config = pipeline_config_from_config(&config, false, Some(2)).unwrap();
        assert!(matches!(pipeline_config.fetch_mode, FetchMode::TopN(2)));

        let pipeline_config = pipeline_config_from_config(&config, false, None).unwrap();
        assert!(matches!(pipeline_config.fetch_mode, FetchMode::TopN(4)));
    }

    #[test]
    fn unknown_fetch_mode_is_rejected() {
        let mut config = AppConfig::default();
        config.pipeline.fetch_mode = "newest_first".to_string();

        assert!(pipeline_config_from_config(&config, false, None).is_err());
    }
}
