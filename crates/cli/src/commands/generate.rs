//! Generate command - one-shot post generation

use anyhow::{Context, Result, bail};
use feedpress_adapters::llm::{GeminiGenerator, ProviderConfig, StubGenerator};
use feedpress_domain::usecases::{GenerateWithRetry, LanguageValidator, RetryPolicy, ValidatorConfig, Verdict, normalize};
use feedpress_domain::{
    BilingualPost, Draft, FeedItem, GenerateRequest, Generator, NewPost, OutputMode, SinglePost,
};
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

use crate::args::GenerateArgs;
use crate::config::AppConfig;

pub async fn execute(args: GenerateArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;

    if args.link.trim().is_empty() {
        bail!("No article link provided");
    }

    let mode = parse_output_mode(&config.pipeline.mode)?;

    let item = FeedItem {
        title: args.title.clone(),
        link: args.link.clone(),
        summary: args.summary.clone(),
        published_at: None,
    };

    tracing::info!(
        title = %item.title,
        category = %args.category,
        mode = ?mode,
        "Generating post"
    );

    let generator = build_generator(&config)?;
    let retry = GenerateWithRetry::new(&*generator, retry_policy_from_config(&config));

    let request = GenerateRequest {
        item: item.clone(),
        category: args.category.clone(),
        mode,
        corrective_note: None,
    };

    let draft = retry.generate(&request).await.context("Generation failed")?;

    let post = match draft {
        Draft::FreeText(text) => {
            let normalized = normalize(&text).context("Draft has no usable title")?;
            NewPost::Single(SinglePost {
                title: normalized.title,
                content: normalized.content,
                category: args.category.clone(),
                original_url: args.link.clone(),
            })
        }
        Draft::Bilingual(draft) => {
            let validator = LanguageValidator::new(validator_config_from_config(&config));
            match validator.validate(&draft) {
                Verdict::Accepted => NewPost::Bilingual(BilingualPost::from_draft(draft, args.link.clone())),
                Verdict::Rejected { reason } => bail!("Draft rejected: {}", reason),
            }
        }
    };

    // Output results
    if args.json {
        let json = serde_json::to_string_pretty(&post).context("Failed to serialize output")?;
        println!("{}", json);
    } else {
        match &post {
            NewPost::Single(p) => {
                println!("{}", p.title);
                println!();
                println!("{}", p.content);
            }
            NewPost::Bilingual(p) => {
                println!("{}", p.title_ko);
                println!();
                println!("{}", p.content_ko);
                println!();
                println!("{}", p.title_en);
                println!();
                println!("{}", p.content_en);
            }
        }
    }

    Ok(())
}

pub(crate) fn build_generator(config: &AppConfig) -> Result<Box<dyn Generator>> {
    let provider_config = provider_config_from_config(&config.llm);

    match config.llm.provider.as_str() {
        "gemini" => {
            let api_key = load_api_key(&config.llm.gemini.api_key_env, "gemini")?;
            Ok(Box::new(GeminiGenerator::new(api_key, provider_config)))
        }
        "stub" => Ok(Box::new(StubGenerator::echo())),
        other => bail!("Unknown LLM provider: {}", other),
    }
}

pub(crate) fn parse_output_mode(mode: &str) -> Result<OutputMode> {
    match mode.trim() {
        "free_text" => Ok(OutputMode::FreeText),
        "bilingual" => Ok(OutputMode::Bilingual),
        other => bail!("Invalid output mode: {}", other),
    }
}

pub(crate) fn retry_policy_from_config(config: &AppConfig) -> RetryPolicy {
    RetryPolicy {
        max_attempts: config.llm.retry_attempts.max(1),
        backoff_base: Duration::from_millis(config.llm.backoff_base_ms),
    }
}

pub(crate) fn validator_config_from_config(config: &AppConfig) -> ValidatorConfig {
    ValidatorConfig {
        max_latin_ratio_ko: config.validation.max_latin_ratio_ko,
        max_non_ascii_ratio_en: config.validation.max_non_ascii_ratio_en,
    }
}

fn provider_config_from_config(config: &crate::config::LlmConfig) -> ProviderConfig {
    ProviderConfig {
        model: config.model.clone(),
        temperature: config.temperature,
        max_output_tokens: config.max_output_tokens,
        timeout_secs: config.timeout_secs,
    }
}

pub(crate) fn load_api_key(env_var: &str, provider: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No API key env var configured for provider {}", provider);
    }

    let key = std::env::var(env_var).with_context(|| {
        format!(
            "Missing API key env var {} for provider {}",
            env_var, provider
        )
    })?;

    if key.trim().is_empty() {
        bail!(
            "API key env var {} is empty for provider {}",
            env_var,
            provider
        );
    }

    Ok(SecretString::new(key.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_generator_selects_stub_provider() {
        let mut config = AppConfig::default();
        config.llm.provider = "stub".to_string();

        assert!(build_generator(&config).is_ok());
    }

    #[test]
    fn build_generator_rejects_unknown_provider() {
        let mut config = AppConfig::default();
        config.llm.provider = "mystery".to_string();

        assert!(build_generator(&config).is_err());
    }

    #[test]
    fn output_mode_parsing_covers_both_modes() {
        assert_eq!(parse_output_mode("free_text").unwrap(), OutputMode::FreeText);
        assert_eq!(parse_output_mode("bilingual").unwrap(), OutputMode::Bilingual);
        assert!(parse_output_mode("trilingual").is_err());
    }
}
