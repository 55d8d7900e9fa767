//! Transient-failure retry tier around a single generation call

use std::time::Duration;

use crate::{
    model::{Draft, GenerateRequest},
    ports::{GenerateError, Generator},
};

/// Retry policy for transient provider failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum provider calls per logical generation
    pub max_attempts: u32,
    /// Linear backoff base; attempt n waits `base * n` before attempt n+1
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(5000),
        }
    }
}

/// Errors from a logical generation (one or more provider calls)
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// A non-transient provider error, propagated without retry
    #[error("Generation failed: {0}")]
    Provider(#[from] GenerateError),
    /// Every attempt hit a transient error and the budget ran out
    #[error("Max retries exceeded after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: GenerateError },
}

/// Wraps a generator with bounded, linearly backed-off retries.
///
/// Only errors the provider client classified as transient are retried;
/// everything else propagates immediately. Backoff suspends the calling
/// sequence, so no other work proceeds while waiting.
pub struct GenerateWithRetry<'a, G: Generator + ?Sized> {
    generator: &'a G,
    policy: RetryPolicy,
}

impl<'a, G: Generator + ?Sized> GenerateWithRetry<'a, G> {
    pub fn new(generator: &'a G, policy: RetryPolicy) -> Self {
        Self { generator, policy }
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<Draft, GenerationError> {
        let max = self.policy.max_attempts.max(1);
        let mut last = None;

        for attempt in 1..=max {
            match self.generator.generate(request).await {
                Ok(draft) => return Ok(draft),
                Err(e) if e.is_transient() => {
                    let wait = self.policy.backoff_base * attempt;
                    tracing::warn!(
                        attempt = attempt,
                        max_attempts = max,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "Provider busy, backing off"
                    );
                    last = Some(e);
                    if attempt < max {
                        tokio::time::sleep(wait).await;
                    }
                }
                Err(e) => return Err(GenerationError::Provider(e)),
            }
        }

        Err(GenerationError::RetriesExhausted {
            attempts: max,
            last: last.unwrap_or_else(|| GenerateError::Api("unknown error".to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FeedItem, OutputMode};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedGenerator {
        responses: Mutex<Vec<Result<Draft, GenerateError>>>,
        calls: AtomicU32,
    }

    impl ScriptedGenerator {
        fn new(mut responses: Vec<Result<Draft, GenerateError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, _request: &GenerateRequest) -> Result<Draft, GenerateError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(Err(GenerateError::Api("script exhausted".to_string())))
        }
    }

    fn sample_request() -> GenerateRequest {
        GenerateRequest {
            item: FeedItem {
                title: "Nvidia announces a new strategy".to_string(),
                link: "https://example.com/nvidia".to_string(),
                summary: Some("Summary".to_string()),
                published_at: None,
            },
            category: "AI-ML".to_string(),
            mode: OutputMode::FreeText,
            corrective_note: None,
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff_base: Duration::from_millis(10),
        }
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let generator = ScriptedGenerator::new(vec![
            Err(GenerateError::Overloaded("503".to_string())),
            Err(GenerateError::RateLimited),
            Ok(Draft::FreeText("# Title\nBody".to_string())),
        ]);

        let retry = GenerateWithRetry::new(&generator, fast_policy(3));
        let draft = retry.generate(&sample_request()).await.unwrap();

        assert!(matches!(draft, Draft::FreeText(_)));
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test]
    async fn fatal_error_propagates_without_retry() {
        let generator =
            ScriptedGenerator::new(vec![Err(GenerateError::Api("bad request".to_string()))]);

        let retry = GenerateWithRetry::new(&generator, fast_policy(3));
        let result = retry.generate(&sample_request()).await;

        assert!(matches!(
            result,
            Err(GenerationError::Provider(GenerateError::Api(_)))
        ));
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn exhaustion_is_distinct_from_fatal_errors() {
        let generator = ScriptedGenerator::new(vec![
            Err(GenerateError::Overloaded("overloaded".to_string())),
            Err(GenerateError::Overloaded("overloaded".to_string())),
            Err(GenerateError::Overloaded("overloaded".to_string())),
        ]);

        let retry = GenerateWithRetry::new(&generator, fast_policy(3));
        let result = retry.generate(&sample_request()).await;

        match result {
            Err(GenerationError::RetriesExhausted { attempts, .. }) => assert_eq!(attempts, 3),
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
        assert_eq!(generator.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_is_linear_and_skips_the_last_wait() {
        let generator = ScriptedGenerator::new(vec![
            Err(GenerateError::Overloaded("busy".to_string())),
            Err(GenerateError::Overloaded("busy".to_string())),
            Err(GenerateError::Overloaded("busy".to_string())),
        ]);

        let policy = RetryPolicy {
            max_attempts: 3,
            backoff_base: Duration::from_secs(5),
        };

        let start = tokio::time::Instant::now();
        let retry = GenerateWithRetry::new(&generator, policy);
        let _ = retry.generate(&sample_request()).await;

        // base * (1 + 2); no wait after the final attempt
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }
}
