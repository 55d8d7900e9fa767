//! Stub generator for testing and offline mode

use async_trait::async_trait;
use feedpress_domain::{
    BilingualDraft, Draft, GenerateError, GenerateRequest, Generator, OutputMode,
};

/// Stub generator that returns configurable or synthesized drafts
pub struct StubGenerator {
    response: Option<Draft>,
    error: Option<GenerateError>,
}

impl StubGenerator {
    /// Create a stub that synthesizes a draft from the request
    pub fn echo() -> Self {
        Self {
            response: None,
            error: None,
        }
    }

    /// Create a stub that returns a specific draft
    pub fn with_response(response: Draft) -> Self {
        Self {
            response: Some(response),
            error: None,
        }
    }

    /// Create a stub that always returns an error
    pub fn with_error(error: GenerateError) -> Self {
        Self {
            response: None,
            error: Some(error),
        }
    }

    fn synthesize(request: &GenerateRequest) -> Draft {
        match request.mode {
            OutputMode::FreeText => Draft::FreeText(format!(
                "# [{}] {}\n\n### Overview\n\nStub draft generated offline.\n\n\
                 Source: [{}]({})",
                request.category, request.item.title, request.item.title, request.item.link
            )),
            OutputMode::Bilingual => Draft::Bilingual(BilingualDraft {
                category: request.category.clone(),
                slug: "stub-draft".to_string(),
                title_ko: format!("[{}] 오프라인 초안", request.category),
                content_ko: "오프라인 모드에서 생성된 초안입니다.".to_string(),
                title_en: format!("[{}] Offline draft", request.category),
                content_en: "A draft generated in offline mode.".to_string(),
            }),
        }
    }
}

impl Default for StubGenerator {
    fn default() -> Self {
        Self::echo()
    }
}

#[async_trait]
impl Generator for StubGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<Draft, GenerateError> {
        if let Some(ref error) = self.error {
            return Err(error.clone());
        }

        if let Some(ref response) = self.response {
            return Ok(response.clone());
        }

        Ok(Self::synthesize(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedpress_domain::FeedItem;
    use feedpress_domain::usecases::{LanguageValidator, normalize};

    fn sample_request(mode: OutputMode) -> GenerateRequest {
        GenerateRequest {
            item: FeedItem {
                title: "Rust 2024 edition lands".to_string(),
                link: "https://example.com/rust".to_string(),
                summary: None,
                published_at: None,
            },
            category: "DEV".to_string(),
            mode,
            corrective_note: None,
        }
    }

    #[tokio::test]
    async fn echo_free_text_draft_normalizes_cleanly() {
        let generator = StubGenerator::echo();
        let draft = generator
            .generate(&sample_request(OutputMode::FreeText))
            .await
            .unwrap();

        let Draft::FreeText(text) = draft else {
            panic!("expected free text");
        };
        let post = normalize(&text).unwrap();
        assert_eq!(post.title, "[DEV] Rust 2024 edition lands");
    }

    #[tokio::test]
    async fn echo_bilingual_draft_passes_validation() {
        let generator = StubGenerator::echo();
        let draft = generator
            .generate(&sample_request(OutputMode::Bilingual))
            .await
            .unwrap();

        let Draft::Bilingual(draft) = draft else {
            panic!("expected bilingual draft");
        };
        assert!(LanguageValidator::default().validate(&draft).is_accepted());
    }

    #[tokio::test]
    async fn error_stub_returns_the_configured_error() {
        let generator = StubGenerator::with_error(GenerateError::Timeout);
        let result = generator.generate(&sample_request(OutputMode::FreeText)).await;

        assert!(matches!(result, Err(GenerateError::Timeout)));
    }
}
