//! Google Gemini API adapter

use async_trait::async_trait;
use feedpress_domain::{BilingualDraft, Draft, GenerateError, GenerateRequest, Generator, OutputMode};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ProviderConfig, build_post_prompt, extract_json};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Gemini generator.
///
/// Issues exactly one `generateContent` request per invocation and decides
/// the transient/fatal classification of every failure here, at the client
/// boundary. Retrying is the caller's job.
pub struct GeminiGenerator {
    client: Client,
    api_key: SecretString,
    base_url: String,
    config: ProviderConfig,
}

impl GeminiGenerator {
    pub fn new(api_key: SecretString, config: ProviderConfig) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string(), config)
    }

    pub fn with_base_url(api_key: SecretString, base_url: String, config: ProviderConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url,
            config,
        }
    }

    async fn call_api(&self, prompt: &str, mode: OutputMode) -> Result<String, GenerateError> {
        let response_mime_type = match mode {
            OutputMode::FreeText => None,
            OutputMode::Bilingual => Some("application/json".to_string()),
        };

        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: Some(GenerationConfig {
                temperature: Some(self.config.temperature),
                max_output_tokens: Some(self.config.max_output_tokens),
                response_mime_type,
            }),
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.config.model,
            self.api_key.expose_secret()
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerateError::Timeout
                } else {
                    GenerateError::Api(e.to_string())
                }
            })?;

        let status = response.status();

        if status == 429 {
            return Err(GenerateError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // 503 and the "model is overloaded" body both signal temporary
            // capacity trouble, not a broken request.
            if status == 503 || body.contains("overloaded") || body.contains("UNAVAILABLE") {
                return Err(GenerateError::Overloaded(format!("{status}: {body}")));
            }
            return Err(GenerateError::Api(format!("API returned {status}: {body}")));
        }

        let api_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::InvalidFormat(e.to_string()))?;

        let text = api_response
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(GenerateError::InvalidFormat("Empty response".to_string()));
        }

        Ok(text)
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "generationConfig")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "maxOutputTokens")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "responseMimeType")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    parts: Vec<Part>,
}

#[async_trait]
impl Generator for GeminiGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<Draft, GenerateError> {
        let prompt = build_post_prompt(request);
        let text = self.call_api(&prompt, request.mode).await?;

        match request.mode {
            OutputMode::FreeText => Ok(Draft::FreeText(text)),
            OutputMode::Bilingual => {
                let draft: BilingualDraft = serde_json::from_str(extract_json(&text))
                    .map_err(|e| GenerateError::InvalidFormat(format!("Bad JSON payload: {e}")))?;
                Ok(Draft::Bilingual(draft))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedpress_domain::FeedItem;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_request(mode: OutputMode) -> GenerateRequest {
        GenerateRequest {
            item: FeedItem {
                title: "Nvidia announces a new strategy".to_string(),
                link: "https://example.com/nvidia".to_string(),
                summary: Some("Summary text".to_string()),
                published_at: None,
            },
            category: "AI-ML".to_string(),
            mode,
            corrective_note: None,
        }
    }

    fn generator_for(server: &MockServer) -> GeminiGenerator {
        GeminiGenerator::with_base_url(
            SecretString::new("test-key".into()),
            server.uri(),
            ProviderConfig::default(),
        )
    }

    fn gemini_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": text } ] } }
            ]
        })
    }

    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash-lite:generateContent";

    #[tokio::test]
    async fn free_text_generation_returns_raw_markdown() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(gemini_body("# [AI-ML] Title\n\nBody text")),
            )
            .mount(&server)
            .await;

        let generator = generator_for(&server);
        let draft = generator
            .generate(&sample_request(OutputMode::FreeText))
            .await
            .unwrap();

        match draft {
            Draft::FreeText(text) => assert!(text.starts_with("# [AI-ML] Title")),
            other => panic!("expected free text, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn bilingual_generation_parses_the_payload() {
        let server = MockServer::start().await;

        let payload = r#"{"category":"AI-ML","slug":"nvidia-strategy","title_ko":"엔비디아 전략","content_ko":"새로운 전략 정리.","title_en":"Nvidia strategy","content_en":"A summary of the strategy."}"#;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(payload)))
            .mount(&server)
            .await;

        let generator = generator_for(&server);
        let draft = generator
            .generate(&sample_request(OutputMode::Bilingual))
            .await
            .unwrap();

        match draft {
            Draft::Bilingual(draft) => {
                assert_eq!(draft.slug, "nvidia-strategy");
                assert_eq!(draft.title_ko, "엔비디아 전략");
            }
            other => panic!("expected bilingual draft, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn unparseable_structured_payload_is_invalid_format() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(gemini_body("sorry, no JSON today")),
            )
            .mount(&server)
            .await;

        let generator = generator_for(&server);
        let result = generator.generate(&sample_request(OutputMode::Bilingual)).await;

        let err = result.unwrap_err();
        assert!(matches!(err, GenerateError::InvalidFormat(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn service_unavailable_is_transient() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("model is overloaded"))
            .mount(&server)
            .await;

        let generator = generator_for(&server);
        let err = generator
            .generate(&sample_request(OutputMode::FreeText))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerateError::Overloaded(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn rate_limit_is_transient() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let generator = generator_for(&server);
        let err = generator
            .generate(&sample_request(OutputMode::FreeText))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerateError::RateLimited));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn client_error_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
            .mount(&server)
            .await;

        let generator = generator_for(&server);
        let err = generator
            .generate(&sample_request(OutputMode::FreeText))
            .await
            .unwrap_err();

        assert!(matches!(err, GenerateError::Api(_)));
        assert!(!err.is_transient());
    }
}
