//! LLM provider adapters

pub mod gemini;
pub mod stub;

pub use gemini::GeminiGenerator;
pub use stub::StubGenerator;

use feedpress_domain::{GenerateRequest, OutputMode};
use serde::{Deserialize, Serialize};

/// Common provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Model name/ID
    pub model: String,
    /// Temperature (0.0-1.0)
    pub temperature: f64,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-lite".to_string(),
            temperature: 0.7,
            max_output_tokens: 4096,
            timeout_secs: 60,
        }
    }
}

/// Build the generation prompt for one candidate article
pub fn build_post_prompt(request: &GenerateRequest) -> String {
    let item = &request.item;
    let summary = item.summary.as_deref().unwrap_or("(no summary provided)");

    let mut prompt = String::new();

    prompt.push_str(
        "You are a junior developer who studies tech news and writes calm, \
         well-organized blog posts about it. Based on the article below, write a post \
         that reads like personal study notes, not AI-generated marketing copy. \
         Avoid sensational adjectives and promotional phrasing.\n\n",
    );

    match request.mode {
        OutputMode::FreeText => {
            prompt.push_str("## Format\n");
            prompt.push_str(&format!(
                "- First line: the post title in the form `[{}] concise topic`.\n",
                request.category
            ));
            prompt.push_str(
                "- Then the body in Markdown: 2 to 4 sections, each starting with a \
                 `### heading` followed by a blank line.\n\
                 - Use list markers (-, 1.) for key points.\n\
                 - Close with one paragraph of personal opinion and a question \
                 inviting reader comments.\n",
            );
            prompt.push_str(&format!(
                "- End with two newlines and a source line: \
                 \"This post is based on an external article. Source: [{}]({})\"\n\n",
                item.title, item.link
            ));
        }
        OutputMode::Bilingual => {
            prompt.push_str("## Format\n");
            prompt.push_str(
                "Respond with ONLY a JSON object matching this exact schema, \
                 no code fences, no commentary:\n\
                 {\n\
                 \"category\": \"feed category label\",\n\
                 \"slug\": \"url-safe-lowercase-slug\",\n\
                 \"title_ko\": \"Korean title\",\n\
                 \"content_ko\": \"full Korean post body in Markdown\",\n\
                 \"title_en\": \"English title\",\n\
                 \"content_en\": \"full English post body in Markdown\"\n\
                 }\n\
                 Korean fields must be written entirely in Korean and English \
                 fields entirely in English.\n\n",
            );
        }
    }

    prompt.push_str("## Article\n");
    prompt.push_str(&format!("Category: {}\n", request.category));
    prompt.push_str(&format!("Title: {}\n", item.title));
    prompt.push_str(&format!("Link: {}\n", item.link));
    prompt.push_str(&format!("Summary: {}\n", summary));

    if let Some(note) = &request.corrective_note {
        prompt.push_str(&format!("\n## Correction\n{}\n", note));
    }

    prompt
}

/// Extract JSON from a provider response (handles markdown code blocks)
pub(crate) fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json") {
        if let Some(end) = trimmed[start + 7..].find("```") {
            return trimmed[start + 7..start + 7 + end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        if let Some(end) = trimmed[start + 3..].find("```") {
            let content = trimmed[start + 3..start + 3 + end].trim();
            // Skip language identifier if present
            if let Some(newline) = content.find('\n') {
                let first_line = &content[..newline];
                if !first_line.starts_with('{') {
                    return content[newline + 1..].trim();
                }
            }
            return content;
        }
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedpress_domain::FeedItem;

    fn sample_request(mode: OutputMode) -> GenerateRequest {
        GenerateRequest {
            item: FeedItem {
                title: "React ships a new compiler".to_string(),
                link: "https://example.com/react".to_string(),
                summary: Some("The React team announced a compiler.".to_string()),
                published_at: None,
            },
            category: "DEV".to_string(),
            mode,
            corrective_note: None,
        }
    }

    #[test]
    fn free_text_prompt_includes_article_fields() {
        let prompt = build_post_prompt(&sample_request(OutputMode::FreeText));

        assert!(prompt.contains("React ships a new compiler"));
        assert!(prompt.contains("https://example.com/react"));
        assert!(prompt.contains("[DEV]"));
    }

    #[test]
    fn bilingual_prompt_lists_all_six_fields() {
        let prompt = build_post_prompt(&sample_request(OutputMode::Bilingual));

        for field in ["category", "slug", "title_ko", "content_ko", "title_en", "content_en"] {
            assert!(prompt.contains(field), "prompt missing field {field}");
        }
    }

    #[test]
    fn corrective_note_is_appended() {
        let mut request = sample_request(OutputMode::Bilingual);
        request.corrective_note = Some("Strictly separate languages.".to_string());

        let prompt = build_post_prompt(&request);
        assert!(prompt.contains("## Correction"));
        assert!(prompt.contains("Strictly separate languages."));
    }

    #[test]
    fn extract_json_passes_raw_json_through() {
        let input = r#"{"slug": "a"}"#;
        assert_eq!(extract_json(input), input);
    }

    #[test]
    fn extract_json_unwraps_code_block() {
        let input = "```json\n{\"slug\": \"a\"}\n```";
        assert_eq!(extract_json(input), r#"{"slug": "a"}"#);
    }
}
