use axum::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::AppConfig;
use crate::domain::record::ContentType;
use crate::domain::verdict::ContentCategory;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_COMPLETION_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum ClassifierError {
    /// The classification service could not be reached (transport
    /// failure or timeout). Callers may retry with backoff.
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
    /// The classification service answered with a non-2xx status.
    #[error("classifier returned status {0}")]
    Status(u16),
}

/// Text-classification capability. The raw completion text is returned
/// untouched; shaping it into a verdict is the normalizer's job.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        content: &str,
        content_type: ContentType,
        media_urls: &[String],
    ) -> Result<String, ClassifierError>;
}

/// Classifier backed by an Anthropic-style messages endpoint.
pub struct LlmClassifier {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ClassifyMessage>,
}

#[derive(Serialize)]
struct ClassifyMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    content: Vec<CompletionBlock>,
}

#[derive(Deserialize)]
struct CompletionBlock {
    #[serde(default)]
    text: Option<String>,
}

impl LlmClassifier {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.classifier_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.classifier_endpoint.clone(),
            api_key: config.classifier_api_key.clone(),
            model: config.classifier_model.clone(),
        })
    }

    /// Build the fixed instruction template. The requested JSON shape
    /// mirrors the verdict fields exactly so the response needs no
    /// external schema to interpret.
    pub fn instruction(content: &str, content_type: ContentType, media_urls: &[String]) -> String {
        let categories = ContentCategory::ALL
            .iter()
            .map(|category| category.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut prompt = format!(
            "You are the automated content moderator for a creator/fan engagement platform. \
             Analyze the {content_type} below and respond with ONLY a JSON object, no prose, \
             no markdown fences, with exactly these fields:\n\
             {{\n\
               \"is_appropriate\": boolean,\n\
               \"categories\": array of strings drawn only from [{categories}],\n\
               \"severity\": one of \"low\", \"medium\", \"high\", \"critical\",\n\
               \"confidence\": number between 0.0 and 1.0,\n\
               \"flags\": array of short human-readable notes,\n\
               \"detected_language\": IETF language code such as \"en\",\n\
               \"recommended_action\": one of \"approved\", \"warning\", \"shadow_ban\", \
             \"content_removed\", \"manual_review\"\n\
             }}\n\nContent to review:\n{content}",
            content_type = content_type.as_str(),
            categories = categories,
            content = content,
        );

        if !media_urls.is_empty() {
            prompt.push_str("\n\nAttached media URLs (not fetched, judge by context):\n");
            for url in media_urls {
                prompt.push_str(url);
                prompt.push('\n');
            }
        }

        prompt
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(
        &self,
        content: &str,
        content_type: ContentType,
        media_urls: &[String],
    ) -> Result<String, ClassifierError> {
        let request = ClassifyRequest {
            model: &self.model,
            max_tokens: MAX_COMPLETION_TOKENS,
            messages: vec![ClassifyMessage {
                role: "user",
                content: Self::instruction(content, content_type, media_urls),
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|err| ClassifierError::Unavailable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClassifierError::Status(status.as_u16()));
        }

        // A malformed 2xx body is not an error here: the normalizer
        // fails closed on anything it cannot parse.
        let parsed: ClassifyResponse = response.json().await.unwrap_or(ClassifyResponse {
            content: Vec::new(),
        });

        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        debug!(bytes = text.len(), "classifier completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_names_the_full_category_vocabulary() {
        let prompt = LlmClassifier::instruction("hello", ContentType::CommunityPost, &[]);
        for category in ContentCategory::ALL {
            assert!(prompt.contains(category.as_str()), "{}", category.as_str());
        }
    }

    #[test]
    fn instruction_names_every_severity_and_action() {
        let prompt = LlmClassifier::instruction("hello", ContentType::PostComment, &[]);
        for value in ["low", "medium", "high", "critical"] {
            assert!(prompt.contains(value));
        }
        for value in [
            "approved",
            "warning",
            "shadow_ban",
            "content_removed",
            "manual_review",
        ] {
            assert!(prompt.contains(value));
        }
    }

    #[test]
    fn instruction_appends_media_urls_when_present() {
        let urls = vec!["https://cdn.example.com/a.jpg".to_string()];
        let prompt = LlmClassifier::instruction("hello", ContentType::CommunityMessage, &urls);
        assert!(prompt.contains("https://cdn.example.com/a.jpg"));

        let without = LlmClassifier::instruction("hello", ContentType::CommunityMessage, &[]);
        assert!(!without.contains("Attached media URLs"));
    }
}
