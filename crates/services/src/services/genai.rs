//! Generative AI client for studio features (text drafts and image renders).
//!
//! Talks to an OpenAI-compatible API. Text completions retry transparently on
//! transient failures; image generation does not: its quota/billing errors
//! are surfaced as a distinct variant so the caller can degrade to a stock
//! asset instead.

use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TEXT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

#[derive(Debug, Clone, Error)]
pub enum GenAiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("quota or billing exhausted")]
    QuotaExhausted,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("json error: {0}")]
    Serde(String),
    #[error("missing api key: GENAI_API_KEY environment variable not set")]
    MissingApiKey,
}

impl GenAiError {
    /// Transient errors worth retrying on the text path.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout | Self::RateLimited => true,
            Self::Http { status, .. } => (500..=599).contains(status),
            _ => false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u8,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: String,
}

#[derive(Debug, Clone)]
pub struct GenAiClient {
    http: Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
}

impl GenAiClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

    pub fn from_env() -> Result<Self, GenAiError> {
        let api_key = std::env::var("GENAI_API_KEY").map_err(|_| GenAiError::MissingApiKey)?;
        let base_url =
            std::env::var("GENAI_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        Self::new(api_key, base_url)
    }

    pub fn new(api_key: String, base_url: String) -> Result<Self, GenAiError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("clayhaus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GenAiError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            api_key,
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        })
    }

    /// Single-prompt completion with an optional system preamble, retried on
    /// transient failures.
    pub async fn ask(&self, prompt: &str, system: Option<&str>) -> Result<String, GenAiError> {
        (|| async { self.send_chat(prompt, system).await })
            .retry(
                &ExponentialBuilder::default()
                    .with_min_delay(Duration::from_secs(1))
                    .with_max_delay(Duration::from_secs(30))
                    .with_max_times(3)
                    .with_jitter(),
            )
            .when(|e: &GenAiError| e.should_retry())
            .notify(|e, dur| {
                warn!(
                    "AI text call failed, retrying after {:.2}s: {}",
                    dur.as_secs_f64(),
                    e
                )
            })
            .await
    }

    /// Completion parsed as JSON, tolerating markdown code fences.
    pub async fn ask_json<T: for<'de> Deserialize<'de>>(
        &self,
        prompt: &str,
        system: Option<&str>,
    ) -> Result<T, GenAiError> {
        let response = self.ask(prompt, system).await?;
        if response.trim().is_empty() {
            return Err(GenAiError::Serde("empty response from model".to_string()));
        }

        let json_str = extract_json(&response);
        serde_json::from_str(json_str).map_err(|e| {
            warn!(
                json_error = %e,
                preview = %json_str.chars().take(200).collect::<String>(),
                "Failed to parse JSON from model response"
            );
            GenAiError::Serde(e.to_string())
        })
    }

    /// Generate a single image and return its hosted URL. Not retried; quota
    /// and billing failures surface as `QuotaExhausted`.
    pub async fn generate_image(&self, prompt: &str) -> Result<String, GenAiError> {
        let res = self
            .http
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ImageRequest {
                model: &self.image_model,
                prompt,
                n: 1,
            })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let response: ImageResponse = Self::parse_image_response(res).await?;
        response
            .data
            .into_iter()
            .next()
            .map(|d| d.url)
            .ok_or_else(|| GenAiError::Serde("no image in response".to_string()))
    }

    async fn send_chat(&self, prompt: &str, system: Option<&str>) -> Result<String, GenAiError> {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt,
        });

        let res = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest {
                model: &self.text_model,
                messages,
                max_tokens: 4096,
            })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match res.status() {
            s if s.is_success() => {
                let body: ChatResponse = res
                    .json()
                    .await
                    .map_err(|e| GenAiError::Serde(e.to_string()))?;
                body.choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .ok_or_else(|| GenAiError::Serde("no text content in response".to_string()))
            }
            StatusCode::UNAUTHORIZED => Err(GenAiError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => Err(GenAiError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(GenAiError::Http { status, body })
            }
        }
    }

    async fn parse_image_response(res: reqwest::Response) -> Result<ImageResponse, GenAiError> {
        match res.status() {
            s if s.is_success() => res
                .json::<ImageResponse>()
                .await
                .map_err(|e| GenAiError::Serde(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(GenAiError::InvalidApiKey),
            StatusCode::PAYMENT_REQUIRED => Err(GenAiError::QuotaExhausted),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                // Providers report exhausted image quota as 429/400 with a
                // billing marker in the body rather than a clean 402.
                if is_quota_body(&body) || status == 429 {
                    Err(GenAiError::QuotaExhausted)
                } else {
                    Err(GenAiError::Http { status, body })
                }
            }
        }
    }
}

fn is_quota_body(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("billing") || lower.contains("quota") || lower.contains("insufficient")
}

fn map_reqwest_error(e: reqwest::Error) -> GenAiError {
    if e.is_timeout() {
        GenAiError::Timeout
    } else {
        GenAiError::Transport(e.to_string())
    }
}

/// Extract JSON from a string that might contain markdown code blocks.
fn extract_json(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        let content_start = start + 7;
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        let content_start = start + 3;
        let content_start = text[content_start..]
            .find('\n')
            .map(|i| content_start + i + 1)
            .unwrap_or(content_start);
        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim();
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_plain() {
        let input = r#"{"key": "value"}"#;
        assert_eq!(extract_json(input), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_extract_json_code_block() {
        let input = "Here you go:\n```json\n{\"key\": \"value\"}\n```";
        assert_eq!(extract_json(input), r#"{"key": "value"}"#);
    }

    #[test]
    fn test_quota_body_detection() {
        assert!(is_quota_body(r#"{"error": "Billing hard limit reached"}"#));
        assert!(is_quota_body(r#"{"error": "insufficient_quota"}"#));
        assert!(!is_quota_body(r#"{"error": "model not found"}"#));
    }

    #[test]
    fn test_retry_classification() {
        assert!(GenAiError::Timeout.should_retry());
        assert!(GenAiError::RateLimited.should_retry());
        assert!(GenAiError::Http { status: 503, body: String::new() }.should_retry());
        assert!(!GenAiError::QuotaExhausted.should_retry());
        assert!(!GenAiError::InvalidApiKey.should_retry());
    }
}
