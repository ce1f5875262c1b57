//! AI studio actions: journal drafts, Project Lab estimates, hero images.
//!
//! Thin proxies over the generative API. The one piece of policy lives in
//! `generate_hero_image`: when the image API reports exhausted quota or
//! billing, the caller gets a fixed stock asset marked `is_fallback` instead
//! of an error.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use ts_rs::TS;

use super::genai::{GenAiClient, GenAiError};

/// Stock image substituted when the image API is out of quota.
pub const FALLBACK_IMAGE_URL: &str = "/assets/stock/terracotta-facade.jpg";

#[derive(Debug, Error)]
pub enum StudioError {
    #[error("ai api error: {0}")]
    GenAi(#[from] GenAiError),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DraftRequest {
    pub topic: String,
    pub audience: Option<String>,
    pub tone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct JournalDraft {
    pub title: String,
    pub excerpt: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct EstimateRequest {
    pub product_slug: Option<String>,
    pub application: String,
    pub width_m: f64,
    pub height_m: f64,
    pub city: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ProjectEstimate {
    pub feasibility: String,
    pub estimated_cost_min: f64,
    pub estimated_cost_max: f64,
    pub lead_time_weeks: u32,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct GeneratedImage {
    pub url: String,
    pub is_fallback: bool,
}

pub struct StudioService<'a> {
    client: &'a GenAiClient,
}

impl<'a> StudioService<'a> {
    pub fn new(client: &'a GenAiClient) -> Self {
        Self { client }
    }

    /// Draft a journal article for the given topic/audience/tone.
    pub async fn draft_journal(&self, req: &DraftRequest) -> Result<JournalDraft, StudioError> {
        let prompt = format!(
            r#"Write a journal article for an architectural clay-products studio.

Topic: {}
Audience: {}
Tone: {}

Return ONLY valid JSON with this structure:
```json
{{
  "title": "Article title",
  "excerpt": "One-sentence standfirst",
  "body": "Full article body in markdown",
  "tags": ["tag1", "tag2"]
}}
```"#,
            req.topic,
            req.audience.as_deref().unwrap_or("architects and homeowners"),
            req.tone.as_deref().unwrap_or("warm and editorial"),
        );

        let system = "You are the editor of a design journal about terracotta, brick and clay \
                      architecture. Be specific and practical. Output valid JSON only.";

        Ok(self.client.ask_json(&prompt, Some(system)).await?)
    }

    /// Project Lab: cost and feasibility estimate from structured dimensions.
    pub async fn estimate_project(
        &self,
        req: &EstimateRequest,
    ) -> Result<ProjectEstimate, StudioError> {
        let prompt = format!(
            r#"Estimate cost and feasibility for a clay-product installation.

Product: {}
Application: {}
Dimensions: {} m wide × {} m high
City: {}

Assume Indian market rates in INR. Return ONLY valid JSON:
```json
{{
  "feasibility": "short assessment",
  "estimated_cost_min": 0,
  "estimated_cost_max": 0,
  "lead_time_weeks": 0,
  "notes": ["caveat or advice"]
}}
```"#,
            req.product_slug.as_deref().unwrap_or("unspecified"),
            req.application,
            req.width_m,
            req.height_m,
            req.city.as_deref().unwrap_or("unspecified"),
        );

        let system = "You are an estimator for architectural terracotta installations. Give \
                      realistic ranges, not precision. Output valid JSON only.";

        Ok(self.client.ask_json(&prompt, Some(system)).await?)
    }

    /// Generate a hero image. Quota/billing exhaustion degrades to the stock
    /// fallback rather than failing the caller; everything else propagates.
    pub async fn generate_hero_image(&self, prompt: &str) -> Result<GeneratedImage, StudioError> {
        match self.client.generate_image(prompt).await {
            Ok(url) => Ok(GeneratedImage {
                url,
                is_fallback: false,
            }),
            Err(GenAiError::QuotaExhausted) => {
                warn!("Image API quota exhausted; substituting stock fallback");
                Ok(GeneratedImage {
                    url: FALLBACK_IMAGE_URL.to_string(),
                    is_fallback: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
