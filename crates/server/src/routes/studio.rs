use axum::{
    Router,
    extract::{Json, State},
    response::Json as ResponseJson,
    routing::post,
};
use serde::Deserialize;
use services::services::studio::{
    DraftRequest, EstimateRequest, GeneratedImage, JournalDraft, ProjectEstimate, StudioService,
};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn draft_journal(
    State(state): State<AppState>,
    Json(payload): Json<DraftRequest>,
) -> Result<ResponseJson<ApiResponse<JournalDraft>>, ApiError> {
    let client = state.genai()?;
    let draft = StudioService::new(&client).draft_journal(&payload).await?;
    Ok(ResponseJson(ApiResponse::success(draft)))
}

pub async fn estimate_project(
    State(state): State<AppState>,
    Json(payload): Json<EstimateRequest>,
) -> Result<ResponseJson<ApiResponse<ProjectEstimate>>, ApiError> {
    if payload.width_m <= 0.0 || payload.height_m <= 0.0 {
        return Err(ApiError::BadRequest(
            "dimensions must be positive".to_string(),
        ));
    }
    let client = state.genai()?;
    let estimate = StudioService::new(&client).estimate_project(&payload).await?;
    Ok(ResponseJson(ApiResponse::success(estimate)))
}

#[derive(Debug, Deserialize, TS)]
pub struct HeroImageRequest {
    pub prompt: String,
}

/// Hero image generation. Out-of-quota degrades to the stock fallback, so a
/// success here may carry `is_fallback: true`.
pub async fn generate_hero_image(
    State(state): State<AppState>,
    Json(payload): Json<HeroImageRequest>,
) -> Result<ResponseJson<ApiResponse<GeneratedImage>>, ApiError> {
    if payload.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".to_string()));
    }
    let client = state.genai()?;
    let image = StudioService::new(&client)
        .generate_hero_image(&payload.prompt)
        .await?;
    Ok(ResponseJson(ApiResponse::success(image)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/studio/journal-draft", post(draft_journal))
        .route("/studio/estimate", post(estimate_project))
        .route("/studio/hero-image", post(generate_hero_image))
}
