use axum::{
    Router,
    extract::{Json, Path, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::city_page::{CityPage, CreateCityPage, UpdateCitySeo};
use serde::{Deserialize, Serialize};
use services::services::seo::{ScoreBand, score};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize, TS)]
pub struct ScoreRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub primary_keyword: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Serialize, TS)]
pub struct ScoreResponse {
    pub score: u32,
    pub band: ScoreBand,
    pub tips: Vec<String>,
}

/// Score a metadata document against the rubric. Stateless; the editor calls
/// this on every change.
pub async fn score_document(
    Json(payload): Json<ScoreRequest>,
) -> Result<ResponseJson<ApiResponse<ScoreResponse>>, ApiError> {
    let result = score(
        &payload.title,
        &payload.description,
        &payload.primary_keyword,
        &payload.keywords,
    );
    Ok(ResponseJson(ApiResponse::success(ScoreResponse {
        band: ScoreBand::from_score(result.score),
        score: result.score,
        tips: result.tips,
    })))
}

pub async fn get_cities(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<CityPage>>>, ApiError> {
    let cities = CityPage::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(cities)))
}

pub async fn get_city(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<CityPage>>, ApiError> {
    let city = CityPage::find_by_slug(&state.db.pool, &slug)
        .await?
        .ok_or(ApiError::NotFound("city page"))?;
    Ok(ResponseJson(ApiResponse::success(city)))
}

pub async fn create_city(
    State(state): State<AppState>,
    Json(payload): Json<CreateCityPage>,
) -> Result<ResponseJson<ApiResponse<CityPage>>, ApiError> {
    if payload.slug.trim().is_empty() {
        return Err(ApiError::BadRequest("slug must not be empty".to_string()));
    }
    let city = CityPage::create(&state.db.pool, Uuid::new_v4(), &payload).await?;
    tracing::info!(slug = %city.slug, "Created city page");
    Ok(ResponseJson(ApiResponse::success(city)))
}

/// SEO-editor patch: only metadata fields, never the page content.
pub async fn update_city_seo(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateCitySeo>,
) -> Result<ResponseJson<ApiResponse<CityPage>>, ApiError> {
    if CityPage::find_by_id(&state.db.pool, id).await?.is_none() {
        return Err(ApiError::NotFound("city page"));
    }
    let city = CityPage::update_seo(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(city)))
}

pub async fn delete_city(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = CityPage::delete(&state.db.pool, id).await?;
    if rows_affected == 0 {
        return Err(ApiError::NotFound("city page"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/seo/score", post(score_document))
        .route("/cities", get(get_cities).post(create_city))
        .route("/cities/{id}", axum::routing::delete(delete_city))
        .route("/cities/{id}/seo", put(update_city_seo))
        .route("/cities/slug/{slug}", get(get_city))
}
