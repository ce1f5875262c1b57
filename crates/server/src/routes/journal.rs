use axum::{
    Router,
    extract::{Json, Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::journal::{CreateJournalPost, JournalPost};
use serde::Deserialize;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct JournalQuery {
    /// Admin listing includes drafts; the public site never sets this.
    #[serde(default)]
    pub include_drafts: bool,
}

pub async fn get_posts(
    Query(query): Query<JournalQuery>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<JournalPost>>>, ApiError> {
    let posts = if query.include_drafts {
        JournalPost::find_all(&state.db.pool).await?
    } else {
        JournalPost::find_published(&state.db.pool).await?
    };
    Ok(ResponseJson(ApiResponse::success(posts)))
}

pub async fn get_post(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<JournalPost>>, ApiError> {
    let post = JournalPost::find_by_slug(&state.db.pool, &slug)
        .await?
        .ok_or(ApiError::NotFound("journal post"))?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(payload): Json<CreateJournalPost>,
) -> Result<ResponseJson<ApiResponse<JournalPost>>, ApiError> {
    if payload.slug.trim().is_empty() {
        return Err(ApiError::BadRequest("slug must not be empty".to_string()));
    }
    let post = JournalPost::create(&state.db.pool, Uuid::new_v4(), &payload).await?;
    tracing::info!(slug = %post.slug, "Created journal draft");
    Ok(ResponseJson(ApiResponse::success(post)))
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub published: bool,
}

pub async fn set_published(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<PublishRequest>,
) -> Result<ResponseJson<ApiResponse<JournalPost>>, ApiError> {
    let post = JournalPost::set_published(&state.db.pool, id, payload.published).await?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

pub async fn delete_post(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = JournalPost::delete(&state.db.pool, id).await?;
    if rows_affected == 0 {
        return Err(ApiError::NotFound("journal post"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/journal", get(get_posts).post(create_post))
        .route("/journal/{id}", axum::routing::delete(delete_post))
        .route("/journal/{id}/publish", put(set_published))
        .route("/journal/slug/{slug}", get(get_post))
}
