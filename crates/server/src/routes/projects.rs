use axum::{
    Router,
    extract::{Json, Multipart, Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::project::{CreateProject, Project, UpdateProject};
use serde::{Deserialize, Serialize};
use services::services::assets::BatchUploadResult;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ProjectQuery {
    #[serde(default)]
    pub featured: bool,
}

pub async fn get_projects(
    Query(query): Query<ProjectQuery>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Project>>>, ApiError> {
    let projects = if query.featured {
        Project::find_featured(&state.db.pool).await?
    } else {
        Project::find_all(&state.db.pool).await?
    };
    Ok(ResponseJson(ApiResponse::success(projects)))
}

pub async fn get_project(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project = Project::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("project"))?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(payload): Json<CreateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    if payload.slug.trim().is_empty() {
        return Err(ApiError::BadRequest("slug must not be empty".to_string()));
    }
    let project = Project::create(&state.db.pool, Uuid::new_v4(), &payload).await?;
    tracing::info!(slug = %project.slug, "Created project");
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn update_project(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProject>,
) -> Result<ResponseJson<ApiResponse<Project>>, ApiError> {
    let project = Project::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(project)))
}

pub async fn delete_project(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Project::delete(&state.db.pool, id).await?;
    if rows_affected == 0 {
        return Err(ApiError::NotFound("project"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

#[derive(Debug, Serialize, TS)]
pub struct GalleryUploadResponse {
    pub project: Project,
    pub upload: BatchUploadResult,
}

/// Upload gallery images for a project. Files are stored concurrently; only
/// the successful ones are appended to the gallery, and the per-file outcomes
/// are returned so the editor can retry the failures.
pub async fn upload_gallery(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<GalleryUploadResponse>>, ApiError> {
    if Project::find_by_id(&state.db.pool, id).await?.is_none() {
        return Err(ApiError::NotFound("project"));
    }

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let filename = field.file_name().unwrap_or("unnamed").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        files.push((filename, bytes));
    }
    if files.is_empty() {
        return Err(ApiError::BadRequest("no files in upload".to_string()));
    }

    let upload = state.assets.save_batch(files).await;
    let urls: Vec<String> = upload.succeeded.iter().map(|a| a.url.clone()).collect();
    let project = if urls.is_empty() {
        Project::find_by_id(&state.db.pool, id)
            .await?
            .ok_or(ApiError::NotFound("project"))?
    } else {
        Project::append_gallery(&state.db.pool, id, &urls).await?
    };

    tracing::info!(
        project = %project.slug,
        succeeded = upload.succeeded.len(),
        failed = upload.failed.len(),
        "Gallery upload finished"
    );
    Ok(ResponseJson(ApiResponse::success(GalleryUploadResponse {
        project,
        upload,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", get(get_projects).post(create_project))
        .route(
            "/projects/{id}",
            put(update_project).get(get_project).delete(delete_project),
        )
        .route("/projects/{id}/gallery", post(upload_gallery))
}
