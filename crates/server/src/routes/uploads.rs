use axum::{
    Router,
    extract::{Multipart, State},
    response::Json as ResponseJson,
    routing::post,
};
use services::services::assets::BatchUploadResult;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// Standalone batch upload. Per-file outcomes; a bad file never fails the
/// batch.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<BatchUploadResult>>, ApiError> {
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

    let result = state.assets.save_batch(files).await;
    tracing::info!(
        succeeded = result.succeeded.len(),
        failed = result.failed.len(),
        "Batch upload finished"
    );
    Ok(ResponseJson(ApiResponse::success(result)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/uploads", post(upload))
}
