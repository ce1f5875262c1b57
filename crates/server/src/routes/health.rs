use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// Liveness plus a store round-trip.
pub async fn health(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<&'static str>>, ApiError> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.db.pool)
        .await?;
    Ok(ResponseJson(ApiResponse::success("ok")))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
