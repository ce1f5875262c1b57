use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use services::services::dashboard::{DashboardService, DashboardStats};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn get_stats(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<DashboardStats>>, ApiError> {
    let stats = DashboardService::stats(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(stats)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard/stats", get(get_stats))
}
