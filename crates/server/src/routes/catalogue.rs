use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use db::models::product::Product;
use services::services::catalogue::{Catalogue, build_catalogue};
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

/// Full catalogue layout: products grouped into chapters with running page
/// numbers, recomputed from the live product set on every request.
pub async fn get_catalogue(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Catalogue>>, ApiError> {
    let products = Product::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(build_catalogue(products))))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/catalogue", get(get_catalogue))
}
