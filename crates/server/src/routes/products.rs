use axum::{
    Router,
    extract::{Json, Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::product::{CreateProduct, Product, UpdateProduct};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub async fn get_products(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Product>>>, ApiError> {
    let products = Product::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(products)))
}

pub async fn get_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Product>>, ApiError> {
    let product = Product::find_by_id(&state.db.pool, id)
        .await?
        .ok_or(ApiError::NotFound("product"))?;
    Ok(ResponseJson(ApiResponse::success(product)))
}

pub async fn get_product_by_slug(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Product>>, ApiError> {
    let product = Product::find_by_slug(&state.db.pool, &slug)
        .await?
        .ok_or(ApiError::NotFound("product"))?;
    Ok(ResponseJson(ApiResponse::success(product)))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProduct>,
) -> Result<ResponseJson<ApiResponse<Product>>, ApiError> {
    if payload.slug.trim().is_empty() {
        return Err(ApiError::BadRequest("slug must not be empty".to_string()));
    }
    let product = Product::create(&state.db.pool, Uuid::new_v4(), &payload).await?;
    tracing::info!(slug = %product.slug, "Created product");
    Ok(ResponseJson(ApiResponse::success(product)))
}

pub async fn update_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProduct>,
) -> Result<ResponseJson<ApiResponse<Product>>, ApiError> {
    let product = Product::update(&state.db.pool, id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(product)))
}

pub async fn delete_product(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Product::delete(&state.db.pool, id).await?;
    if rows_affected == 0 {
        return Err(ApiError::NotFound("product"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(get_products).post(create_product))
        .route(
            "/products/{id}",
            put(update_product).get(get_product).delete(delete_product),
        )
        .route("/products/slug/{slug}", get(get_product_by_slug))
}
