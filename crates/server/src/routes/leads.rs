use axum::{
    Router,
    extract::{Json, Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::lead::{CreateLead, FulfillmentStatus, Lead, LeadStatus, ShippingInfo};
use serde::Deserialize;
use services::services::leads::LeadService;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub async fn get_leads(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Lead>>>, ApiError> {
    let leads = Lead::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(leads)))
}

pub async fn create_lead(
    State(state): State<AppState>,
    Json(payload): Json<CreateLead>,
) -> Result<ResponseJson<ApiResponse<Lead>>, ApiError> {
    let lead = Lead::create(&state.db.pool, Uuid::new_v4(), &payload).await?;
    tracing::info!(lead_id = %lead.id, city = ?lead.city, "New lead captured");
    Ok(ResponseJson(ApiResponse::success(lead)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: LeadStatus,
    /// Recorded alongside a conversion so partner rankings have a figure.
    pub deal_value: Option<f64>,
}

pub async fn update_status(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<ResponseJson<ApiResponse<Lead>>, ApiError> {
    if Lead::find_by_id(&state.db.pool, id).await?.is_none() {
        return Err(ApiError::NotFound("lead"));
    }
    let mut lead = Lead::update_status(&state.db.pool, id, payload.status).await?;
    if payload.deal_value.is_some() {
        Lead::update_deal_value(&state.db.pool, id, payload.deal_value).await?;
        lead.deal_value = payload.deal_value;
    }
    Ok(ResponseJson(ApiResponse::success(lead)))
}

#[derive(Debug, Deserialize)]
pub struct FulfillmentRequest {
    pub status: FulfillmentStatus,
}

pub async fn update_fulfillment(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<FulfillmentRequest>,
) -> Result<ResponseJson<ApiResponse<Lead>>, ApiError> {
    let lead = LeadService::advance_fulfillment(&state.db.pool, id, payload.status).await?;
    Ok(ResponseJson(ApiResponse::success(lead)))
}

pub async fn update_shipping(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<ShippingInfo>,
) -> Result<ResponseJson<ApiResponse<Lead>>, ApiError> {
    let lead = LeadService::update_shipping(&state.db.pool, id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(lead)))
}

pub async fn delete_lead(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let rows_affected = Lead::delete(&state.db.pool, id).await?;
    if rows_affected == 0 {
        return Err(ApiError::NotFound("lead"));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/leads", get(get_leads).post(create_lead))
        .route("/leads/{id}", axum::routing::delete(delete_lead))
        .route("/leads/{id}/status", put(update_status))
        .route("/leads/{id}/fulfillment", put(update_fulfillment))
        .route("/leads/{id}/shipping", put(update_shipping))
}
