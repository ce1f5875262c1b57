use axum::{
    Router,
    extract::{Json, Path, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use db::models::payment_link::{CreatePaymentLink, LineItem, PaymentLink};
use serde::{Deserialize, Serialize};
use services::services::{
    invoice::{InvoiceBreakdown, display_breakdown},
    payments::PaymentService,
};
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

pub async fn get_links(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<PaymentLink>>>, ApiError> {
    let links = PaymentLink::find_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(links)))
}

pub async fn create_link(
    State(state): State<AppState>,
    Json(payload): Json<CreatePaymentLink>,
) -> Result<ResponseJson<ApiResponse<PaymentLink>>, ApiError> {
    let gateway = state.gateway()?;
    let service = PaymentService::new(gateway);
    let link = service.create_link(&state.db.pool, payload).await?;
    Ok(ResponseJson(ApiResponse::success(link)))
}

#[derive(Debug, Serialize, TS)]
pub struct LinkDetail {
    pub link: PaymentLink,
    /// Recomputed line figures; `grand_total` always equals the stored amount.
    pub breakdown: InvoiceBreakdown,
}

/// The hosted invoice page: the link plus its presentation breakdown.
pub async fn get_link(
    Path(order_id): Path<String>,
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<LinkDetail>>, ApiError> {
    let link = PaymentLink::find_by_order_id(&state.db.pool, &order_id)
        .await?
        .ok_or(ApiError::NotFound("payment link"))?;
    let breakdown = display_breakdown(&link);
    Ok(ResponseJson(ApiResponse::success(LinkDetail {
        link,
        breakdown,
    })))
}

#[derive(Debug, Deserialize, TS)]
pub struct UpdateLineItemsRequest {
    pub line_items: Vec<LineItem>,
}

/// Display-only edit of the invoice rows. The payable amount stays frozen.
pub async fn update_line_items(
    Path(order_id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateLineItemsRequest>,
) -> Result<ResponseJson<ApiResponse<PaymentLink>>, ApiError> {
    let link = PaymentLink::find_by_order_id(&state.db.pool, &order_id)
        .await?
        .ok_or(ApiError::NotFound("payment link"))?;
    let updated =
        PaymentLink::update_line_items(&state.db.pool, link.id, &payload.line_items).await?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

#[derive(Debug, Deserialize, TS)]
pub struct ConfirmRequest {
    pub payment_id: String,
}

/// Checkout callback: verify the capture with the gateway and record it.
/// Confirming an already-paid link is a no-op success.
pub async fn confirm_payment(
    Path(order_id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<ConfirmRequest>,
) -> Result<ResponseJson<ApiResponse<PaymentLink>>, ApiError> {
    let gateway = state.gateway()?;
    let service = PaymentService::new(gateway);
    let link = service
        .confirm_payment(&state.db.pool, &order_id, &payload.payment_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(link)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payment-links", get(get_links).post(create_link))
        .route("/payment-links/{order_id}", get(get_link))
        .route("/payment-links/{order_id}/line-items", put(update_line_items))
        .route("/payment-links/{order_id}/verify", post(confirm_payment))
}
