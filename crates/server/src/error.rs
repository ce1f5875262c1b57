use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    dashboard::DashboardError, gateway::GatewayError, leads::LeadError, payments::PaymentError,
    studio::StudioError,
};
use thiserror::Error;
use utils::response::ApiResponse;

/// Central error type for the HTTP surface. Everything is rendered as the
/// `{success: false, message}` envelope; upstream errors are never thrown past
/// this boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Payment(#[from] PaymentError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Lead(#[from] LeadError),
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
    #[error(transparent)]
    Studio(#[from] StudioError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Lead(LeadError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Lead(_) => StatusCode::BAD_REQUEST,
            ApiError::Payment(PaymentError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Payment(PaymentError::NotPending(_) | PaymentError::EmptyLineItems { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Payment(PaymentError::VerificationFailed) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let body: ApiResponse<()> = ApiResponse::error(self.to_string());
        (status, Json(body)).into_response()
    }
}
