use std::sync::Arc;

use axum::Router;
use db::DBService;
use services::services::{assets::AssetStore, gateway::PaymentGateway, genai::GenAiClient};
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod routes;

/// Shared application state. The gateway and AI client are optional: without
/// credentials the server still boots and the affected routes report
/// "not configured".
#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub gateway: Option<Arc<dyn PaymentGateway>>,
    pub genai: Option<Arc<GenAiClient>>,
    pub assets: Arc<AssetStore>,
}

impl AppState {
    pub fn gateway(&self) -> Result<Arc<dyn PaymentGateway>, error::ApiError> {
        self.gateway
            .clone()
            .ok_or(error::ApiError::NotConfigured("payment gateway"))
    }

    pub fn genai(&self) -> Result<Arc<GenAiClient>, error::ApiError> {
        self.genai
            .clone()
            .ok_or(error::ApiError::NotConfigured("ai studio"))
    }
}

/// Build the full application router. Uploaded imagery and the bundled stock
/// assets (including the AI-studio fallback image) are both served statically.
pub fn app(state: AppState, asset_dir: &str, stock_dir: &str) -> Router {
    let api = Router::new()
        .merge(routes::health::router())
        .merge(routes::products::router())
        .merge(routes::projects::router())
        .merge(routes::leads::router())
        .merge(routes::catalogue::router())
        .merge(routes::seo::router())
        .merge(routes::dashboard::router())
        .merge(routes::payments::router())
        .merge(routes::journal::router())
        .merge(routes::studio::router())
        .merge(routes::uploads::router());

    Router::new()
        .nest("/api", api)
        .nest_service("/assets/uploads", ServeDir::new(asset_dir))
        .nest_service("/assets/stock", ServeDir::new(stock_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use services::services::studio::FALLBACK_IMAGE_URL;
    use tower::ServiceExt;

    use super::*;

    #[tokio::test]
    async fn test_stock_fallback_asset_is_served() {
        let db = DBService::new_in_memory().await.unwrap();
        let uploads = tempfile::tempdir().unwrap();
        let stock = tempfile::tempdir().unwrap();
        std::fs::write(stock.path().join("terracotta-facade.jpg"), b"jpegdata").unwrap();

        let state = AppState {
            db,
            gateway: None,
            genai: None,
            assets: Arc::new(AssetStore::new(uploads.path(), "/assets/uploads")),
        };
        let app = app(
            state,
            uploads.path().to_str().unwrap(),
            stock.path().to_str().unwrap(),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri(FALLBACK_IMAGE_URL)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
