use std::sync::Arc;

use anyhow::Result;
use db::DBService;
use server::{AppState, app, config::Config};
use services::services::{
    assets::AssetStore,
    gateway::{PaymentGateway, RazorpayClient},
    genai::GenAiClient,
    payments::LinkExpiryService,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    let db = DBService::new(&config.database_url).await?;

    let gateway: Option<Arc<dyn PaymentGateway>> = match RazorpayClient::from_env() {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("Payment gateway disabled: {e}");
            None
        }
    };
    let genai = match GenAiClient::from_env() {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("AI studio disabled: {e}");
            None
        }
    };

    let assets = Arc::new(AssetStore::new(
        &config.asset_dir,
        &config.asset_public_base,
    ));

    let _expiry = LinkExpiryService::spawn(db.clone()).await;

    let state = AppState {
        db,
        gateway,
        genai,
        assets,
    };
    let router = app(state, &config.asset_dir, &config.stock_dir);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
