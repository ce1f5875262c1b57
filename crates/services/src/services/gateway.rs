//! Payment gateway client.
//!
//! Order creation and payment verification go through the `PaymentGateway`
//! trait so the payment-link service can be exercised against a fake. The real
//! implementation talks to Razorpay's REST API; verification is a server-side
//! fetch of the payment record returning a boolean, and is never retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const RAZORPAY_API_URL: &str = "https://api.razorpay.com/v1";

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("invalid gateway credentials")]
    InvalidCredentials,
    #[error("json error: {0}")]
    Serde(String),
    #[error("missing gateway credentials: RAZORPAY_KEY_ID / RAZORPAY_KEY_SECRET not set")]
    MissingCredentials,
}

/// Gateway order as returned by order creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub order_id: String,
    /// Amount in the currency's minor unit (paise).
    pub amount: i64,
    pub currency: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a gateway order for the given minor-unit amount.
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError>;

    /// Server-side check that a captured payment exists for the given order.
    async fn verify_payment(
        &self,
        gateway_order_id: &str,
        payment_id: &str,
    ) -> Result<bool, GatewayError>;
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct PaymentResponse {
    order_id: Option<String>,
    status: String,
}

/// Razorpay REST client.
#[derive(Debug, Clone)]
pub struct RazorpayClient {
    http: Client,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn from_env() -> Result<Self, GatewayError> {
        let key_id =
            std::env::var("RAZORPAY_KEY_ID").map_err(|_| GatewayError::MissingCredentials)?;
        let key_secret =
            std::env::var("RAZORPAY_KEY_SECRET").map_err(|_| GatewayError::MissingCredentials)?;
        Self::new(key_id, key_secret)
    }

    pub fn new(key_id: String, key_secret: String) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .user_agent(concat!("clayhaus/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            key_id,
            key_secret,
        })
    }

    async fn parse<T: for<'de> Deserialize<'de>>(
        res: reqwest::Response,
    ) -> Result<T, GatewayError> {
        match res.status() {
            s if s.is_success() => res
                .json::<T>()
                .await
                .map_err(|e| GatewayError::Serde(e.to_string())),
            StatusCode::UNAUTHORIZED => Err(GatewayError::InvalidCredentials),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(GatewayError::Http { status, body })
            }
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<GatewayOrder, GatewayError> {
        let res = self
            .http
            .post(format!("{RAZORPAY_API_URL}/orders"))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderRequest {
                amount: amount_minor,
                currency,
                receipt,
            })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let order: OrderResponse = Self::parse(res).await?;
        Ok(GatewayOrder {
            order_id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }

    async fn verify_payment(
        &self,
        gateway_order_id: &str,
        payment_id: &str,
    ) -> Result<bool, GatewayError> {
        let res = self
            .http
            .get(format!("{RAZORPAY_API_URL}/payments/{payment_id}"))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let payment: PaymentResponse = Self::parse(res).await?;
        Ok(payment.status == "captured"
            && payment.order_id.as_deref() == Some(gateway_order_id))
    }
}

fn map_reqwest_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(e.to_string())
    }
}
