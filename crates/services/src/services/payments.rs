//! Payment-link lifecycle: creation with a frozen amount, verification, and
//! the background expiry sweep.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use db::{
    DBService,
    models::payment_link::{CreatePaymentLink, PaymentLink, PaymentLinkStatus},
};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    gateway::{GatewayError, PaymentGateway},
    invoice,
};

const CURRENCY: &str = "INR";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),
    #[error("payment link not found")]
    NotFound,
    #[error("payment link is {0}, not pending")]
    NotPending(PaymentLinkStatus),
    #[error("order {order_id} has no line items")]
    EmptyLineItems { order_id: String },
    #[error("gateway rejected the payment")]
    VerificationFailed,
    #[error(
        "payment {payment_id} for order {order_id} was captured but could not be recorded: {reason}"
    )]
    CapturedNotRecorded {
        order_id: String,
        payment_id: String,
        reason: String,
    },
}

/// Orchestrates the payment-link flow against the store and the gateway.
pub struct PaymentService {
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentService {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    /// Create a link: compute the authoritative amount once, open a gateway
    /// order for exactly that amount, then persist both together. The stored
    /// amount is never recomputed afterwards.
    pub async fn create_link(
        &self,
        pool: &SqlitePool,
        data: CreatePaymentLink,
    ) -> Result<PaymentLink, PaymentError> {
        if data.line_items.is_empty() {
            return Err(PaymentError::EmptyLineItems {
                order_id: data.order_id,
            });
        }

        let amount = invoice::authoritative_amount(
            &data.line_items,
            data.shipping_charges,
            data.adjustment,
            data.tds_option,
            data.tds_rate,
        );
        let amount_minor = (amount * 100.0).round() as i64;

        let order = self
            .gateway
            .create_order(amount_minor, CURRENCY, &data.order_id)
            .await?;

        info!(
            order_id = %data.order_id,
            gateway_order_id = %order.order_id,
            amount = amount,
            "Created gateway order for payment link"
        );

        let link =
            PaymentLink::create(pool, Uuid::new_v4(), &data, amount, Some(&order.order_id)).await?;
        Ok(link)
    }

    /// Verify a checkout result and record it. Idempotent: confirming an
    /// already-paid link succeeds without touching the store. A persistence
    /// failure after the gateway confirmed capture is surfaced as a distinct,
    /// retry-safe error rather than swallowed.
    pub async fn confirm_payment(
        &self,
        pool: &SqlitePool,
        order_id: &str,
        payment_id: &str,
    ) -> Result<PaymentLink, PaymentError> {
        let link = PaymentLink::find_by_order_id(pool, order_id)
            .await?
            .ok_or(PaymentError::NotFound)?;

        match link.status {
            PaymentLinkStatus::Paid => {
                debug!(order_id = %order_id, "Link already paid; confirm is a no-op");
                return Ok(link);
            }
            PaymentLinkStatus::Expired => {
                return Err(PaymentError::NotPending(link.status));
            }
            PaymentLinkStatus::Pending => {}
        }

        let gateway_order_id = link
            .gateway_order_id
            .as_deref()
            .ok_or(PaymentError::VerificationFailed)?;

        let verified = self
            .gateway
            .verify_payment(gateway_order_id, payment_id)
            .await?;
        if !verified {
            warn!(order_id = %order_id, payment_id = %payment_id, "Gateway verification failed");
            return Err(PaymentError::VerificationFailed);
        }

        // The gap between external capture and local record has no
        // compensating transaction; all we can do is make the record step
        // idempotent and loudly retryable.
        let rows_affected = match PaymentLink::mark_paid(pool, link.id, payment_id).await {
            Ok(rows) => rows,
            Err(e) => {
                error!(
                    order_id = %order_id,
                    payment_id = %payment_id,
                    error = %e,
                    "Payment captured at gateway but not recorded; confirm must be retried"
                );
                return Err(PaymentError::CapturedNotRecorded {
                    order_id: order_id.to_string(),
                    payment_id: payment_id.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        let link = PaymentLink::find_by_order_id(pool, order_id)
            .await?
            .ok_or(PaymentError::NotFound)?;

        // Zero affected rows means the link left `pending` while the gateway
        // call was in flight. A concurrent confirm landing first is fine; the
        // expiry sweep winning the race is a capture with no local record.
        if rows_affected == 0 {
            if link.status == PaymentLinkStatus::Paid {
                return Ok(link);
            }
            error!(
                order_id = %order_id,
                payment_id = %payment_id,
                status = %link.status,
                "Payment captured at gateway but link left pending during verification; confirm must be retried"
            );
            return Err(PaymentError::CapturedNotRecorded {
                order_id: order_id.to_string(),
                payment_id: payment_id.to_string(),
                reason: format!("link transitioned to {} during verification", link.status),
            });
        }

        Ok(link)
    }
}

/// Background sweep transitioning overdue pending links to expired.
pub struct LinkExpiryService {
    db: DBService,
    poll_interval: Duration,
}

impl LinkExpiryService {
    pub async fn spawn(db: DBService) -> tokio::task::JoinHandle<()> {
        let service = Self {
            db,
            poll_interval: Duration::from_secs(60),
        };
        tokio::spawn(async move {
            service.start().await;
        })
    }

    async fn start(&self) {
        info!(
            "Starting payment-link expiry service with interval {:?}",
            self.poll_interval
        );
        let mut interval = tokio::time::interval(self.poll_interval);
        loop {
            interval.tick().await;
            match PaymentLink::expire_overdue(&self.db.pool, Utc::now()).await {
                Ok(0) => {}
                Ok(n) => info!(expired = n, "Expired overdue payment links"),
                Err(e) => error!("Error expiring payment links: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use db::models::payment_link::{LineItem, TdsOption};

    use super::*;
    use crate::services::gateway::GatewayOrder;

    #[derive(Default)]
    struct MockGateway {
        orders: Mutex<Vec<(i64, String)>>,
        verify_result: AtomicBool,
        verify_calls: AtomicUsize,
    }

    #[async_trait]
    impl PaymentGateway for MockGateway {
        async fn create_order(
            &self,
            amount_minor: i64,
            currency: &str,
            receipt: &str,
        ) -> Result<GatewayOrder, GatewayError> {
            self.orders
                .lock()
                .unwrap()
                .push((amount_minor, receipt.to_string()));
            Ok(GatewayOrder {
                order_id: format!("gw_{receipt}"),
                amount: amount_minor,
                currency: currency.to_string(),
            })
        }

        async fn verify_payment(
            &self,
            _gateway_order_id: &str,
            _payment_id: &str,
        ) -> Result<bool, GatewayError> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.verify_result.load(Ordering::SeqCst))
        }
    }

    fn request(order_id: &str) -> CreatePaymentLink {
        CreatePaymentLink {
            order_id: order_id.to_string(),
            client_name: "Studio Mitti".to_string(),
            client_email: None,
            client_phone: None,
            billing_address: None,
            gst_number: None,
            line_items: vec![LineItem {
                description: "Jaali panels".to_string(),
                rate: 100.0,
                quantity: 10.0,
                discount_percent: 10.0,
                tax_rate_percent: 18.0,
            }],
            shipping_charges: 0.0,
            adjustment: 0.0,
            tds_option: TdsOption::None,
            tds_rate: 0.0,
            expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_link_freezes_amount_and_opens_gateway_order() {
        let db = DBService::new_in_memory().await.unwrap();
        let gateway = Arc::new(MockGateway::default());
        let service = PaymentService::new(gateway.clone());

        let link = service.create_link(&db.pool, request("ORD-1")).await.unwrap();

        // 1000 − 100 + 162 = 1062.00 → 106200 paise.
        assert_eq!(link.amount, 1062.0);
        assert_eq!(link.gateway_order_id.as_deref(), Some("gw_ORD-1"));
        assert_eq!(gateway.orders.lock().unwrap()[0], (106200, "ORD-1".to_string()));
    }

    #[tokio::test]
    async fn test_create_link_rejects_empty_line_items() {
        let db = DBService::new_in_memory().await.unwrap();
        let service = PaymentService::new(Arc::new(MockGateway::default()));
        let mut data = request("ORD-2");
        data.line_items.clear();
        assert!(matches!(
            service.create_link(&db.pool, data).await,
            Err(PaymentError::EmptyLineItems { .. })
        ));
    }

    #[tokio::test]
    async fn test_confirm_marks_paid_once_and_is_idempotent() {
        let db = DBService::new_in_memory().await.unwrap();
        let gateway = Arc::new(MockGateway::default());
        gateway.verify_result.store(true, Ordering::SeqCst);
        let service = PaymentService::new(gateway.clone());

        service.create_link(&db.pool, request("ORD-3")).await.unwrap();

        let paid = service
            .confirm_payment(&db.pool, "ORD-3", "pay_1")
            .await
            .unwrap();
        assert_eq!(paid.status, PaymentLinkStatus::Paid);
        assert_eq!(paid.payment_id.as_deref(), Some("pay_1"));

        // Second confirm is a no-op success and never re-verifies.
        let again = service
            .confirm_payment(&db.pool, "ORD-3", "pay_1")
            .await
            .unwrap();
        assert_eq!(again.status, PaymentLinkStatus::Paid);
        assert_eq!(gateway.verify_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_confirm_rejects_failed_verification() {
        let db = DBService::new_in_memory().await.unwrap();
        let gateway = Arc::new(MockGateway::default());
        let service = PaymentService::new(gateway);

        service.create_link(&db.pool, request("ORD-4")).await.unwrap();

        assert!(matches!(
            service.confirm_payment(&db.pool, "ORD-4", "pay_bad").await,
            Err(PaymentError::VerificationFailed)
        ));

        let link = PaymentLink::find_by_order_id(&db.pool, "ORD-4")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(link.status, PaymentLinkStatus::Pending);
    }

    /// Gateway fake whose verification races the expiry sweep: the link is
    /// swept to expired while the capture check is in flight.
    struct ExpiringGateway {
        pool: SqlitePool,
    }

    #[async_trait]
    impl PaymentGateway for ExpiringGateway {
        async fn create_order(
            &self,
            amount_minor: i64,
            currency: &str,
            receipt: &str,
        ) -> Result<GatewayOrder, GatewayError> {
            Ok(GatewayOrder {
                order_id: format!("gw_{receipt}"),
                amount: amount_minor,
                currency: currency.to_string(),
            })
        }

        async fn verify_payment(
            &self,
            _gateway_order_id: &str,
            _payment_id: &str,
        ) -> Result<bool, GatewayError> {
            PaymentLink::expire_overdue(&self.pool, Utc::now())
                .await
                .unwrap();
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_confirm_surfaces_expiry_race_during_verification() {
        let db = DBService::new_in_memory().await.unwrap();
        let service = PaymentService::new(Arc::new(ExpiringGateway {
            pool: db.pool.clone(),
        }));

        let mut data = request("ORD-6");
        data.expires_at = Some(Utc::now() - chrono::Duration::minutes(5));
        service.create_link(&db.pool, data).await.unwrap();

        // The link is still pending when confirm reads it; the sweep runs
        // during verification, so the paid transition matches no row.
        let result = service.confirm_payment(&db.pool, "ORD-6", "pay_1").await;
        assert!(matches!(
            result,
            Err(PaymentError::CapturedNotRecorded { .. })
        ));

        let link = PaymentLink::find_by_order_id(&db.pool, "ORD-6")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(link.status, PaymentLinkStatus::Expired);
        assert!(link.payment_id.is_none());
    }

    #[tokio::test]
    async fn test_confirm_rejects_expired_link() {
        let db = DBService::new_in_memory().await.unwrap();
        let gateway = Arc::new(MockGateway::default());
        gateway.verify_result.store(true, Ordering::SeqCst);
        let service = PaymentService::new(gateway);

        let mut data = request("ORD-5");
        data.expires_at = Some(Utc::now() - chrono::Duration::hours(1));
        service.create_link(&db.pool, data).await.unwrap();
        PaymentLink::expire_overdue(&db.pool, Utc::now()).await.unwrap();

        assert!(matches!(
            service.confirm_payment(&db.pool, "ORD-5", "pay_1").await,
            Err(PaymentError::NotPending(PaymentLinkStatus::Expired))
        ));
    }
}
