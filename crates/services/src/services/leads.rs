//! Lead/sample-order operations: validation and fulfillment moves.

use db::models::lead::{FulfillmentStatus, Lead, ShippingInfo};
use regex::Regex;
use sqlx::SqlitePool;
use std::sync::OnceLock;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum LeadError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("lead not found")]
    NotFound,
    #[error("lead is not a sample order")]
    NotASampleOrder,
    #[error("invalid tracking number: {0}")]
    InvalidTrackingNumber(String),
    #[error("fulfillment can only advance one step forward ({from} → {to} rejected)")]
    InvalidFulfillmentMove {
        from: FulfillmentStatus,
        to: FulfillmentStatus,
    },
}

fn tracking_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9-]{6,24}$").expect("valid regex"))
}

/// Courier tracking numbers are alphanumeric (dashes allowed), 6–24 chars.
pub fn validate_tracking_number(value: &str) -> Result<(), LeadError> {
    if tracking_number_re().is_match(value) {
        Ok(())
    } else {
        Err(LeadError::InvalidTrackingNumber(value.to_string()))
    }
}

pub struct LeadService;

impl LeadService {
    /// Move a sample order one column forward in the shipping pipeline.
    /// Backward moves and skips are rejected before any write.
    pub async fn advance_fulfillment(
        pool: &SqlitePool,
        id: Uuid,
        target: FulfillmentStatus,
    ) -> Result<Lead, LeadError> {
        let lead = Lead::find_by_id(pool, id).await?.ok_or(LeadError::NotFound)?;
        let current = lead.fulfillment_status.ok_or(LeadError::NotASampleOrder)?;

        if target.rank() != current.rank() + 1 {
            return Err(LeadError::InvalidFulfillmentMove {
                from: current,
                to: target,
            });
        }

        Ok(Lead::update_fulfillment_status(pool, id, target).await?)
    }

    /// Record shipping details; the tracking number is validated before any
    /// network or store call.
    pub async fn update_shipping(
        pool: &SqlitePool,
        id: Uuid,
        shipping: ShippingInfo,
    ) -> Result<Lead, LeadError> {
        if let Some(tracking) = shipping.tracking_number.as_deref() {
            validate_tracking_number(tracking)?;
        }
        if Lead::find_by_id(pool, id).await?.is_none() {
            return Err(LeadError::NotFound);
        }
        Ok(Lead::update_shipping(pool, id, &shipping).await?)
    }
}

#[cfg(test)]
mod tests {
    use db::{DBService, models::lead::CreateLead};

    use super::*;

    async fn sample_order(db: &DBService) -> Lead {
        Lead::create(
            &db.pool,
            Uuid::new_v4(),
            &CreateLead {
                contact_name: Some("Asha Rao".to_string()),
                fulfillment_status: Some(FulfillmentStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_tracking_number_format() {
        assert!(validate_tracking_number("BLUEDART-12345").is_ok());
        assert!(validate_tracking_number("AWB123456").is_ok());
        assert!(validate_tracking_number("x1").is_err());
        assert!(validate_tracking_number("has spaces 123").is_err());
        assert!(validate_tracking_number("").is_err());
    }

    #[tokio::test]
    async fn test_single_step_forward_move() {
        let db = DBService::new_in_memory().await.unwrap();
        let lead = sample_order(&db).await;

        let moved = LeadService::advance_fulfillment(&db.pool, lead.id, FulfillmentStatus::Processing)
            .await
            .unwrap();
        assert_eq!(moved.fulfillment_status, Some(FulfillmentStatus::Processing));
    }

    #[tokio::test]
    async fn test_skip_and_backward_moves_rejected() {
        let db = DBService::new_in_memory().await.unwrap();
        let lead = sample_order(&db).await;

        assert!(matches!(
            LeadService::advance_fulfillment(&db.pool, lead.id, FulfillmentStatus::Shipped).await,
            Err(LeadError::InvalidFulfillmentMove { .. })
        ));

        LeadService::advance_fulfillment(&db.pool, lead.id, FulfillmentStatus::Processing)
            .await
            .unwrap();
        assert!(matches!(
            LeadService::advance_fulfillment(&db.pool, lead.id, FulfillmentStatus::Pending).await,
            Err(LeadError::InvalidFulfillmentMove { .. })
        ));
    }

    #[tokio::test]
    async fn test_shipping_rejected_before_write_on_bad_tracking() {
        let db = DBService::new_in_memory().await.unwrap();
        let lead = sample_order(&db).await;

        let result = LeadService::update_shipping(
            &db.pool,
            lead.id,
            ShippingInfo {
                courier: Some("BlueDart".to_string()),
                tracking_number: Some("bad tracking!".to_string()),
                dispatched_at: None,
            },
        )
        .await;
        assert!(matches!(result, Err(LeadError::InvalidTrackingNumber(_))));

        let stored = Lead::find_by_id(&db.pool, lead.id).await.unwrap().unwrap();
        assert!(stored.courier.is_none());
    }
}
