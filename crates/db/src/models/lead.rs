use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default)]
#[sqlx(type_name = "lead_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Converted,
    PaymentPending,
    Lost,
}

/// Shipping pipeline for a physical sample order. Only ever advances through
/// the column order pending → processing → shipped → delivered.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "fulfillment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FulfillmentStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
}

impl FulfillmentStatus {
    /// Position in the pipeline column order.
    pub fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Shipped => 2,
            Self::Delivered => 3,
        }
    }
}

/// An enquiry or sample order. Almost every field is optional: leads arrive
/// from loosely validated public forms and the aggregation layer must cope.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Lead {
    pub id: Uuid,
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub city: Option<String>,
    pub product_slug: Option<String>,
    pub message: Option<String>,
    pub status: LeadStatus,
    pub is_serious: bool,
    pub deal_value: Option<f64>,
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct CreateLead {
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub city: Option<String>,
    pub product_slug: Option<String>,
    pub message: Option<String>,
    #[serde(default)]
    pub is_serious: bool,
    /// Set for sample orders entering the fulfillment pipeline.
    pub fulfillment_status: Option<FulfillmentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ShippingInfo {
    pub courier: Option<String>,
    pub tracking_number: Option<String>,
    pub dispatched_at: Option<DateTime<Utc>>,
}

const LEAD_COLUMNS: &str = "id, contact_name, email, phone, role, city, product_slug, message, status, is_serious, deal_value, fulfillment_status, courier, tracking_number, dispatched_at, created_at, updated_at";

impl Lead {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!("SELECT {LEAD_COLUMNS} FROM leads WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn create(pool: &SqlitePool, id: Uuid, data: &CreateLead) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"INSERT INTO leads (id, contact_name, email, phone, role, city, product_slug, message, is_serious, fulfillment_status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {LEAD_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.contact_name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(&data.role)
        .bind(&data.city)
        .bind(&data.product_slug)
        .bind(&data.message)
        .bind(data.is_serious)
        .bind(data.fulfillment_status)
        .fetch_one(pool)
        .await
    }

    pub async fn update_status(
        pool: &SqlitePool,
        id: Uuid,
        status: LeadStatus,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"UPDATE leads SET status = $2, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING {LEAD_COLUMNS}"#
        ))
        .bind(id)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    pub async fn update_deal_value(
        pool: &SqlitePool,
        id: Uuid,
        deal_value: Option<f64>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE leads SET deal_value = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1")
            .bind(id)
            .bind(deal_value)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn update_fulfillment_status(
        pool: &SqlitePool,
        id: Uuid,
        status: FulfillmentStatus,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"UPDATE leads SET fulfillment_status = $2, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING {LEAD_COLUMNS}"#
        ))
        .bind(id)
        .bind(status)
        .fetch_one(pool)
        .await
    }

    pub async fn update_shipping(
        pool: &SqlitePool,
        id: Uuid,
        shipping: &ShippingInfo,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"UPDATE leads SET
                 courier         = COALESCE($2, courier),
                 tracking_number = COALESCE($3, tracking_number),
                 dispatched_at   = COALESCE($4, dispatched_at),
                 updated_at      = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING {LEAD_COLUMNS}"#
        ))
        .bind(id)
        .bind(&shipping.courier)
        .bind(&shipping.tracking_number)
        .bind(shipping.dispatched_at)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM leads WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
