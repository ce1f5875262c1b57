use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

/// One billable row on an invoice. Percentages are expressed as 0–100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct LineItem {
    pub description: String,
    pub rate: f64,
    pub quantity: f64,
    #[serde(default)]
    pub discount_percent: f64,
    #[serde(default)]
    pub tax_rate_percent: f64,
}

/// Settlement adjustment applied against the post-discount subtotal.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "tds_option", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TdsOption {
    #[default]
    None,
    Tds,
    Tcs,
}

/// Link lifecycle. `Paid` and `Expired` are terminal; nothing ever returns to
/// `Pending`.
#[derive(
    Debug, Clone, Copy, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display, Default,
)]
#[sqlx(type_name = "payment_link_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentLinkStatus {
    #[default]
    Pending,
    Paid,
    Expired,
}

/// A payment link / invoice. `amount` is the authoritative payable total,
/// written exactly once at creation. Line items may be edited afterwards for
/// display, but no code path recomputes `amount` from them.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct PaymentLink {
    pub id: Uuid,
    pub order_id: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub billing_address: Option<String>,
    pub gst_number: Option<String>,
    #[ts(as = "Vec<LineItem>")]
    pub line_items: Json<Vec<LineItem>>,
    pub shipping_charges: f64,
    pub adjustment: f64,
    pub tds_option: TdsOption,
    pub tds_rate: f64,
    pub status: PaymentLinkStatus,
    pub amount: f64,
    pub gateway_order_id: Option<String>,
    pub payment_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreatePaymentLink {
    pub order_id: String,
    pub client_name: String,
    pub client_email: Option<String>,
    pub client_phone: Option<String>,
    pub billing_address: Option<String>,
    pub gst_number: Option<String>,
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub shipping_charges: f64,
    #[serde(default)]
    pub adjustment: f64,
    #[serde(default)]
    pub tds_option: TdsOption,
    #[serde(default)]
    pub tds_rate: f64,
    pub expires_at: Option<DateTime<Utc>>,
}

const LINK_COLUMNS: &str = "id, order_id, client_name, client_email, client_phone, billing_address, gst_number, line_items, shipping_charges, adjustment, tds_option, tds_rate, status, amount, gateway_order_id, payment_id, expires_at, created_at, updated_at";

impl PaymentLink {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {LINK_COLUMNS} FROM payment_links ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_order_id(
        pool: &SqlitePool,
        order_id: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {LINK_COLUMNS} FROM payment_links WHERE order_id = $1"
        ))
        .bind(order_id)
        .fetch_optional(pool)
        .await
    }

    /// Insert a link with its frozen `amount`. This is the only place the
    /// amount column is ever written.
    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreatePaymentLink,
        amount: f64,
        gateway_order_id: Option<&str>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"INSERT INTO payment_links
                 (id, order_id, client_name, client_email, client_phone, billing_address, gst_number,
                  line_items, shipping_charges, adjustment, tds_option, tds_rate, amount,
                  gateway_order_id, expires_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
               RETURNING {LINK_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.order_id)
        .bind(&data.client_name)
        .bind(&data.client_email)
        .bind(&data.client_phone)
        .bind(&data.billing_address)
        .bind(&data.gst_number)
        .bind(Json(&data.line_items))
        .bind(data.shipping_charges)
        .bind(data.adjustment)
        .bind(data.tds_option)
        .bind(data.tds_rate)
        .bind(amount)
        .bind(gateway_order_id)
        .bind(data.expires_at)
        .fetch_one(pool)
        .await
    }

    /// Display-only edit. Deliberately does not touch `amount`.
    pub async fn update_line_items(
        pool: &SqlitePool,
        id: Uuid,
        line_items: &[LineItem],
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"UPDATE payment_links SET line_items = $2, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING {LINK_COLUMNS}"#
        ))
        .bind(id)
        .bind(Json(line_items))
        .fetch_one(pool)
        .await
    }

    /// Transition pending → paid, recording the gateway payment id. Guarded by
    /// the status predicate so a concurrent or repeated call cannot
    /// double-transition; returns the affected-row count.
    pub async fn mark_paid(
        pool: &SqlitePool,
        id: Uuid,
        payment_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE payment_links
               SET status = 'paid', payment_id = $2, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1 AND status = 'pending'"#,
        )
        .bind(id)
        .bind(payment_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Transition all overdue pending links to expired. Terminal states are
    /// never touched.
    pub async fn expire_overdue(pool: &SqlitePool, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"UPDATE payment_links
               SET status = 'expired', updated_at = CURRENT_TIMESTAMP
               WHERE status = 'pending'
                 AND expires_at IS NOT NULL
                 AND expires_at < $1"#,
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM payment_links WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::DBService;

    fn sample(order_id: &str) -> CreatePaymentLink {
        CreatePaymentLink {
            order_id: order_id.to_string(),
            client_name: "Studio Mitti".to_string(),
            client_email: None,
            client_phone: None,
            billing_address: None,
            gst_number: None,
            line_items: vec![LineItem {
                description: "Terracotta jaali panels".to_string(),
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
    async fn test_amount_frozen_across_line_item_edits() {
        let db = DBService::new_in_memory().await.unwrap();
        let link = PaymentLink::create(&db.pool, Uuid::new_v4(), &sample("ORD-001"), 1062.0, None)
            .await
            .unwrap();
        assert_eq!(link.amount, 1062.0);

        let edited = PaymentLink::update_line_items(
            &db.pool,
            link.id,
            &[LineItem {
                description: "Completely different items".to_string(),
                rate: 9999.0,
                quantity: 3.0,
                discount_percent: 0.0,
                tax_rate_percent: 0.0,
            }],
        )
        .await
        .unwrap();

        assert_eq!(edited.amount, 1062.0);
    }

    #[tokio::test]
    async fn test_mark_paid_is_single_shot() {
        let db = DBService::new_in_memory().await.unwrap();
        let link = PaymentLink::create(&db.pool, Uuid::new_v4(), &sample("ORD-002"), 500.0, None)
            .await
            .unwrap();

        assert_eq!(PaymentLink::mark_paid(&db.pool, link.id, "pay_1").await.unwrap(), 1);
        // Second transition attempt matches no pending row.
        assert_eq!(PaymentLink::mark_paid(&db.pool, link.id, "pay_2").await.unwrap(), 0);

        let stored = PaymentLink::find_by_order_id(&db.pool, "ORD-002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, PaymentLinkStatus::Paid);
        assert_eq!(stored.payment_id.as_deref(), Some("pay_1"));
    }

    #[tokio::test]
    async fn test_expire_overdue_skips_paid_links() {
        let db = DBService::new_in_memory().await.unwrap();
        let now = Utc::now();

        let mut overdue = sample("ORD-003");
        overdue.expires_at = Some(now - Duration::hours(1));
        let overdue = PaymentLink::create(&db.pool, Uuid::new_v4(), &overdue, 500.0, None)
            .await
            .unwrap();

        let mut paid = sample("ORD-004");
        paid.expires_at = Some(now - Duration::hours(1));
        let paid = PaymentLink::create(&db.pool, Uuid::new_v4(), &paid, 500.0, None)
            .await
            .unwrap();
        PaymentLink::mark_paid(&db.pool, paid.id, "pay_x").await.unwrap();

        assert_eq!(PaymentLink::expire_overdue(&db.pool, now).await.unwrap(), 1);

        let overdue = PaymentLink::find_by_order_id(&db.pool, "ORD-003").await.unwrap().unwrap();
        assert_eq!(overdue.status, PaymentLinkStatus::Expired);
        let paid = PaymentLink::find_by_order_id(&db.pool, "ORD-004").await.unwrap().unwrap();
        assert_eq!(paid.status, PaymentLinkStatus::Paid);
    }
}
