//! Business-intelligence aggregation for the admin dashboard.

use std::collections::HashMap;

use db::models::lead::{Lead, LeadStatus};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, SqlitePool, sqlite::SqliteRow};
use thiserror::Error;
use tracing::warn;
use ts_rs::TS;

/// Review data is not collected yet; the dashboard shows a fixed figure.
pub const PLACEHOLDER_AVG_RATING: f64 = 4.8;

/// How many partners the ranking surfaces.
const TOP_PARTNER_LIMIT: usize = 5;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct PartnerSummary {
    pub name: String,
    pub deal_count: u32,
    pub lifetime_value: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct DirectoryCounts {
    pub vendors: i64,
    pub labourers: i64,
    pub stock_items: i64,
    pub disputes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct DashboardStats {
    pub total_leads: u32,
    pub serious_leads: u32,
    pub new_leads: u32,
    pub converted_leads: u32,
    pub abandoned_leads: u32,
    pub directory: DirectoryCounts,
    pub average_rating: f64,
    pub top_partners: Vec<PartnerSummary>,
}

/// Pure aggregation over the lead set. Missing fields count as zero/empty; no
/// single record can fail the computation.
pub fn summarize(leads: &[Lead], directory: DirectoryCounts) -> DashboardStats {
    let mut new_leads = 0;
    let mut converted_leads = 0;
    let mut abandoned_leads = 0;
    let mut serious_leads = 0;

    let mut partners: HashMap<String, PartnerSummary> = HashMap::new();

    for lead in leads {
        match lead.status {
            LeadStatus::New => new_leads += 1,
            LeadStatus::Converted => converted_leads += 1,
            LeadStatus::PaymentPending => abandoned_leads += 1,
            _ => {}
        }
        if lead.is_serious {
            serious_leads += 1;
        }

        if lead.status == LeadStatus::Converted {
            let name = match lead.contact_name.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                // Unnamed conversions cannot be ranked.
                _ => continue,
            };
            let entry = partners.entry(name.clone()).or_insert(PartnerSummary {
                name,
                deal_count: 0,
                lifetime_value: 0.0,
            });
            entry.deal_count += 1;
            entry.lifetime_value += lead.deal_value.unwrap_or(0.0);
        }
    }

    let mut top_partners: Vec<PartnerSummary> = partners.into_values().collect();
    top_partners.sort_by(|a, b| {
        b.lifetime_value
            .total_cmp(&a.lifetime_value)
            .then_with(|| a.name.cmp(&b.name))
    });
    top_partners.truncate(TOP_PARTNER_LIMIT);

    DashboardStats {
        total_leads: leads.len() as u32,
        serious_leads,
        new_leads,
        converted_leads,
        abandoned_leads,
        directory,
        average_rating: PLACEHOLDER_AVG_RATING,
        top_partners,
    }
}

/// Load everything the dashboard needs and aggregate it.
pub struct DashboardService;

impl DashboardService {
    pub async fn stats(pool: &SqlitePool) -> Result<DashboardStats, DashboardError> {
        let leads = Self::load_leads_tolerant(pool).await?;
        let directory = DirectoryCounts {
            vendors: Self::count(pool, "vendors").await?,
            labourers: Self::count(pool, "labourers").await?,
            stock_items: Self::count(pool, "stock_items").await?,
            disputes: Self::count(pool, "disputes").await?,
        };
        Ok(summarize(&leads, directory))
    }

    /// Decode lead rows one at a time so a malformed record is skipped with a
    /// warning instead of aborting the whole aggregation.
    async fn load_leads_tolerant(pool: &SqlitePool) -> Result<Vec<Lead>, DashboardError> {
        let rows: Vec<SqliteRow> = sqlx::query(
            r#"SELECT id, contact_name, email, phone, role, city, product_slug, message,
                      status, is_serious, deal_value, fulfillment_status, courier,
                      tracking_number, dispatched_at, created_at, updated_at
               FROM leads"#,
        )
        .fetch_all(pool)
        .await?;

        let mut leads = Vec::with_capacity(rows.len());
        for row in rows {
            match Lead::from_row(&row) {
                Ok(lead) => leads.push(lead),
                Err(e) => {
                    let id = row.try_get::<String, _>("id").ok();
                    warn!(lead_id = ?id, error = %e, "Skipping undecodable lead record");
                }
            }
        }
        Ok(leads)
    }

    async fn count(pool: &SqlitePool, table: &str) -> Result<i64, DashboardError> {
        // Fixed table set; never interpolates caller input.
        debug_assert!(matches!(table, "vendors" | "labourers" | "stock_items" | "disputes"));
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use db::{DBService, models::lead::CreateLead};
    use uuid::Uuid;

    use super::*;

    fn lead(name: Option<&str>, status: LeadStatus, deal_value: Option<f64>, serious: bool) -> Lead {
        Lead {
            id: Uuid::new_v4(),
            contact_name: name.map(str::to_string),
            email: None,
            phone: None,
            role: None,
            city: None,
            product_slug: None,
            message: None,
            status,
            is_serious: serious,
            deal_value,
            fulfillment_status: None,
            courier: None,
            tracking_number: None,
            dispatched_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_buckets() {
        let leads = vec![
            lead(Some("A"), LeadStatus::New, None, true),
            lead(Some("B"), LeadStatus::Converted, Some(1000.0), false),
            lead(Some("C"), LeadStatus::PaymentPending, None, false),
            lead(Some("D"), LeadStatus::Lost, None, false),
        ];
        let stats = summarize(&leads, DirectoryCounts::default());
        assert_eq!(stats.total_leads, 4);
        assert_eq!(stats.new_leads, 1);
        assert_eq!(stats.converted_leads, 1);
        assert_eq!(stats.abandoned_leads, 1);
        assert_eq!(stats.serious_leads, 1);
        assert_eq!(stats.average_rating, PLACEHOLDER_AVG_RATING);
    }

    #[test]
    fn test_missing_fields_do_not_abort_aggregation() {
        let leads = vec![
            lead(None, LeadStatus::Converted, None, false),
            lead(Some("Asha Rao"), LeadStatus::Converted, Some(500.0), false),
        ];
        let stats = summarize(&leads, DirectoryCounts::default());
        // Both conversions counted even though one has no name or value.
        assert_eq!(stats.converted_leads, 2);
        // Only the named one can be ranked.
        assert_eq!(stats.top_partners.len(), 1);
        assert_eq!(stats.top_partners[0].name, "Asha Rao");
    }

    #[test]
    fn test_top_partners_ranked_by_lifetime_value() {
        let leads = vec![
            lead(Some("Small"), LeadStatus::Converted, Some(100.0), false),
            lead(Some("Big"), LeadStatus::Converted, Some(900.0), false),
            lead(Some("Big"), LeadStatus::Converted, Some(600.0), false),
            lead(Some("Mid"), LeadStatus::Converted, Some(800.0), false),
            // Not converted: excluded from ranking entirely.
            lead(Some("Lurker"), LeadStatus::Contacted, Some(9999.0), false),
        ];
        let stats = summarize(&leads, DirectoryCounts::default());
        let names: Vec<&str> = stats.top_partners.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Big", "Mid", "Small"]);
        assert_eq!(stats.top_partners[0].deal_count, 2);
        assert_eq!(stats.top_partners[0].lifetime_value, 1500.0);
    }

    #[tokio::test]
    async fn test_undecodable_lead_row_is_skipped() {
        let db = DBService::new_in_memory().await.unwrap();
        Lead::create(
            &db.pool,
            Uuid::new_v4(),
            &CreateLead {
                contact_name: Some("Asha Rao".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        // Written outside the model: a status value no variant matches.
        sqlx::query("INSERT INTO leads (id, status) VALUES ($1, 'mystery')")
            .bind(Uuid::new_v4())
            .execute(&db.pool)
            .await
            .unwrap();

        let stats = DashboardService::stats(&db.pool).await.unwrap();
        assert_eq!(stats.total_leads, 1);
        assert_eq!(stats.new_leads, 1);
    }

    #[tokio::test]
    async fn test_stats_from_store() {
        let db = DBService::new_in_memory().await.unwrap();
        Lead::create(
            &db.pool,
            Uuid::new_v4(),
            &CreateLead {
                contact_name: Some("Asha Rao".to_string()),
                is_serious: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        sqlx::query("INSERT INTO vendors (id, name) VALUES ($1, $2)")
            .bind(Uuid::new_v4())
            .bind("Kiln Co")
            .execute(&db.pool)
            .await
            .unwrap();

        let stats = DashboardService::stats(&db.pool).await.unwrap();
        assert_eq!(stats.total_leads, 1);
        assert_eq!(stats.serious_leads, 1);
        assert_eq!(stats.directory.vendors, 1);
        assert_eq!(stats.directory.disputes, 0);
    }
}
