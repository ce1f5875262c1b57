use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

/// City-specific SEO landing page document, edited through the admin SEO
/// editor.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct CityPage {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub region: String,
    pub hero_title: String,
    pub hero_subtitle: Option<String>,
    pub climate_advice: Option<String>,
    #[ts(as = "Vec<String>")]
    pub areas_served: Json<Vec<String>>,
    #[ts(as = "Vec<FaqItem>")]
    pub faq: Json<Vec<FaqItem>>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[ts(as = "Vec<String>")]
    pub keywords: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCityPage {
    pub slug: String,
    pub name: String,
    pub region: String,
    pub hero_title: String,
    pub hero_subtitle: Option<String>,
    pub climate_advice: Option<String>,
    #[serde(default)]
    pub areas_served: Vec<String>,
    #[serde(default)]
    pub faq: Vec<FaqItem>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// SEO-editor patch: only the metadata fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateCitySeo {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<Vec<String>>,
}

const CITY_COLUMNS: &str = "id, slug, name, region, hero_title, hero_subtitle, climate_advice, areas_served, faq, meta_title, meta_description, keywords, created_at, updated_at";

impl CityPage {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {CITY_COLUMNS} FROM city_pages ORDER BY name ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {CITY_COLUMNS} FROM city_pages WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {CITY_COLUMNS} FROM city_pages WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateCityPage,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"INSERT INTO city_pages (id, slug, name, region, hero_title, hero_subtitle, climate_advice, areas_served, faq, meta_title, meta_description, keywords)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
               RETURNING {CITY_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.slug)
        .bind(&data.name)
        .bind(&data.region)
        .bind(&data.hero_title)
        .bind(&data.hero_subtitle)
        .bind(&data.climate_advice)
        .bind(Json(&data.areas_served))
        .bind(Json(&data.faq))
        .bind(&data.meta_title)
        .bind(&data.meta_description)
        .bind(Json(&data.keywords))
        .fetch_one(pool)
        .await
    }

    pub async fn update_seo(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateCitySeo,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"UPDATE city_pages SET
                 meta_title       = COALESCE($2, meta_title),
                 meta_description = COALESCE($3, meta_description),
                 keywords         = COALESCE($4, keywords),
                 updated_at       = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING {CITY_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.meta_title)
        .bind(&data.meta_description)
        .bind(data.keywords.as_ref().map(Json))
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM city_pages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
