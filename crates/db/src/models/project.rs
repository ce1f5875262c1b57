use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, Type, types::Json};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Type, Serialize, Deserialize, PartialEq, TS, EnumString, Display)]
#[sqlx(type_name = "project_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectType {
    Residential,
    Commercial,
    Hospitality,
    Institutional,
}

/// A completed installation shown on the site, with the products it used.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Project {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub location: String,
    pub project_type: ProjectType,
    pub image: Option<String>,
    #[ts(as = "Vec<String>")]
    pub gallery: Json<Vec<String>>,
    pub description: Option<String>,
    pub is_featured: bool,
    #[ts(as = "Vec<String>")]
    pub product_slugs: Json<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProject {
    pub slug: String,
    pub title: String,
    pub location: String,
    pub project_type: ProjectType,
    pub image: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub product_slugs: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub location: Option<String>,
    pub project_type: Option<ProjectType>,
    pub image: Option<String>,
    pub gallery: Option<Vec<String>>,
    pub description: Option<String>,
    pub is_featured: Option<bool>,
    pub product_slugs: Option<Vec<String>>,
}

const PROJECT_COLUMNS: &str = "id, slug, title, location, project_type, image, gallery, description, is_featured, product_slugs, created_at, updated_at";

impl Project {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_featured(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE is_featured = 1 ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateProject,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"INSERT INTO projects (id, slug, title, location, project_type, image, gallery, description, is_featured, product_slugs)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {PROJECT_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.slug)
        .bind(&data.title)
        .bind(&data.location)
        .bind(&data.project_type)
        .bind(&data.image)
        .bind(Json(&data.gallery))
        .bind(&data.description)
        .bind(data.is_featured)
        .bind(Json(&data.product_slugs))
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProject,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"UPDATE projects SET
                 title         = COALESCE($2, title),
                 location      = COALESCE($3, location),
                 project_type  = COALESCE($4, project_type),
                 image         = COALESCE($5, image),
                 gallery       = COALESCE($6, gallery),
                 description   = COALESCE($7, description),
                 is_featured   = COALESCE($8, is_featured),
                 product_slugs = COALESCE($9, product_slugs),
                 updated_at    = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING {PROJECT_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.title)
        .bind(&data.location)
        .bind(&data.project_type)
        .bind(&data.image)
        .bind(data.gallery.as_ref().map(Json))
        .bind(&data.description)
        .bind(data.is_featured)
        .bind(data.product_slugs.as_ref().map(Json))
        .fetch_one(pool)
        .await
    }

    /// Append uploaded image URLs to the gallery. Read-modify-write of the
    /// JSON column; the store gives document-level atomicity only.
    pub async fn append_gallery(
        pool: &SqlitePool,
        id: Uuid,
        urls: &[String],
    ) -> Result<Self, sqlx::Error> {
        let current = Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        let mut gallery = current.gallery.0;
        gallery.extend(urls.iter().cloned());

        sqlx::query_as::<_, Self>(&format!(
            r#"UPDATE projects SET gallery = $2, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING {PROJECT_COLUMNS}"#
        ))
        .bind(id)
        .bind(Json(&gallery))
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
