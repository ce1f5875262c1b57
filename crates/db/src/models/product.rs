use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

/// A named variant of a product (finish, colour, profile) with its own imagery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct ProductVariant {
    pub name: String,
    pub image_url: Option<String>,
    #[serde(default)]
    pub gallery: Vec<String>,
}

/// A named grouping of variants carrying its own specs and price band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct ProductCollection {
    pub name: String,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
    pub price_range: Option<String>,
}

/// A catalog product. Stored as a document: list/map fields live in JSON
/// columns and are replaced wholesale on update, matching the coarse-grained
/// patch semantics of the admin editor.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Product {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    #[ts(as = "Vec<String>")]
    pub images: Json<Vec<String>>,
    #[ts(as = "Vec<ProductVariant>")]
    pub variants: Json<Vec<ProductVariant>>,
    #[ts(as = "Vec<ProductCollection>")]
    pub collections: Json<Vec<ProductCollection>>,
    #[ts(as = "BTreeMap<String, String>")]
    pub specs: Json<BTreeMap<String, String>>,
    pub price_range: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProduct {
    pub slug: String,
    pub title: String,
    pub category: String,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub collections: Vec<ProductCollection>,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
    pub price_range: Option<String>,
}

/// Patch payload: absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct UpdateProduct {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub variants: Option<Vec<ProductVariant>>,
    pub collections: Option<Vec<ProductCollection>>,
    pub specs: Option<BTreeMap<String, String>>,
    pub price_range: Option<String>,
}

const PRODUCT_COLUMNS: &str = "id, slug, title, category, description, images, variants, collections, specs, price_range, created_at, updated_at";

impl Product {
    /// All products in fetch order. The catalogue generator depends on this
    /// ordering being stable across calls.
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at ASC, slug ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateProduct,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"INSERT INTO products (id, slug, title, category, description, images, variants, collections, specs, price_range)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
               RETURNING {PRODUCT_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.slug)
        .bind(&data.title)
        .bind(&data.category)
        .bind(&data.description)
        .bind(Json(&data.images))
        .bind(Json(&data.variants))
        .bind(Json(&data.collections))
        .bind(Json(&data.specs))
        .bind(&data.price_range)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProduct,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"UPDATE products SET
                 title       = COALESCE($2, title),
                 category    = COALESCE($3, category),
                 description = COALESCE($4, description),
                 images      = COALESCE($5, images),
                 variants    = COALESCE($6, variants),
                 collections = COALESCE($7, collections),
                 specs       = COALESCE($8, specs),
                 price_range = COALESCE($9, price_range),
                 updated_at  = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING {PRODUCT_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.title)
        .bind(&data.category)
        .bind(&data.description)
        .bind(data.images.as_ref().map(Json))
        .bind(data.variants.as_ref().map(Json))
        .bind(data.collections.as_ref().map(Json))
        .bind(data.specs.as_ref().map(Json))
        .bind(&data.price_range)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn sample(slug: &str, title: &str) -> CreateProduct {
        CreateProduct {
            slug: slug.to_string(),
            title: title.to_string(),
            category: "tiles".to_string(),
            description: Some("Hand-moulded terracotta.".to_string()),
            images: vec!["/assets/one.jpg".to_string()],
            variants: vec![ProductVariant {
                name: "Natural".to_string(),
                image_url: None,
                gallery: vec![],
            }],
            collections: vec![],
            specs: BTreeMap::from([("thickness".to_string(), "20mm".to_string())]),
            price_range: Some("₹80–₹140 / sq ft".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_by_slug() {
        let db = DBService::new_in_memory().await.unwrap();
        let created = Product::create(&db.pool, Uuid::new_v4(), &sample("clay-roof-tile", "Clay Roof Tile"))
            .await
            .unwrap();
        assert_eq!(created.slug, "clay-roof-tile");
        assert_eq!(created.variants.0.len(), 1);

        let found = Product::find_by_slug(&db.pool, "clay-roof-tile")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.specs.0.get("thickness").map(String::as_str), Some("20mm"));
    }

    #[tokio::test]
    async fn test_patch_leaves_absent_fields_untouched() {
        let db = DBService::new_in_memory().await.unwrap();
        let created = Product::create(&db.pool, Uuid::new_v4(), &sample("jaali-floral", "Terracotta Jaali Floral"))
            .await
            .unwrap();

        let patched = Product::update(
            &db.pool,
            created.id,
            &UpdateProduct {
                title: Some("Terracotta Jaali Floral II".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(patched.title, "Terracotta Jaali Floral II");
        assert_eq!(patched.category, "tiles");
        assert_eq!(patched.images.0, created.images.0);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = DBService::new_in_memory().await.unwrap();
        let created = Product::create(&db.pool, Uuid::new_v4(), &sample("brick-classic", "Exposed Brick Classic"))
            .await
            .unwrap();
        assert_eq!(Product::delete(&db.pool, created.id).await.unwrap(), 1);
        assert!(Product::find_by_id(&db.pool, created.id).await.unwrap().is_none());
    }
}
