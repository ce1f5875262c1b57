use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool, types::Json};
use ts_rs::TS;
use uuid::Uuid;

/// A journal article. Drafts come in either from the admin editor or from the
/// AI studio and are published separately.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct JournalPost {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
    #[ts(as = "Vec<String>")]
    pub tags: Json<Vec<String>>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateJournalPost {
    pub slug: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

const JOURNAL_COLUMNS: &str =
    "id, slug, title, excerpt, body, tags, published, created_at, updated_at";

impl JournalPost {
    /// Published posts only, newest first; this is what the public site lists.
    pub async fn find_published(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journal_posts WHERE published = 1 ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journal_posts ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journal_posts WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateJournalPost,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"INSERT INTO journal_posts (id, slug, title, excerpt, body, tags)
               VALUES ($1, $2, $3, $4, $5, $6)
               RETURNING {JOURNAL_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.slug)
        .bind(&data.title)
        .bind(&data.excerpt)
        .bind(&data.body)
        .bind(Json(&data.tags))
        .fetch_one(pool)
        .await
    }

    pub async fn set_published(
        pool: &SqlitePool,
        id: Uuid,
        published: bool,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Self>(&format!(
            r#"UPDATE journal_posts SET published = $2, updated_at = CURRENT_TIMESTAMP
               WHERE id = $1
               RETURNING {JOURNAL_COLUMNS}"#
        ))
        .bind(id)
        .bind(published)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM journal_posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
