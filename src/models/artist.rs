use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Artist {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Artist {
    pub async fn create(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        let artist = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO artists (name) VALUES ($1) RETURNING *
            "#,
        )
        .bind(name)
        .fetch_one(pool)
        .await?;

        Ok(artist)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let artist = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM artists WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(artist)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let artists = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM artists ORDER BY name ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(artists)
    }
}
