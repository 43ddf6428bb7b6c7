use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Submission {
    pub id: Uuid,
    pub kind: String, // "artist" or "vendor"
    pub name: String,
    pub email: String,
    pub links: Option<String>,
    pub notes: Option<String>,
    pub status: String, // "pending", "approved" or "rejected"
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateSubmissionData {
    pub kind: String,
    pub name: String,
    pub email: String,
    pub links: Option<String>,
    pub notes: Option<String>,
}

impl Submission {
    pub async fn create(pool: &PgPool, data: CreateSubmissionData) -> Result<Self, sqlx::Error> {
        let submission = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO submissions (kind, name, email, links, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.kind)
        .bind(data.name)
        .bind(data.email)
        .bind(data.links)
        .bind(data.notes)
        .fetch_one(pool)
        .await?;

        Ok(submission)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let submission = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM submissions WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(submission)
    }

    /// Newest first; optionally narrowed to one review status
    pub async fn list(pool: &PgPool, status: Option<&str>) -> Result<Vec<Self>, sqlx::Error> {
        let submissions = if let Some(status) = status {
            sqlx::query_as::<_, Self>(
                r#"
                SELECT * FROM submissions WHERE status = $1 ORDER BY created_at DESC
                "#,
            )
            .bind(status)
            .fetch_all(pool)
            .await?
        } else {
            sqlx::query_as::<_, Self>(
                r#"
                SELECT * FROM submissions ORDER BY created_at DESC
                "#,
            )
            .fetch_all(pool)
            .await?
        };

        Ok(submissions)
    }

    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: &str,
    ) -> Result<Self, sqlx::Error> {
        let submission = sqlx::query_as::<_, Self>(
            r#"
            UPDATE submissions SET status = $2 WHERE id = $1 RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(pool)
        .await?;

        Ok(submission)
    }
}
