use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rsvp {
    pub id: Uuid,
    pub event_id: Uuid,
    pub handle: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub status: String, // "confirmed", "waitlisted", "rejected" or "canceled"
    pub attended_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Rsvp {
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let rsvp = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM rsvps WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(rsvp)
    }

    pub async fn list_by_event(pool: &PgPool, event_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let rsvps = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM rsvps WHERE event_id = $1 ORDER BY created_at ASC
            "#,
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;

        Ok(rsvps)
    }

    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: &str,
    ) -> Result<Self, sqlx::Error> {
        let rsvp = sqlx::query_as::<_, Self>(
            r#"
            UPDATE rsvps SET status = $2 WHERE id = $1 RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(pool)
        .await?;

        Ok(rsvp)
    }

    /// Set or clear the check-in timestamp
    pub async fn set_attendance(
        pool: &PgPool,
        id: Uuid,
        attended: bool,
    ) -> Result<Self, sqlx::Error> {
        let rsvp = sqlx::query_as::<_, Self>(
            r#"
            UPDATE rsvps
            SET attended_at = CASE WHEN $2 THEN NOW() ELSE NULL END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(attended)
        .fetch_one(pool)
        .await?;

        Ok(rsvp)
    }
}
