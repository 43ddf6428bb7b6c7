use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    /// Confirmed-RSVP cap; NULL means unlimited.
    pub attendance_limit: Option<i32>,
    pub status: String, // "draft", "published" or "archived"
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventData {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub attendance_limit: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEventData {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub attendance_limit: Option<i32>,
    pub status: Option<String>,
}

impl Event {
    /// Create a new event (admin action); events start out as drafts
    pub async fn create(pool: &PgPool, data: CreateEventData) -> Result<Self, sqlx::Error> {
        let event = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO events (name, description, location, starts_at, attendance_limit)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.location)
        .bind(data.starts_at)
        .bind(data.attendance_limit)
        .fetch_one(pool)
        .await?;

        Ok(event)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let event = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM events WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(event)
    }

    /// List published events, soonest first; undated events sort last
    pub async fn list_published(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let events = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM events
            WHERE status = 'published'
            ORDER BY starts_at ASC NULLS LAST, created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    /// Update an event; absent fields keep their current value
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateEventData,
    ) -> Result<Self, sqlx::Error> {
        let event = sqlx::query_as::<_, Self>(
            r#"
            UPDATE events
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                starts_at = COALESCE($5, starts_at),
                attendance_limit = COALESCE($6, attendance_limit),
                status = COALESCE($7, status)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.location)
        .bind(data.starts_at)
        .bind(data.attendance_limit)
        .bind(data.status)
        .fetch_one(pool)
        .await?;

        Ok(event)
    }
}
