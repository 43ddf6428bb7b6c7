use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Raffle {
    pub id: Uuid,
    pub name: String,
    pub status: String, // "draft", "active" or "ended"
    pub created_at: DateTime<Utc>,
}

/// Join row tying an artist into a raffle; carries the winner once drawn.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RaffleArtist {
    pub id: Uuid,
    pub raffle_id: Uuid,
    pub artist_id: Uuid,
    pub winner_ticket_id: Option<Uuid>,
    pub winner_selected_at: Option<DateTime<Utc>>,
}

/// Artist entry enriched with its name and winner ticket number for display.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RaffleArtistEntry {
    pub artist_id: Uuid,
    pub artist_name: String,
    pub winner_ticket_id: Option<Uuid>,
    pub winner_ticket_number: Option<i32>,
    pub winner_selected_at: Option<DateTime<Utc>>,
}

impl Raffle {
    /// Create a raffle in draft; it accepts tickets only once activated
    pub async fn create(pool: &PgPool, name: &str) -> Result<Self, sqlx::Error> {
        let raffle = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO raffles (name) VALUES ($1) RETURNING *
            "#,
        )
        .bind(name)
        .fetch_one(pool)
        .await?;

        Ok(raffle)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let raffle = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM raffles WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(raffle)
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let raffles = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM raffles ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(raffles)
    }

    pub async fn set_status(pool: &PgPool, id: Uuid, status: &str) -> Result<Self, sqlx::Error> {
        let raffle = sqlx::query_as::<_, Self>(
            r#"
            UPDATE raffles SET status = $2 WHERE id = $1 RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(pool)
        .await?;

        Ok(raffle)
    }
}

impl RaffleArtist {
    /// Register an artist into a raffle
    pub async fn create(
        pool: &PgPool,
        raffle_id: Uuid,
        artist_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let entry = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO raffle_artists (raffle_id, artist_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(raffle_id)
        .bind(artist_id)
        .fetch_one(pool)
        .await?;

        Ok(entry)
    }

    pub async fn find_entry(
        pool: &PgPool,
        raffle_id: Uuid,
        artist_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let entry = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM raffle_artists WHERE raffle_id = $1 AND artist_id = $2
            "#,
        )
        .bind(raffle_id)
        .bind(artist_id)
        .fetch_optional(pool)
        .await?;

        Ok(entry)
    }

    /// Artists registered in a raffle with any recorded winners, for display
    pub async fn list_entries(
        pool: &PgPool,
        raffle_id: Uuid,
    ) -> Result<Vec<RaffleArtistEntry>, sqlx::Error> {
        let entries = sqlx::query_as::<_, RaffleArtistEntry>(
            r#"
            SELECT
                ra.artist_id,
                a.name AS artist_name,
                ra.winner_ticket_id,
                t.ticket_number AS winner_ticket_number,
                ra.winner_selected_at
            FROM raffle_artists ra
            JOIN artists a ON a.id = ra.artist_id
            LEFT JOIN tickets t ON t.id = ra.winner_ticket_id
            WHERE ra.raffle_id = $1
            ORDER BY a.name ASC
            "#,
        )
        .bind(raffle_id)
        .fetch_all(pool)
        .await?;

        Ok(entries)
    }

    /// Record (or on redraw, replace) the winning ticket for an artist entry
    pub async fn record_winner(
        pool: &PgPool,
        entry_id: Uuid,
        winner_ticket_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE raffle_artists
            SET winner_ticket_id = $2, winner_selected_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(entry_id)
        .bind(winner_ticket_id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
