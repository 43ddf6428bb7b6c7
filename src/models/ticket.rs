use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub order_id: Uuid,
    pub owner_id: Uuid,
    pub raffle_id: Option<Uuid>,
    /// Set when the holder commits the ticket to an artist.
    pub artist_id: Option<Uuid>,
    /// Sequential within the raffle the ticket was minted for.
    pub ticket_number: i32,
    pub status: String, // "active" until allocated, then "used"
    pub created_at: DateTime<Utc>,
}

impl Ticket {
    /// Tickets minted for an order, in numbering order
    pub async fn list_by_order(pool: &PgPool, order_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tickets = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM tickets WHERE order_id = $1 ORDER BY ticket_number ASC
            "#,
        )
        .bind(order_id)
        .fetch_all(pool)
        .await?;

        Ok(tickets)
    }

    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tickets = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM tickets
            WHERE owner_id = $1
            ORDER BY created_at DESC, ticket_number ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(tickets)
    }

    /// All tickets committed to one artist within a raffle (the draw pool)
    pub async fn list_for_artist(
        pool: &PgPool,
        raffle_id: Uuid,
        artist_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tickets = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM tickets
            WHERE raffle_id = $1 AND artist_id = $2
            ORDER BY ticket_number ASC
            "#,
        )
        .bind(raffle_id)
        .bind(artist_id)
        .fetch_all(pool)
        .await?;

        Ok(tickets)
    }
}
