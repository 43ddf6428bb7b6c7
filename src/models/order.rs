use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub raffle_id: Option<Uuid>,
    pub artist_id: Option<Uuid>,
    pub quantity: i32,
    /// Checkout session id at the payment processor, set once checkout opens.
    pub checkout_session_id: Option<String>,
    pub status: String, // "pending" or "completed"
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CreateOrderData {
    pub user_id: Uuid,
    pub raffle_id: Option<Uuid>,
    pub artist_id: Option<Uuid>,
    pub quantity: i32,
}

impl Order {
    /// Create a pending order at checkout time
    pub async fn create(pool: &PgPool, data: CreateOrderData) -> Result<Self, sqlx::Error> {
        let order = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO orders (user_id, raffle_id, artist_id, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(data.user_id)
        .bind(data.raffle_id)
        .bind(data.artist_id)
        .bind(data.quantity)
        .fetch_one(pool)
        .await?;

        Ok(order)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let order = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM orders WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(order)
    }

    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let orders = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(orders)
    }

    /// Attach the processor's checkout session id to a freshly created order
    pub async fn set_checkout_session(
        pool: &PgPool,
        id: Uuid,
        checkout_session_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE orders SET checkout_session_id = $2 WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(checkout_session_id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
