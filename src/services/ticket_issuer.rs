use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::{order::Order, ticket::Ticket};
use crate::services::payments::{self, PaymentError};

// Concurrent issuance for the same raffle can collide on ticket numbers; the
// unique index rejects the batch and we renumber from a fresh max.
const MAX_NUMBERING_ATTEMPTS: u32 = 3;

#[derive(thiserror::Error, Debug)]
pub enum TicketIssueError {
    #[error("Order not found")]
    OrderNotFound,

    #[error("Order belongs to another user")]
    NotOrderOwner,

    #[error("Order has no checkout session")]
    MissingCheckoutSession,

    #[error("Payment has not been completed")]
    PaymentIncomplete,

    #[error("Could not assign ticket numbers after {0} attempts")]
    NumberingContention(u32),

    #[error("Payment processor error: {0}")]
    Payment(#[from] PaymentError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct IssueResult {
    pub order: Order,
    pub tickets: Vec<Ticket>,
    /// True when the order had already been issued and the existing tickets
    /// were returned without any writes.
    pub replayed: bool,
}

/// Converts a paid order into a batch of sequentially numbered tickets.
///
/// Re-invoking on an already-issued order returns the existing tickets
/// unchanged; nothing is minted twice.
#[tracing::instrument(skip(pool, payments_api_url, payments_secret_key))]
pub async fn issue_tickets(
    pool: &PgPool,
    payments_api_url: &str,
    payments_secret_key: &str,
    order_id: Uuid,
    caller_id: Uuid,
) -> Result<IssueResult, TicketIssueError> {
    let order = Order::find_by_id(pool, order_id)
        .await?
        .ok_or(TicketIssueError::OrderNotFound)?;

    if order.user_id != caller_id {
        return Err(TicketIssueError::NotOrderOwner);
    }

    let existing = Ticket::list_by_order(pool, order.id).await?;
    if !existing.is_empty() {
        tracing::info!(
            order_id = %order.id,
            ticket_count = existing.len(),
            "Order already issued, replaying existing tickets"
        );
        return Ok(IssueResult {
            order,
            tickets: existing,
            replayed: true,
        });
    }

    let session_id = order
        .checkout_session_id
        .as_deref()
        .ok_or(TicketIssueError::MissingCheckoutSession)?;

    let session =
        payments::retrieve_checkout_session(payments_api_url, payments_secret_key, session_id)
            .await?;
    if !session.is_paid() {
        return Err(TicketIssueError::PaymentIncomplete);
    }

    for attempt in 1..=MAX_NUMBERING_ATTEMPTS {
        match mint_batch(pool, &order).await {
            Ok(mut tickets) => {
                tickets.sort_by_key(|t| t.ticket_number);
                tracing::info!(
                    order_id = %order.id,
                    ticket_count = tickets.len(),
                    first_number = tickets.first().map(|t| t.ticket_number),
                    "Tickets issued"
                );
                let order = Order::find_by_id(pool, order.id)
                    .await?
                    .ok_or(TicketIssueError::OrderNotFound)?;
                return Ok(IssueResult {
                    order,
                    tickets,
                    replayed: false,
                });
            }
            Err(e) if db::is_unique_violation(&e) => {
                tracing::warn!(
                    order_id = %order.id,
                    attempt,
                    "Ticket number collision, renumbering"
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(TicketIssueError::NumberingContention(MAX_NUMBERING_ATTEMPTS))
}

/// One transaction: read the raffle's current max number, insert the batch,
/// mark the order completed. A unique violation aborts the whole batch.
async fn mint_batch(pool: &PgPool, order: &Order) -> Result<Vec<Ticket>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let next: i32 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(MAX(ticket_number), 0) + 1
        FROM tickets
        WHERE raffle_id IS NOT DISTINCT FROM $1
        "#,
    )
    .bind(order.raffle_id)
    .fetch_one(&mut *tx)
    .await?;

    let numbers = ticket_numbers(next, order.quantity);

    let tickets = sqlx::query_as::<_, Ticket>(
        r#"
        INSERT INTO tickets (order_id, owner_id, raffle_id, ticket_number)
        SELECT $1, $2, $3, n.num
        FROM UNNEST($4::int4[]) AS n(num)
        RETURNING *
        "#,
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(order.raffle_id)
    .bind(&numbers)
    .fetch_all(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        UPDATE orders SET status = 'completed' WHERE id = $1
        "#,
    )
    .bind(order.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(tickets)
}

/// The contiguous run of numbers for a batch starting at `next`.
fn ticket_numbers(next: i32, quantity: i32) -> Vec<i32> {
    (next..next + quantity).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_form_contiguous_run_from_floor() {
        assert_eq!(ticket_numbers(1, 3), vec![1, 2, 3]);
        assert_eq!(ticket_numbers(7, 1), vec![7]);
        assert_eq!(ticket_numbers(42, 4), vec![42, 43, 44, 45]);
    }

    #[test]
    fn zero_quantity_yields_no_numbers() {
        // The orders table rejects quantity 0, but the helper stays total.
        assert!(ticket_numbers(5, 0).is_empty());
    }
}
