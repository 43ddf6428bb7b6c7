use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::raffle::{Raffle, RaffleArtist};

#[derive(thiserror::Error, Debug)]
pub enum AllocationError {
    #[error("Raffle not found")]
    RaffleNotFound,

    #[error("Raffle is not accepting tickets")]
    RaffleNotActive,

    #[error("Artist is not part of this raffle")]
    ArtistNotInRaffle,

    #[error("Ticket selection does not match your available tickets")]
    InvalidTicketSet,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Commits a holder's tickets to an artist within an active raffle.
///
/// All-or-nothing: every supplied ticket must be owned by the caller, still
/// active, and mintable into this raffle, or nothing is written. Allocation
/// is one-way; a used ticket never becomes active again.
#[tracing::instrument(skip(pool, ticket_ids), fields(ticket_count = ticket_ids.len()))]
pub async fn allocate_tickets(
    pool: &PgPool,
    raffle_id: Uuid,
    artist_id: Uuid,
    ticket_ids: &[Uuid],
    caller_id: Uuid,
) -> Result<usize, AllocationError> {
    let raffle = Raffle::find_by_id(pool, raffle_id)
        .await?
        .ok_or(AllocationError::RaffleNotFound)?;
    if raffle.status != "active" {
        return Err(AllocationError::RaffleNotActive);
    }

    RaffleArtist::find_entry(pool, raffle_id, artist_id)
        .await?
        .ok_or(AllocationError::ArtistNotInRaffle)?;

    if ticket_ids.is_empty() || has_duplicates(ticket_ids) {
        return Err(AllocationError::InvalidTicketSet);
    }

    let mut tx = pool.begin().await?;

    let updated = sqlx::query(
        r#"
        UPDATE tickets
        SET raffle_id = $1, artist_id = $2, status = 'used'
        WHERE id = ANY($3)
          AND owner_id = $4
          AND status = 'active'
          AND (raffle_id IS NULL OR raffle_id = $1)
        "#,
    )
    .bind(raffle_id)
    .bind(artist_id)
    .bind(ticket_ids)
    .bind(caller_id)
    .execute(&mut *tx)
    .await?
    .rows_affected() as usize;

    if updated != ticket_ids.len() {
        tx.rollback().await?;
        tracing::warn!(
            %raffle_id,
            %artist_id,
            requested = ticket_ids.len(),
            matched = updated,
            "Rejecting partial ticket allocation"
        );
        return Err(AllocationError::InvalidTicketSet);
    }

    tx.commit().await?;

    tracing::info!(%raffle_id, %artist_id, tickets = updated, "Tickets allocated");

    Ok(updated)
}

fn has_duplicates(ids: &[Uuid]) -> bool {
    let mut seen = HashSet::new();
    ids.iter().any(|id| !seen.insert(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_duplicate_ticket_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert!(has_duplicates(&[a, b, a]));
        assert!(!has_duplicates(&[a, b]));
        assert!(!has_duplicates(&[]));
    }
}
