use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::models::event::Event;
use crate::models::rsvp::Rsvp;

const RSVP_STATUSES: [&str; 4] = ["confirmed", "waitlisted", "rejected", "canceled"];

#[derive(thiserror::Error, Debug)]
pub enum AdmissionError {
    #[error("{0}")]
    Validation(String),

    #[error("Event not found")]
    EventNotFound,

    #[error("RSVP not found")]
    RsvpNotFound,

    #[error("An RSVP already exists for this email")]
    DuplicateRsvp,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct SubmitRsvpData {
    pub event_id: Uuid,
    pub handle: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// Admits or waitlists an RSVP against the event's capacity limit.
///
/// The capacity check runs inside a transaction holding a row lock on the
/// event, so two simultaneous submissions for the same event serialize
/// rather than both slipping past the limit.
#[tracing::instrument(skip(pool, data), fields(event_id = %data.event_id))]
pub async fn submit_rsvp(pool: &PgPool, data: SubmitRsvpData) -> Result<Rsvp, AdmissionError> {
    validate(&data)?;

    let email = data.email.trim().to_string();

    let mut tx = pool.begin().await?;

    let event = sqlx::query_as::<_, Event>(
        r#"
        SELECT * FROM events WHERE id = $1 FOR UPDATE
        "#,
    )
    .bind(data.event_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(AdmissionError::EventNotFound)?;

    if event.status == "archived" {
        return Err(AdmissionError::Validation(
            "Event is no longer accepting RSVPs".to_string(),
        ));
    }

    let existing: Option<(Uuid,)> = sqlx::query_as(
        r#"
        SELECT id FROM rsvps WHERE event_id = $1 AND LOWER(email) = LOWER($2)
        "#,
    )
    .bind(event.id)
    .bind(&email)
    .fetch_optional(&mut *tx)
    .await?;
    if existing.is_some() {
        return Err(AdmissionError::DuplicateRsvp);
    }

    let confirmed: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM rsvps WHERE event_id = $1 AND status = 'confirmed'
        "#,
    )
    .bind(event.id)
    .fetch_one(&mut *tx)
    .await?;

    let status = admission_status(event.attendance_limit, confirmed);

    let rsvp = sqlx::query_as::<_, Rsvp>(
        r#"
        INSERT INTO rsvps (event_id, handle, name, email, phone, status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(event.id)
    .bind(data.handle.trim())
    .bind(data.name.trim())
    .bind(&email)
    .bind(data.phone.as_deref().map(str::trim))
    .bind(status)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        if db::is_unique_violation(&e) {
            AdmissionError::DuplicateRsvp
        } else {
            AdmissionError::Database(e)
        }
    })?;

    tx.commit().await?;

    tracing::info!(
        rsvp_id = %rsvp.id,
        event_id = %event.id,
        status = %rsvp.status,
        confirmed_before = confirmed,
        limit = ?event.attendance_limit,
        "RSVP recorded"
    );

    Ok(rsvp)
}

/// Admin status change; transitions are unrestricted, and canceling a
/// confirmed RSVP never promotes the waitlist automatically.
pub async fn update_status(
    pool: &PgPool,
    rsvp_id: Uuid,
    status: &str,
) -> Result<Rsvp, AdmissionError> {
    if !RSVP_STATUSES.contains(&status) {
        return Err(AdmissionError::Validation(format!(
            "Unknown RSVP status: {status}"
        )));
    }

    let rsvp = Rsvp::find_by_id(pool, rsvp_id)
        .await?
        .ok_or(AdmissionError::RsvpNotFound)?;

    let updated = Rsvp::update_status(pool, rsvp.id, status).await?;

    tracing::info!(rsvp_id = %updated.id, status = %updated.status, "RSVP status updated");

    Ok(updated)
}

/// Check-in toggle, independent of admission status
pub async fn mark_attendance(
    pool: &PgPool,
    rsvp_id: Uuid,
    attended: bool,
) -> Result<Rsvp, AdmissionError> {
    let rsvp = Rsvp::find_by_id(pool, rsvp_id)
        .await?
        .ok_or(AdmissionError::RsvpNotFound)?;

    let updated = Rsvp::set_attendance(pool, rsvp.id, attended).await?;

    tracing::info!(rsvp_id = %updated.id, attended, "RSVP attendance updated");

    Ok(updated)
}

/// Pure admission decision: at or past the limit waitlists, otherwise (or
/// with no limit at all) the RSVP is confirmed.
pub fn admission_status(attendance_limit: Option<i32>, confirmed_count: i64) -> &'static str {
    match attendance_limit {
        Some(limit) if confirmed_count >= i64::from(limit) => "waitlisted",
        _ => "confirmed",
    }
}

fn validate(data: &SubmitRsvpData) -> Result<(), AdmissionError> {
    if data.handle.trim().is_empty() {
        return Err(AdmissionError::Validation("Handle is required".to_string()));
    }
    if data.name.trim().is_empty() {
        return Err(AdmissionError::Validation("Name is required".to_string()));
    }
    if !is_valid_email(data.email.trim()) {
        return Err(AdmissionError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    Ok(())
}

/// Basic shape check only: local@domain with a dot inside the domain.
/// Deliverability is the email provider's problem.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admission_confirms_under_limit() {
        assert_eq!(admission_status(Some(2), 0), "confirmed");
        assert_eq!(admission_status(Some(2), 1), "confirmed");
    }

    #[test]
    fn admission_waitlists_at_limit() {
        assert_eq!(admission_status(Some(2), 2), "waitlisted");
        assert_eq!(admission_status(Some(2), 5), "waitlisted");
        assert_eq!(admission_status(Some(0), 0), "waitlisted");
    }

    #[test]
    fn no_limit_always_confirms() {
        assert_eq!(admission_status(None, 0), "confirmed");
        assert_eq!(admission_status(None, 10_000), "confirmed");
    }

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a.b.co"));
        assert!(!is_valid_email("a@.co"));
        assert!(!is_valid_email("a@co."));
        assert!(!is_valid_email(""));
    }
}
