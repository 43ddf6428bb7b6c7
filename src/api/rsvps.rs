use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::auth::require_admin;
use crate::api::middleware::session::AppState;
use crate::error::{AppError, Result};
use crate::models::event::Event;
use crate::models::rsvp::Rsvp;
use crate::services::admission::{self, SubmitRsvpData};
use crate::services::mailer;

#[derive(Debug, Deserialize)]
pub struct SubmitRsvpRequest {
    pub event_id: Uuid,
    pub handle: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitRsvpResponse {
    pub rsvp: Rsvp,
    /// "confirmed" or "waitlisted", decided at admission time.
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub rsvp_id: Uuid,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub rsvp_id: Uuid,
    pub attended: bool,
}

/// Submit an RSVP; capacity decides confirmed vs waitlisted
async fn submit_rsvp(
    State(state): State<AppState>,
    Json(req): Json<SubmitRsvpRequest>,
) -> Result<(StatusCode, Json<SubmitRsvpResponse>)> {
    let rsvp = admission::submit_rsvp(
        &state.pool,
        SubmitRsvpData {
            event_id: req.event_id,
            handle: req.handle,
            name: req.name,
            email: req.email,
            phone: req.phone,
        },
    )
    .await?;

    if let Some(event) = Event::find_by_id(&state.pool, rsvp.event_id).await? {
        let subject = if rsvp.status == "confirmed" {
            format!("You're confirmed for {}", event.name)
        } else {
            format!("You're on the waitlist for {}", event.name)
        };
        let body = mailer::rsvp_notification_body(&event.name, &rsvp.name, &rsvp.status);
        mailer::send_in_background(state.mailer.clone(), vec![rsvp.email.clone()], subject, body);
    }

    Ok((
        StatusCode::CREATED,
        Json(SubmitRsvpResponse {
            status: rsvp.status.clone(),
            rsvp,
        }),
    ))
}

/// List an event's RSVPs in submission order (admin)
async fn list_rsvps(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<Uuid>,
) -> Result<Json<Vec<Rsvp>>> {
    require_admin(&session).await?;

    Event::find_by_id(&state.pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    let rsvps = Rsvp::list_by_event(&state.pool, event_id).await?;

    Ok(Json(rsvps))
}

/// Change an RSVP's status (admin). Canceling never auto-promotes the
/// waitlist; promotion stays a manual decision.
async fn update_rsvp_status(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Rsvp>> {
    require_admin(&session).await?;

    ensure_rsvp_in_event(&state, event_id, req.rsvp_id).await?;

    let rsvp = admission::update_status(&state.pool, req.rsvp_id, &req.status).await?;

    Ok(Json(rsvp))
}

/// Toggle the check-in timestamp on an RSVP (admin)
async fn mark_rsvp_attendance(
    State(state): State<AppState>,
    session: Session,
    Path(event_id): Path<Uuid>,
    Json(req): Json<MarkAttendanceRequest>,
) -> Result<Json<Rsvp>> {
    require_admin(&session).await?;

    ensure_rsvp_in_event(&state, event_id, req.rsvp_id).await?;

    let rsvp = admission::mark_attendance(&state.pool, req.rsvp_id, req.attended).await?;

    Ok(Json(rsvp))
}

async fn ensure_rsvp_in_event(state: &AppState, event_id: Uuid, rsvp_id: Uuid) -> Result<()> {
    let rsvp = Rsvp::find_by_id(&state.pool, rsvp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("RSVP not found".to_string()))?;

    if rsvp.event_id != event_id {
        return Err(AppError::NotFound("RSVP not found".to_string()));
    }

    Ok(())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/rsvp", post(submit_rsvp))
        .route("/api/rsvps/:event_id", get(list_rsvps))
        .route("/api/rsvps/:event_id/update-status", post(update_rsvp_status))
        .route(
            "/api/rsvps/:event_id/mark-attendance",
            post(mark_rsvp_attendance),
        )
}
