use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::auth::require_admin;
use crate::api::middleware::session::AppState;
use crate::error::{AppError, Result};
use crate::models::event::{CreateEventData, Event, UpdateEventData};

const EVENT_STATUSES: [&str; 3] = ["draft", "published", "archived"];

/// List published events
async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>> {
    let events = Event::list_published(&state.pool).await?;

    Ok(Json(events))
}

/// Get event details
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Event>> {
    let event = Event::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok(Json(event))
}

/// Create an event (admin)
async fn create_event(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateEventData>,
) -> Result<(StatusCode, Json<Event>)> {
    require_admin(&session).await?;

    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Event name is required".to_string()));
    }
    if matches!(req.attendance_limit, Some(limit) if limit < 0) {
        return Err(AppError::Validation(
            "Attendance limit cannot be negative".to_string(),
        ));
    }

    let event = Event::create(&state.pool, req).await?;

    tracing::info!(event_id = %event.id, event_name = %event.name, "Event created");

    Ok((StatusCode::CREATED, Json(event)))
}

/// Update an event (admin)
async fn update_event(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventData>,
) -> Result<Json<Event>> {
    require_admin(&session).await?;

    Event::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    if let Some(status) = &req.status {
        if !EVENT_STATUSES.contains(&status.as_str()) {
            return Err(AppError::Validation(format!(
                "Unknown event status: {status}"
            )));
        }
    }
    if matches!(req.attendance_limit, Some(limit) if limit < 0) {
        return Err(AppError::Validation(
            "Attendance limit cannot be negative".to_string(),
        ));
    }

    let event = Event::update(&state.pool, id, req).await?;

    tracing::info!(event_id = %event.id, "Event updated");

    Ok(Json(event))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/:id", get(get_event).put(update_event))
}
