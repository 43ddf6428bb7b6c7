use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::auth::require_admin;
use crate::api::middleware::session::AppState;
use crate::error::{AppError, Result};
use crate::models::artist::Artist;
use crate::models::submission::{CreateSubmissionData, Submission};
use crate::services::admission::is_valid_email;

const SUBMISSION_KINDS: [&str; 2] = ["artist", "vendor"];
const SUBMISSION_STATUSES: [&str; 3] = ["pending", "approved", "rejected"];

#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    pub kind: String,
    pub name: String,
    pub email: String,
    pub links: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListSubmissionsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubmissionStatusRequest {
    pub status: String,
}

/// Take in an artist/vendor submission for later review
async fn create_submission(
    State(state): State<AppState>,
    Json(req): Json<CreateSubmissionRequest>,
) -> Result<(StatusCode, Json<Submission>)> {
    if !SUBMISSION_KINDS.contains(&req.kind.as_str()) {
        return Err(AppError::Validation(
            "Submission kind must be artist or vendor".to_string(),
        ));
    }
    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if !is_valid_email(req.email.trim()) {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }

    let submission = Submission::create(
        &state.pool,
        CreateSubmissionData {
            kind: req.kind,
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            links: req.links,
            notes: req.notes,
        },
    )
    .await?;

    tracing::info!(
        submission_id = %submission.id,
        kind = %submission.kind,
        "Submission received"
    );

    Ok((StatusCode::CREATED, Json(submission)))
}

/// List submissions, optionally narrowed by review status (admin)
async fn list_submissions(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListSubmissionsQuery>,
) -> Result<Json<Vec<Submission>>> {
    require_admin(&session).await?;

    if let Some(status) = &params.status {
        if !SUBMISSION_STATUSES.contains(&status.as_str()) {
            return Err(AppError::Validation(format!(
                "Unknown submission status: {status}"
            )));
        }
    }

    let submissions = Submission::list(&state.pool, params.status.as_deref()).await?;

    Ok(Json(submissions))
}

/// Review a submission (admin). Approving an artist submission creates the
/// artist record so raffles can register them.
async fn update_submission_status(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSubmissionStatusRequest>,
) -> Result<Json<Submission>> {
    require_admin(&session).await?;

    if !SUBMISSION_STATUSES.contains(&req.status.as_str()) {
        return Err(AppError::Validation(format!(
            "Unknown submission status: {}",
            req.status
        )));
    }

    let submission = Submission::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

    let newly_approved = submission.status != "approved" && req.status == "approved";

    let updated = Submission::update_status(&state.pool, submission.id, &req.status).await?;

    if newly_approved && updated.kind == "artist" {
        let artist = Artist::create(&state.pool, &updated.name).await?;
        tracing::info!(
            submission_id = %updated.id,
            artist_id = %artist.id,
            "Approved artist submission, artist record created"
        );
    }

    tracing::info!(submission_id = %updated.id, status = %updated.status, "Submission reviewed");

    Ok(Json(updated))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/submissions",
            get(list_submissions).post(create_submission),
        )
        .route(
            "/api/submissions/:id/update-status",
            post(update_submission_status),
        )
}
