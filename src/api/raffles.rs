use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::auth::{get_authenticated_user, require_admin};
use crate::api::middleware::session::AppState;
use crate::db;
use crate::error::{AppError, Result};
use crate::models::artist::Artist;
use crate::models::raffle::{Raffle, RaffleArtist, RaffleArtistEntry};
use crate::models::user::User;
use crate::services::mailer;
use crate::services::ticket_allocator;
use crate::services::winner_selector::{self, WinnerResult};

#[derive(Debug, Deserialize)]
pub struct CreateRaffleRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddArtistRequest {
    pub artist_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SubmitTicketsRequest {
    pub artist_id: Uuid,
    pub ticket_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SelectWinnerRequest {
    pub artist_id: Uuid,
    /// Required to replace an already-recorded winner.
    #[serde(default)]
    pub redraw: bool,
}

#[derive(Debug, Serialize)]
pub struct RaffleDetailResponse {
    #[serde(flatten)]
    pub raffle: Raffle,
    pub artists: Vec<RaffleArtistEntry>,
}

#[derive(Debug, Serialize)]
pub struct SubmitTicketsResponse {
    pub allocated: usize,
}

#[derive(Debug, Serialize)]
pub struct SelectWinnerResponse {
    pub winner_ticket_id: Uuid,
    pub winner_ticket_number: i32,
    /// "First L." form of the holder's name, safe for public display.
    pub display_name: Option<String>,
    pub redrawn: bool,
}

/// List raffles, newest first
async fn list_raffles(State(state): State<AppState>) -> Result<Json<Vec<Raffle>>> {
    let raffles = Raffle::list(&state.pool).await?;

    Ok(Json(raffles))
}

/// The artist lineup, alphabetical
async fn list_artists(State(state): State<AppState>) -> Result<Json<Vec<Artist>>> {
    let artists = Artist::list(&state.pool).await?;

    Ok(Json(artists))
}

/// Raffle with its artists and any recorded winners
async fn get_raffle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RaffleDetailResponse>> {
    let raffle = Raffle::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Raffle not found".to_string()))?;

    let artists = RaffleArtist::list_entries(&state.pool, raffle.id).await?;

    Ok(Json(RaffleDetailResponse { raffle, artists }))
}

/// Create a draft raffle (admin)
async fn create_raffle(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateRaffleRequest>,
) -> Result<(StatusCode, Json<Raffle>)> {
    require_admin(&session).await?;

    if req.name.trim().is_empty() {
        return Err(AppError::Validation("Raffle name is required".to_string()));
    }

    let raffle = Raffle::create(&state.pool, req.name.trim()).await?;

    tracing::info!(raffle_id = %raffle.id, raffle_name = %raffle.name, "Raffle created");

    Ok((StatusCode::CREATED, Json(raffle)))
}

/// Open a draft raffle for ticket allocation (admin)
async fn activate_raffle(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<Raffle>> {
    require_admin(&session).await?;

    let raffle = Raffle::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Raffle not found".to_string()))?;
    if raffle.status != "draft" {
        return Err(AppError::Conflict(format!(
            "Raffle cannot be activated from status {}",
            raffle.status
        )));
    }

    let raffle = Raffle::set_status(&state.pool, raffle.id, "active").await?;

    tracing::info!(raffle_id = %raffle.id, "Raffle activated");

    Ok(Json(raffle))
}

/// Close an active raffle (admin)
async fn end_raffle(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<Raffle>> {
    require_admin(&session).await?;

    let raffle = Raffle::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Raffle not found".to_string()))?;
    if raffle.status != "active" {
        return Err(AppError::Conflict(format!(
            "Raffle cannot be ended from status {}",
            raffle.status
        )));
    }

    let raffle = Raffle::set_status(&state.pool, raffle.id, "ended").await?;

    tracing::info!(raffle_id = %raffle.id, "Raffle ended");

    Ok(Json(raffle))
}

/// Register an artist into a raffle (admin)
async fn add_artist(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(req): Json<AddArtistRequest>,
) -> Result<(StatusCode, Json<RaffleArtist>)> {
    require_admin(&session).await?;

    let raffle = Raffle::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Raffle not found".to_string()))?;
    if raffle.status == "ended" {
        return Err(AppError::Conflict(
            "Artists cannot be added to an ended raffle".to_string(),
        ));
    }

    Artist::find_by_id(&state.pool, req.artist_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))?;

    let entry = RaffleArtist::create(&state.pool, raffle.id, req.artist_id)
        .await
        .map_err(|e| {
            if db::is_unique_violation(&e) {
                AppError::Conflict("Artist is already registered in this raffle".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

    tracing::info!(raffle_id = %raffle.id, artist_id = %req.artist_id, "Artist registered in raffle");

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Commit the caller's tickets to an artist ("voting")
async fn submit_tickets(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitTicketsRequest>,
) -> Result<Json<SubmitTicketsResponse>> {
    let user = get_authenticated_user(&session).await?;

    let allocated = ticket_allocator::allocate_tickets(
        &state.pool,
        id,
        req.artist_id,
        &req.ticket_ids,
        user.user_id,
    )
    .await?;

    Ok(Json(SubmitTicketsResponse { allocated }))
}

/// Draw the winning ticket for an artist (admin)
async fn select_winner(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectWinnerRequest>,
) -> Result<Json<SelectWinnerResponse>> {
    require_admin(&session).await?;

    let WinnerResult {
        ticket,
        display_name,
        redrawn,
    } = winner_selector::select_winner(&state.pool, id, req.artist_id, req.redraw).await?;

    notify_winner(&state, id, req.artist_id, &ticket).await?;

    Ok(Json(SelectWinnerResponse {
        winner_ticket_id: ticket.id,
        winner_ticket_number: ticket.ticket_number,
        display_name,
        redrawn,
    }))
}

/// Announce the win to the ticket holder; delivery is fire-and-forget
async fn notify_winner(
    state: &AppState,
    raffle_id: Uuid,
    artist_id: Uuid,
    ticket: &crate::models::ticket::Ticket,
) -> Result<()> {
    let raffle = Raffle::find_by_id(&state.pool, raffle_id).await?;
    let artist = Artist::find_by_id(&state.pool, artist_id).await?;
    let owner = User::find_by_id(&state.pool, ticket.owner_id).await?;

    if let (Some(raffle), Some(artist), Some(owner)) = (raffle, artist, owner) {
        let body =
            mailer::winner_notification_body(&raffle.name, &artist.name, ticket.ticket_number);
        mailer::send_in_background(
            state.mailer.clone(),
            vec![owner.email],
            format!("You won the {} raffle!", raffle.name),
            body,
        );
    }

    Ok(())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/artists", get(list_artists))
        .route("/api/raffles", get(list_raffles).post(create_raffle))
        .route("/api/raffles/:id", get(get_raffle))
        .route("/api/raffles/:id/activate", post(activate_raffle))
        .route("/api/raffles/:id/end", post(end_raffle))
        .route("/api/raffles/:id/artists", post(add_artist))
        .route("/api/raffles/:id/submit-tickets", post(submit_tickets))
        .route("/api/raffles/:id/select-winner", post(select_winner))
}
