use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::admission::AdmissionError;
use crate::services::payments::PaymentError;
use crate::services::ticket_allocator::AllocationError;
use crate::services::ticket_issuer::TicketIssueError;
use crate::services::winner_selector::SelectionError;

/// Application-wide error taxonomy. Every handler error maps to one bucket;
/// clients see a JSON body with a single human-readable `error` string.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Payment has not been completed")]
    PaymentIncomplete,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::PaymentIncomplete => StatusCode::PAYMENT_REQUIRED,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };

        // Collaborator failures keep their detail in the logs, not the body.
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "Database error".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "Internal server error");
                "Internal server error".to_string()
            }
            AppError::Upstream(e) => {
                tracing::error!(error = %e, "Upstream service error");
                "Upstream service error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<TicketIssueError> for AppError {
    fn from(err: TicketIssueError) -> Self {
        match err {
            TicketIssueError::OrderNotFound => AppError::NotFound("Order not found".to_string()),
            TicketIssueError::NotOrderOwner => {
                AppError::Forbidden("Order belongs to another user".to_string())
            }
            TicketIssueError::MissingCheckoutSession | TicketIssueError::PaymentIncomplete => {
                AppError::PaymentIncomplete
            }
            TicketIssueError::NumberingContention(_) => AppError::Conflict(
                "Could not assign ticket numbers, please try again".to_string(),
            ),
            TicketIssueError::Payment(e) => AppError::Upstream(e.to_string()),
            TicketIssueError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::RaffleNotFound => AppError::NotFound("Raffle not found".to_string()),
            AllocationError::RaffleNotActive => {
                AppError::Conflict("Raffle is not accepting tickets".to_string())
            }
            AllocationError::ArtistNotInRaffle => {
                AppError::NotFound("Artist is not part of this raffle".to_string())
            }
            AllocationError::InvalidTicketSet => AppError::Validation(
                "Ticket selection does not match your available tickets".to_string(),
            ),
            AllocationError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<SelectionError> for AppError {
    fn from(err: SelectionError) -> Self {
        match err {
            SelectionError::RaffleNotFound => AppError::NotFound("Raffle not found".to_string()),
            SelectionError::ArtistNotInRaffle => {
                AppError::NotFound("Artist is not part of this raffle".to_string())
            }
            SelectionError::NoTickets => AppError::Validation(
                "No tickets have been submitted for this artist".to_string(),
            ),
            SelectionError::WinnerAlreadySelected => AppError::Conflict(
                "A winner has already been selected for this artist".to_string(),
            ),
            SelectionError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<AdmissionError> for AppError {
    fn from(err: AdmissionError) -> Self {
        match err {
            AdmissionError::Validation(msg) => AppError::Validation(msg),
            AdmissionError::EventNotFound => AppError::NotFound("Event not found".to_string()),
            AdmissionError::RsvpNotFound => AppError::NotFound("RSVP not found".to_string()),
            AdmissionError::DuplicateRsvp => {
                AppError::Conflict("An RSVP already exists for this email".to_string())
            }
            AdmissionError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::SessionNotFound => {
                AppError::NotFound("Checkout session not found".to_string())
            }
            other => AppError::Upstream(other.to_string()),
        }
    }
}
