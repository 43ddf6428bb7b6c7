use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::api::middleware::auth::get_authenticated_user;
use crate::api::middleware::session::AppState;
use crate::error::{AppError, Result};
use crate::models::order::{CreateOrderData, Order};
use crate::models::raffle::{Raffle, RaffleArtist};
use crate::models::ticket::Ticket;
use crate::services::payments::{self, CreateCheckoutParams};
use crate::services::ticket_issuer;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub raffle_id: Option<Uuid>,
    pub artist_id: Option<Uuid>,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    pub order: Order,
    /// Processor-hosted payment page the client redirects to.
    pub checkout_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IssueTicketsResponse {
    pub order: Order,
    pub tickets: Vec<Ticket>,
    pub replayed: bool,
}

#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    pub order: Order,
    pub tickets: Vec<Ticket>,
}

/// Open a checkout session and record the pending order
async fn create_order(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<CreateOrderResponse>)> {
    let user = get_authenticated_user(&session).await?;

    if req.quantity < 1 {
        return Err(AppError::Validation(
            "Quantity must be at least 1".to_string(),
        ));
    }
    if req.artist_id.is_some() && req.raffle_id.is_none() {
        return Err(AppError::Validation(
            "An artist can only be chosen together with a raffle".to_string(),
        ));
    }

    let product_name = if let Some(raffle_id) = req.raffle_id {
        let raffle = Raffle::find_by_id(&state.pool, raffle_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Raffle not found".to_string()))?;
        if raffle.status != "active" {
            return Err(AppError::Conflict(
                "Raffle is not accepting ticket orders".to_string(),
            ));
        }
        if let Some(artist_id) = req.artist_id {
            RaffleArtist::find_entry(&state.pool, raffle_id, artist_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound("Artist is not part of this raffle".to_string())
                })?;
        }
        format!("{} ticket", raffle.name)
    } else {
        "Event ticket".to_string()
    };

    let order = Order::create(
        &state.pool,
        CreateOrderData {
            user_id: user.user_id,
            raffle_id: req.raffle_id,
            artist_id: req.artist_id,
            quantity: req.quantity,
        },
    )
    .await?;

    let mut metadata: Vec<(&str, String)> = vec![
        ("quantity", req.quantity.to_string()),
        ("userId", user.user_id.to_string()),
        ("orderId", order.id.to_string()),
    ];
    if let Some(raffle_id) = req.raffle_id {
        metadata.push(("raffleId", raffle_id.to_string()));
    }
    if let Some(artist_id) = req.artist_id {
        metadata.push(("artistId", artist_id.to_string()));
    }

    let success_url = format!("{}/orders/success", state.config.base_url);
    let cancel_url = format!("{}/orders/canceled", state.config.base_url);

    let checkout = payments::create_checkout_session(
        &state.config.payments_api_url,
        state.config.payments_secret_key.expose_secret(),
        CreateCheckoutParams {
            product_name: &product_name,
            quantity: req.quantity,
            unit_amount_cents: state.config.ticket_price_cents,
            success_url: &success_url,
            cancel_url: &cancel_url,
            metadata,
        },
    )
    .await?;

    Order::set_checkout_session(&state.pool, order.id, &checkout.id).await?;

    tracing::info!(
        order_id = %order.id,
        checkout_session = %checkout.id,
        quantity = req.quantity,
        "Order created, awaiting payment"
    );

    let order = Order::find_by_id(&state.pool, order.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order,
            checkout_url: checkout.url,
        }),
    ))
}

/// Mint the tickets for a paid order (idempotent)
async fn issue_tickets(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<IssueTicketsResponse>> {
    let user = get_authenticated_user(&session).await?;

    let result = ticket_issuer::issue_tickets(
        &state.pool,
        &state.config.payments_api_url,
        state.config.payments_secret_key.expose_secret(),
        id,
        user.user_id,
    )
    .await?;

    Ok(Json(IssueTicketsResponse {
        order: result.order,
        tickets: result.tickets,
        replayed: result.replayed,
    }))
}

/// Get one of the caller's orders with its tickets
async fn get_order(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetailResponse>> {
    let user = get_authenticated_user(&session).await?;

    let order = Order::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    if order.user_id != user.user_id {
        return Err(AppError::Forbidden(
            "Order belongs to another user".to_string(),
        ));
    }

    let tickets = Ticket::list_by_order(&state.pool, order.id).await?;

    Ok(Json(OrderDetailResponse { order, tickets }))
}

/// The caller's orders, newest first
async fn my_orders(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Order>>> {
    let user = get_authenticated_user(&session).await?;

    let orders = Order::list_by_user(&state.pool, user.user_id).await?;

    Ok(Json(orders))
}

/// All tickets the caller holds, newest first
async fn my_tickets(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Ticket>>> {
    let user = get_authenticated_user(&session).await?;

    let tickets = Ticket::list_by_owner(&state.pool, user.user_id).await?;

    Ok(Json(tickets))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", get(my_orders).post(create_order))
        .route("/api/orders/:id", get(get_order))
        .route("/api/orders/:id/issue-tickets", post(issue_tickets))
        .route("/api/tickets", get(my_tickets))
}
