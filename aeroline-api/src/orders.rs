use aeroline_core::models::{NewTicket, Order, Ticket};
use aeroline_core::repository::OrderRepository;
use aeroline_core::services::place_order;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppJson};
use crate::flights::FlightListItem;
use crate::middleware::AuthUser;
use crate::pagination::{paginate, Page, PageParams};
use crate::query::format_time;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub tickets: Vec<NewTicket>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketResponse {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub flight: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub tickets: Vec<TicketResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketListItem {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub route: String,
    pub departure_time: String,
    pub arrival_time: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderListItem {
    pub id: i64,
    pub created_at: String,
    pub tickets: Vec<TicketListItem>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketDetail {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub flight: FlightListItem,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderDetail {
    pub id: i64,
    pub created_at: String,
    pub tickets: Vec<TicketDetail>,
}

impl From<&Ticket> for TicketResponse {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            row: ticket.row,
            seat: ticket.seat,
            flight: ticket.flight.id,
        }
    }
}

impl From<&Ticket> for TicketListItem {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            row: ticket.row,
            seat: ticket.seat,
            route: ticket.flight.route.full_route(),
            departure_time: format_time(&ticket.flight.departure_time),
            arrival_time: format_time(&ticket.flight.arrival_time),
        }
    }
}

impl From<&Ticket> for TicketDetail {
    fn from(ticket: &Ticket) -> Self {
        Self {
            id: ticket.id,
            row: ticket.row,
            seat: ticket.seat,
            flight: FlightListItem::from(&ticket.flight),
        }
    }
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            created_at: order.created_at,
            tickets: order.tickets.iter().map(TicketResponse::from).collect(),
        }
    }
}

impl From<&Order> for OrderListItem {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            created_at: format_time(&order.created_at),
            tickets: order.tickets.iter().map(TicketListItem::from).collect(),
        }
    }
}

impl From<&Order> for OrderDetail {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            created_at: format_time(&order.created_at),
            tickets: order.tickets.iter().map(TicketDetail::from).collect(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/{id}", get(get_order))
}

/// GET /api/airport/orders (own orders only)
async fn list_orders(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<OrderListItem>>, AppError> {
    let user_id = claims.user_id()?;
    let orders: Vec<OrderListItem> = state
        .repo
        .list_orders(user_id)
        .await?
        .iter()
        .map(OrderListItem::from)
        .collect();

    Ok(Json(paginate(orders, &page, state.page_size)?))
}

/// GET /api/airport/orders/{id}
async fn get_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetail>, AppError> {
    let user_id = claims.user_id()?;
    state
        .repo
        .get_order(user_id, id)
        .await?
        .map(|order| Json(OrderDetail::from(&order)))
        .ok_or_else(|| AppError::NotFoundError(format!("Order {} not found", id)))
}

/// POST /api/airport/orders
async fn create_order(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppJson(req): AppJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let user_id = claims.user_id()?;
    let order = place_order(state.repo.as_ref(), user_id, &req.tickets, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(OrderResponse::from(&order))))
}
