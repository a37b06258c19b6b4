use aeroline_core::models::{Flight, FlightFilter, NewFlight, Seat};
use aeroline_core::repository::FlightRepository;
use aeroline_core::services::schedule_flight;
use aeroline_core::ValidationErrors;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppJson};
use crate::middleware::AdminUser;
use crate::pagination::{paginate, Page, PageParams};
use crate::query::{format_time, parse_ids};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct FlightQuery {
    /// Departure date (UTC), `YYYY-MM-DD`.
    pub date: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
}

/// Echo of a created flight, referencing related records by id.
#[derive(Debug, Serialize, Deserialize)]
pub struct FlightResponse {
    pub id: i64,
    pub route: i64,
    pub airplane: i64,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub crew: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlightListItem {
    pub id: i64,
    /// `full_route` of the route.
    pub route: String,
    /// Airplane name.
    pub airplane: String,
    pub departure_time: String,
    pub arrival_time: String,
    /// Crew full names.
    pub crew: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlightDetail {
    pub id: i64,
    pub full_route: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub airplane_name: String,
    pub airplane_capacity: i64,
    pub tickets_available: i64,
    pub taken_places: Vec<Seat>,
    pub crew: Vec<String>,
}

impl From<Flight> for FlightResponse {
    fn from(flight: Flight) -> Self {
        Self {
            id: flight.id,
            route: flight.route.id,
            airplane: flight.airplane.id,
            departure_time: flight.departure_time,
            arrival_time: flight.arrival_time,
            crew: flight.crew.iter().map(|c| c.id).collect(),
        }
    }
}

impl From<&Flight> for FlightListItem {
    fn from(flight: &Flight) -> Self {
        Self {
            id: flight.id,
            route: flight.route.full_route(),
            airplane: flight.airplane.name.clone(),
            departure_time: format_time(&flight.departure_time),
            arrival_time: format_time(&flight.arrival_time),
            crew: flight.crew.iter().map(|c| c.full_name()).collect(),
        }
    }
}

impl FlightDetail {
    fn new(flight: &Flight, taken_places: Vec<Seat>) -> Self {
        Self {
            id: flight.id,
            full_route: flight.route.full_route(),
            departure_time: format_time(&flight.departure_time),
            arrival_time: format_time(&flight.arrival_time),
            airplane_name: flight.airplane.name.clone(),
            airplane_capacity: flight.airplane.capacity(),
            tickets_available: flight.tickets_available(),
            taken_places,
            crew: flight.crew.iter().map(|c| c.full_name()).collect(),
        }
    }
}

fn parse_date(raw: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    match raw.filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(Some).map_err(|_| {
            AppError::ValidationError(ValidationErrors::single(
                "date",
                "Date has wrong format. Use YYYY-MM-DD.",
            ))
        }),
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/flights", get(list_flights).post(create_flight))
        .route("/flights/{id}", get(get_flight))
}

/// GET /api/airport/flights?date=2024-10-25&source=1&destination=2
async fn list_flights(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(query): Query<FlightQuery>,
) -> Result<Json<Page<FlightListItem>>, AppError> {
    let filter = FlightFilter {
        date: parse_date(query.date.as_deref())?,
        source: parse_ids("source", query.source.as_deref())?,
        destination: parse_ids("destination", query.destination.as_deref())?,
    };
    let flights: Vec<FlightListItem> = state
        .repo
        .list_flights(&filter)
        .await?
        .iter()
        .map(FlightListItem::from)
        .collect();

    Ok(Json(paginate(flights, &page, state.page_size)?))
}

/// GET /api/airport/flights/{id}
async fn get_flight(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<FlightDetail>, AppError> {
    let flight = state
        .repo
        .get_flight(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Flight {} not found", id)))?;
    let taken_places = state.repo.taken_seats(id).await?;

    Ok(Json(FlightDetail::new(&flight, taken_places)))
}

/// POST /api/airport/flights
async fn create_flight(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppJson(req): AppJson<NewFlight>,
) -> Result<(StatusCode, Json<FlightResponse>), AppError> {
    let flight = schedule_flight(state.repo.as_ref(), &state.schedule_rules, &req).await?;
    Ok((StatusCode::CREATED, Json(flight.into())))
}
