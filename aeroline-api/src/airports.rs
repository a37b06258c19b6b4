use aeroline_core::models::{Airport, NewAirport};
use aeroline_core::repository::AirportRepository;
use aeroline_core::services::catalog;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::error::{AppError, AppJson};
use crate::middleware::AdminUser;
use crate::pagination::{paginate, Page, PageParams};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/airports", get(list_airports).post(create_airport))
        .route("/airports/{id}", get(get_airport))
}

/// GET /api/airport/airports
async fn list_airports(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Airport>>, AppError> {
    let airports = state.repo.list_airports().await?;
    Ok(Json(paginate(airports, &page, state.page_size)?))
}

/// GET /api/airport/airports/{id}
async fn get_airport(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Airport>, AppError> {
    state
        .repo
        .get_airport(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Airport {} not found", id)))
}

/// POST /api/airport/airports
async fn create_airport(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppJson(req): AppJson<NewAirport>,
) -> Result<(StatusCode, Json<Airport>), AppError> {
    let airport = catalog::create_airport(state.repo.as_ref(), &req).await?;
    Ok((StatusCode::CREATED, Json(airport)))
}
