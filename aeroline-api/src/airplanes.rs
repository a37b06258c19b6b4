use aeroline_core::models::{Airplane, AirplaneType, NewAirplane, NewAirplaneType};
use aeroline_core::repository::AirplaneRepository;
use aeroline_core::services::catalog;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppJson};
use crate::middleware::AdminUser;
use crate::pagination::{paginate, Page, PageParams};
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct AirplaneResponse {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub airplane_type: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AirplaneListItem {
    pub id: i64,
    pub name: String,
    pub capacity: i64,
    /// Type name.
    pub airplane_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AirplaneDetail {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    /// Type name.
    pub airplane_type: String,
}

impl From<Airplane> for AirplaneResponse {
    fn from(airplane: Airplane) -> Self {
        Self {
            id: airplane.id,
            name: airplane.name,
            rows: airplane.rows,
            seats_in_row: airplane.seats_in_row,
            airplane_type: airplane.airplane_type.id,
        }
    }
}

impl From<Airplane> for AirplaneListItem {
    fn from(airplane: Airplane) -> Self {
        Self {
            id: airplane.id,
            capacity: airplane.capacity(),
            name: airplane.name,
            airplane_type: airplane.airplane_type.name,
        }
    }
}

impl From<Airplane> for AirplaneDetail {
    fn from(airplane: Airplane) -> Self {
        Self {
            id: airplane.id,
            name: airplane.name,
            rows: airplane.rows,
            seats_in_row: airplane.seats_in_row,
            airplane_type: airplane.airplane_type.name,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/airplane-types", get(list_airplane_types).post(create_airplane_type))
        .route("/airplane-types/{id}", get(get_airplane_type))
        .route("/airplanes", get(list_airplanes).post(create_airplane))
        .route("/airplanes/{id}", get(get_airplane))
}

/// GET /api/airport/airplane-types
async fn list_airplane_types(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<AirplaneType>>, AppError> {
    let types = state.repo.list_airplane_types().await?;
    Ok(Json(paginate(types, &page, state.page_size)?))
}

/// GET /api/airport/airplane-types/{id}
async fn get_airplane_type(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AirplaneType>, AppError> {
    state
        .repo
        .get_airplane_type(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Airplane type {} not found", id)))
}

/// POST /api/airport/airplane-types
async fn create_airplane_type(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppJson(req): AppJson<NewAirplaneType>,
) -> Result<(StatusCode, Json<AirplaneType>), AppError> {
    let airplane_type = catalog::create_airplane_type(state.repo.as_ref(), &req).await?;
    Ok((StatusCode::CREATED, Json(airplane_type)))
}

/// GET /api/airport/airplanes
async fn list_airplanes(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<AirplaneListItem>>, AppError> {
    let airplanes: Vec<AirplaneListItem> = state
        .repo
        .list_airplanes()
        .await?
        .into_iter()
        .map(AirplaneListItem::from)
        .collect();
    Ok(Json(paginate(airplanes, &page, state.page_size)?))
}

/// GET /api/airport/airplanes/{id}
async fn get_airplane(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AirplaneDetail>, AppError> {
    state
        .repo
        .get_airplane(id)
        .await?
        .map(|airplane| Json(airplane.into()))
        .ok_or_else(|| AppError::NotFoundError(format!("Airplane {} not found", id)))
}

/// POST /api/airport/airplanes
async fn create_airplane(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppJson(req): AppJson<NewAirplane>,
) -> Result<(StatusCode, Json<AirplaneResponse>), AppError> {
    let airplane = catalog::create_airplane(state.repo.as_ref(), &req).await?;
    Ok((StatusCode::CREATED, Json(airplane.into())))
}
