use aeroline_core::models::{Airport, NewRoute, Route, RouteFilter};
use aeroline_core::repository::RouteRepository;
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
use crate::query::parse_ids;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RouteQuery {
    /// Comma-separated source airport ids.
    pub source: Option<String>,
    /// Comma-separated destination airport ids.
    pub destination: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteResponse {
    pub id: i64,
    pub source: i64,
    pub destination: i64,
    pub distance: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteListItem {
    pub id: i64,
    pub full_route: String,
    pub distance: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RouteDetail {
    pub id: i64,
    pub source: Airport,
    pub destination: Airport,
    pub distance: i32,
}

impl From<Route> for RouteResponse {
    fn from(route: Route) -> Self {
        Self {
            id: route.id,
            source: route.source.id,
            destination: route.destination.id,
            distance: route.distance,
        }
    }
}

impl From<Route> for RouteListItem {
    fn from(route: Route) -> Self {
        Self {
            id: route.id,
            full_route: route.full_route(),
            distance: route.distance,
        }
    }
}

impl From<Route> for RouteDetail {
    fn from(route: Route) -> Self {
        Self {
            id: route.id,
            source: route.source,
            destination: route.destination,
            distance: route.distance,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/routes", get(list_routes).post(create_route))
        .route("/routes/{id}", get(get_route))
}

/// GET /api/airport/routes?source=1,2&destination=3
async fn list_routes(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<Page<RouteListItem>>, AppError> {
    let filter = RouteFilter {
        source: parse_ids("source", query.source.as_deref())?,
        destination: parse_ids("destination", query.destination.as_deref())?,
    };
    let routes: Vec<RouteListItem> = state
        .repo
        .list_routes(&filter)
        .await?
        .into_iter()
        .map(RouteListItem::from)
        .collect();

    Ok(Json(paginate(routes, &page, state.page_size)?))
}

/// GET /api/airport/routes/{id}
async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RouteDetail>, AppError> {
    state
        .repo
        .get_route(id)
        .await?
        .map(|route| Json(route.into()))
        .ok_or_else(|| AppError::NotFoundError(format!("Route {} not found", id)))
}

/// POST /api/airport/routes
async fn create_route(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppJson(req): AppJson<NewRoute>,
) -> Result<(StatusCode, Json<RouteResponse>), AppError> {
    let route = catalog::create_route(state.repo.as_ref(), &req).await?;
    Ok((StatusCode::CREATED, Json(route.into())))
}
