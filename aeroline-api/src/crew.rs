use aeroline_core::models::{Crew, CrewChanges, NewCrew};
use aeroline_core::repository::CrewRepository;
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
        .route("/crew", get(list_crew).post(create_crew))
        .route(
            "/crew/{id}",
            get(get_crew)
                .put(replace_crew)
                .patch(update_crew)
                .delete(delete_crew),
        )
}

/// GET /api/airport/crew
async fn list_crew(
    State(state): State<AppState>,
    Query(page): Query<PageParams>,
) -> Result<Json<Page<Crew>>, AppError> {
    let crew = state.repo.list_crew().await?;
    Ok(Json(paginate(crew, &page, state.page_size)?))
}

/// GET /api/airport/crew/{id}
async fn get_crew(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Crew>, AppError> {
    state
        .repo
        .get_crew(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFoundError(format!("Crew member {} not found", id)))
}

/// POST /api/airport/crew
async fn create_crew(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    AppJson(req): AppJson<NewCrew>,
) -> Result<(StatusCode, Json<Crew>), AppError> {
    let crew = catalog::create_crew(state.repo.as_ref(), &req).await?;
    Ok((StatusCode::CREATED, Json(crew)))
}

/// PUT /api/airport/crew/{id}: both names required.
async fn replace_crew(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    AppJson(req): AppJson<NewCrew>,
) -> Result<Json<Crew>, AppError> {
    let changes = CrewChanges {
        first_name: Some(req.first_name),
        last_name: Some(req.last_name),
    };
    let crew = catalog::update_crew(state.repo.as_ref(), id, &changes).await?;
    Ok(Json(crew))
}

/// PATCH /api/airport/crew/{id}
async fn update_crew(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
    AppJson(changes): AppJson<CrewChanges>,
) -> Result<Json<Crew>, AppError> {
    let crew = catalog::update_crew(state.repo.as_ref(), id, &changes).await?;
    Ok(Json(crew))
}

/// DELETE /api/airport/crew/{id}
async fn delete_crew(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    catalog::delete_crew(state.repo.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
