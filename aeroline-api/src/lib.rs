use axum::{http::Method, middleware::from_fn_with_state, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod airplanes;
pub mod airports;
pub mod crew;
pub mod error;
pub mod flights;
pub mod middleware;
pub mod orders;
pub mod pagination;
pub mod query;
pub mod routes;
pub mod state;
pub mod users;

pub use state::AppState;

use middleware::{login_required, rate_limit_middleware};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let airport = Router::new()
        .merge(airports::routes())
        .merge(routes::routes())
        .merge(crew::routes())
        .merge(airplanes::routes())
        .merge(flights::routes())
        .merge(orders::routes())
        .route_layer(from_fn_with_state(state.clone(), login_required));

    let user = Router::new()
        .merge(users::account_routes())
        .route_layer(from_fn_with_state(state.clone(), login_required))
        .merge(users::public_routes());

    Router::new()
        .nest("/api/airport", airport)
        .nest("/api/user", user)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}
