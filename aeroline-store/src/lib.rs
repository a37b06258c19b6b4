pub mod app_config;
pub mod database;
pub mod redis_repo;

mod catalog_repo;
mod flight_repo;
mod order_repo;
mod user_repo;

pub use database::DbClient;
pub use redis_repo::RedisClient;

use aeroline_core::validation::NON_FIELD_ERRORS;
use aeroline_core::CoreError;
use sqlx::PgPool;

/// Postgres implementation of every repository trait in `aeroline_core`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a sqlx failure onto the domain error: unique violations become
/// conflicts, dangling references become validation failures.
pub(crate) fn db_error(err: sqlx::Error) -> CoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique constraint");
            return CoreError::Conflict(format!("{} violated: record already exists.", constraint));
        }
        if db_err.is_foreign_key_violation() {
            return CoreError::invalid(NON_FIELD_ERRORS, "Referenced object does not exist.");
        }
    }
    tracing::error!("Database error: {}", err);
    CoreError::Internal(format!("Database error: {}", err))
}
