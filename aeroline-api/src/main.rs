use std::net::SocketAddr;
use std::sync::Arc;

use aeroline_api::{
    app,
    state::{AppState, AuthConfig, RateLimit},
};
use aeroline_core::scheduling::ScheduleRules;
use aeroline_core::services::ensure_admin;
use aeroline_core::Repository;
use aeroline_store::{app_config::Config, DbClient, RedisClient};
use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aeroline_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Aeroline API on port {}", config.server.port);

    // Postgres
    let db = DbClient::new(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;
    let repo: Arc<dyn Repository> = Arc::new(db.store());

    if let (Some(email), Some(password)) = (&config.auth.admin_email, &config.auth.admin_password) {
        ensure_admin(repo.as_ref(), email, password)
            .await
            .context("Failed to create bootstrap admin")?;
    }

    // Redis is optional; without it rate limiting is off
    let redis = match &config.redis.url {
        Some(url) => Some(Arc::new(
            RedisClient::new(url).await.context("Failed to connect to Redis")?,
        )),
        None => {
            tracing::info!("No Redis configured, rate limiting disabled");
            None
        }
    };

    let app_state = AppState {
        repo,
        redis,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        schedule_rules: ScheduleRules::from_hours(
            config.scheduling.min_turnaround_hours,
            config.scheduling.max_idle_gap_hours,
        ),
        page_size: config.pagination.page_size,
        rate_limit: RateLimit {
            requests: config.rate_limit.requests,
            window_seconds: config.rate_limit.window_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
