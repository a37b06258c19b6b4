use std::sync::Arc;

use aeroline_core::scheduling::ScheduleRules;
use aeroline_core::Repository;
use aeroline_store::RedisClient;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    pub expiration: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct RateLimit {
    pub requests: i64,
    pub window_seconds: i64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests: 100,
            window_seconds: 60,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    /// Rate limiting is skipped without Redis.
    pub redis: Option<Arc<RedisClient>>,
    pub auth: AuthConfig,
    pub schedule_rules: ScheduleRules,
    pub page_size: u32,
    pub rate_limit: RateLimit,
}

impl AppState {
    /// State with default scheduling rules and no Redis.
    pub fn new(repo: Arc<dyn Repository>, auth: AuthConfig) -> Self {
        Self {
            repo,
            redis: None,
            auth,
            schedule_rules: ScheduleRules::default(),
            page_size: 10,
            rate_limit: RateLimit::default(),
        }
    }
}
