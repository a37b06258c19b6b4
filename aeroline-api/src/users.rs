use aeroline_core::models::User;
use aeroline_core::repository::UserRepository;
use aeroline_core::services::{authenticate, register_user, update_profile, ProfileChanges, Registration};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppJson};
use crate::middleware::{issue_token, AuthUser};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access: String,
}

/// Full profile update: email and password are required.
#[derive(Debug, Deserialize)]
pub struct ReplaceProfileRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Routes reachable without a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/token", post(obtain_token))
}

/// Routes for the logged-in user's own account.
pub fn account_routes() -> Router<AppState> {
    Router::new().route("/me", get(me).put(replace_me).patch(update_me))
}

/// POST /api/user/register
async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<Registration>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = register_user(state.repo.as_ref(), &req).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /api/user/token
async fn obtain_token(
    State(state): State<AppState>,
    AppJson(req): AppJson<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = authenticate(state.repo.as_ref(), &req.email, &req.password).await?;
    let access = issue_token(&state.auth, &user)?;
    Ok(Json(TokenResponse { access }))
}

/// GET /api/user/me
async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user_id = claims.user_id()?;
    state
        .repo
        .get_user(user_id)
        .await?
        .map(|user| Json(user.into()))
        .ok_or_else(|| AppError::AuthenticationError("User not found".into()))
}

/// PUT /api/user/me
async fn replace_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppJson(req): AppJson<ReplaceProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let changes = ProfileChanges {
        email: Some(req.email),
        password: Some(req.password),
        first_name: Some(req.first_name),
        last_name: Some(req.last_name),
    };
    let user = update_profile(state.repo.as_ref(), claims.user_id()?, &changes).await?;
    Ok(Json(user.into()))
}

/// PATCH /api/user/me
async fn update_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    AppJson(changes): AppJson<ProfileChanges>,
) -> Result<Json<UserResponse>, AppError> {
    let user = update_profile(state.repo.as_ref(), claims.user_id()?, &changes).await?;
    Ok(Json(user.into()))
}
