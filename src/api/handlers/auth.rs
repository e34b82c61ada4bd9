//! Authentication handlers.

use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::middleware::auth::AuthExtension;
use crate::api::AppState;
use crate::error::Result;
use crate::models::user::{UserProfile, Workspace};
use crate::services::auth_service::TokenResponse;

/// Create public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/oauth", post(oauth_login))
}

/// Create protected auth routes (auth required)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(me))
        .route("/auth/workspaces", post(create_workspace))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// OAuth identity already verified by the upstream provider exchange
#[derive(Debug, Deserialize)]
pub struct OAuthRequest {
    pub username: String,
    pub email: String,
    pub provider: String,
    pub provider_id: String,
}

#[derive(Debug, Deserialize)]
pub struct WorkspaceRequest {
    pub name: String,
}

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .identity
        .register(&payload.username, &payload.email, &payload.password)
        .await?;
    Ok(Json(profile))
}

/// Login with credentials
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let tokens = state
        .identity
        .authenticate(&payload.username, &payload.password)
        .await?;
    Ok(Json(tokens))
}

/// Upsert an OAuth identity and issue a token
pub async fn oauth_login(
    State(state): State<AppState>,
    Json(payload): Json<OAuthRequest>,
) -> Result<Json<TokenResponse>> {
    state
        .identity
        .register_oauth(
            &payload.username,
            &payload.email,
            &payload.provider,
            &payload.provider_id,
        )
        .await?;
    let tokens = state.identity.authenticate_oauth(&payload.username).await?;
    Ok(Json(tokens))
}

/// Get current user profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
) -> Result<Json<UserProfile>> {
    let profile = state.identity.get_user(&auth.username).await?;
    Ok(Json(profile))
}

/// Create a workspace for the current user
pub async fn create_workspace(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthExtension>,
    Json(payload): Json<WorkspaceRequest>,
) -> Result<Json<Workspace>> {
    let workspace = state
        .identity
        .create_workspace(&auth.username, &payload.name)
        .await?;
    Ok(Json(workspace))
}
