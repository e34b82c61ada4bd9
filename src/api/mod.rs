//! API module - HTTP handlers and middleware.

pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::models::artifact::ArtifactKind;
use crate::services::auth_service::IdentityService;
use crate::services::catalog_service::ArtifactCatalog;
use crate::services::garden_service::GardenService;
use crate::services::project_service::ProjectService;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub identity: Arc<IdentityService>,
    pub models: Arc<ArtifactCatalog>,
    pub agents: Arc<ArtifactCatalog>,
    pub garden: Arc<GardenService>,
    pub projects: Arc<ProjectService>,
}

impl AppState {
    pub fn catalog(&self, kind: ArtifactKind) -> &Arc<ArtifactCatalog> {
        match kind {
            ArtifactKind::Model => &self.models,
            ArtifactKind::Agent => &self.agents,
        }
    }
}

/// Assemble the application router
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .nest("/models", handlers::artifacts::router(ArtifactKind::Model))
        .nest("/agents", handlers::artifacts::router(ArtifactKind::Agent))
        .nest("/garden", handlers::garden::router())
        .nest("/projects", handlers::projects::router())
        .merge(handlers::auth::protected_router())
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", handlers::auth::public_router().merge(protected))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
