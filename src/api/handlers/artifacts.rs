//! Artifact catalog handlers, shared by the model and agent routes.
//!
//! The same router is mounted twice, once per kind, with the kind supplied
//! as a route-layer extension.

use axum::{
    extract::{Extension, Path, Query, State},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::parse_tags;
use crate::api::middleware::auth::AuthExtension;
use crate::api::AppState;
use crate::error::Result;
use crate::models::artifact::{Artifact, ArtifactKind};
use crate::services::catalog_service::NewArtifact;
use crate::store::{ArtifactFilter, ArtifactUpdate, PublishUpdate};

/// Create catalog routes for one artifact kind
pub fn router(kind: ArtifactKind) -> Router<AppState> {
    Router::new()
        .route("/", post(create_artifact).get(list_mine))
        .route("/public", get(list_public))
        .route(
            "/:id",
            get(get_artifact).put(update_artifact).delete(delete_artifact),
        )
        .route("/:id/publish", patch(publish_artifact))
        .route("/:id/download", post(record_download))
        .route("/:id/reviews", post(add_review))
        .layer(Extension(kind))
}

#[derive(Debug, Deserialize)]
pub struct CreateArtifactRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub version: Option<String>,
    pub price: Option<String>,
    #[serde(default)]
    pub public: bool,
    pub integration: Option<String>,
    #[serde(default)]
    pub required_models: Vec<String>,
    pub apple_store_url: Option<String>,
    pub google_play_url: Option<String>,
    pub custom_payment_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateArtifactRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub price: String,
    pub public: bool,
    pub integration: Option<String>,
    #[serde(default)]
    pub required_models: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    pub public: bool,
    pub apple_store_url: Option<String>,
    pub google_play_url: Option<String>,
    pub custom_payment_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct ListArtifactsQuery {
    #[serde(rename = "type")]
    pub artifact_type: Option<String>,
    /// Comma-separated tag list; all must be present
    pub tags: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DownloadResponse {
    pub id: String,
    pub downloads: i64,
}

/// Publish a new artifact owned by the caller
pub async fn create_artifact(
    State(state): State<AppState>,
    Extension(kind): Extension<ArtifactKind>,
    Extension(auth): Extension<AuthExtension>,
    Json(payload): Json<CreateArtifactRequest>,
) -> Result<Json<Artifact>> {
    let artifact = state
        .catalog(kind)
        .create(
            &auth.username,
            NewArtifact {
                id: payload.id,
                name: payload.name,
                description: payload.description,
                artifact_type: payload.artifact_type,
                tags: payload.tags,
                version: payload.version,
                price: payload.price,
                public: payload.public,
                integration: payload.integration,
                required_models: payload.required_models,
                apple_store_url: payload.apple_store_url,
                google_play_url: payload.google_play_url,
                custom_payment_url: payload.custom_payment_url,
            },
        )
        .await?;
    Ok(Json(artifact))
}

/// List the caller's own artifacts, optionally filtered
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(kind): Extension<ArtifactKind>,
    Extension(auth): Extension<AuthExtension>,
    Query(query): Query<ListArtifactsQuery>,
) -> Result<Json<Vec<Artifact>>> {
    let filter = ArtifactFilter {
        artifact_type: query.artifact_type,
        tags: parse_tags(&query.tags),
        creator: Some(auth.username),
        public_only: false,
    };
    let artifacts = state.catalog(kind).list(filter).await?;
    Ok(Json(artifacts))
}

/// List published artifacts from all creators
pub async fn list_public(
    State(state): State<AppState>,
    Extension(kind): Extension<ArtifactKind>,
) -> Result<Json<Vec<Artifact>>> {
    let artifacts = state.catalog(kind).list_public().await?;
    Ok(Json(artifacts))
}

/// Fetch one artifact
pub async fn get_artifact(
    State(state): State<AppState>,
    Extension(kind): Extension<ArtifactKind>,
    Path(id): Path<String>,
) -> Result<Json<Artifact>> {
    let artifact = state.catalog(kind).get(&id).await?;
    Ok(Json(artifact))
}

/// Replace the mutable fields of an artifact
pub async fn update_artifact(
    State(state): State<AppState>,
    Extension(kind): Extension<ArtifactKind>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateArtifactRequest>,
) -> Result<Json<Artifact>> {
    let artifact = state
        .catalog(kind)
        .update(
            &id,
            &auth.username,
            ArtifactUpdate {
                name: payload.name,
                description: payload.description,
                artifact_type: payload.artifact_type,
                tags: payload.tags,
                price: payload.price,
                public: payload.public,
                integration: payload.integration,
                required_models: payload.required_models,
            },
        )
        .await?;
    Ok(Json(artifact))
}

/// Set visibility and monetization URLs
pub async fn publish_artifact(
    State(state): State<AppState>,
    Extension(kind): Extension<ArtifactKind>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<String>,
    Json(payload): Json<PublishRequest>,
) -> Result<Json<Artifact>> {
    let artifact = state
        .catalog(kind)
        .publish(
            &id,
            &auth.username,
            PublishUpdate {
                public: payload.public,
                apple_store_url: payload.apple_store_url,
                google_play_url: payload.google_play_url,
                custom_payment_url: payload.custom_payment_url,
            },
        )
        .await?;
    Ok(Json(artifact))
}

/// Delete an artifact
pub async fn delete_artifact(
    State(state): State<AppState>,
    Extension(kind): Extension<ArtifactKind>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<String>,
) -> Result<()> {
    state.catalog(kind).delete(&id, &auth.username).await
}

/// Count a download/install event
pub async fn record_download(
    State(state): State<AppState>,
    Extension(kind): Extension<ArtifactKind>,
    Path(id): Path<String>,
) -> Result<Json<DownloadResponse>> {
    let downloads = state.catalog(kind).record_download(&id).await?;
    Ok(Json(DownloadResponse { id, downloads }))
}

/// Append a review from the caller
pub async fn add_review(
    State(state): State<AppState>,
    Extension(kind): Extension<ArtifactKind>,
    Extension(auth): Extension<AuthExtension>,
    Path(id): Path<String>,
    Json(payload): Json<ReviewRequest>,
) -> Result<Json<Artifact>> {
    let artifact = state
        .catalog(kind)
        .add_review(&id, &auth.username, payload.rating, &payload.comment)
        .await?;
    Ok(Json(artifact))
}
